//! Group CRUD and subtree deletion.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use chunkvault_core::error::AppError;
use chunkvault_core::result::AppResult;
use chunkvault_core::types::GroupId;
use chunkvault_database::repositories::group::GroupRepository;
use chunkvault_entity::group::{CreateGroup, Group, GroupDeletion, GroupListing};

/// Manages the group hierarchy.
#[derive(Debug, Clone)]
pub struct GroupService {
    /// Group repository.
    group_repo: Arc<GroupRepository>,
}

impl GroupService {
    /// Creates a new group service.
    pub fn new(group_repo: Arc<GroupRepository>) -> Self {
        Self { group_repo }
    }

    /// Create a group, optionally under the group named `parent`.
    pub async fn create(&self, name: &str, parent: Option<&str>) -> AppResult<Group> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Group name cannot be empty"));
        }

        let parent_id = match parent.map(str::trim) {
            None => None,
            Some(parent) if parent == name => {
                return Err(AppError::validation(format!(
                    "Group '{name}' cannot be its own parent"
                )));
            }
            Some(parent) => Some(self.get(parent).await?.id),
        };

        let group = self
            .group_repo
            .create(&CreateGroup {
                name: name.to_string(),
                parent_id,
            })
            .await?;

        info!(group_id = %group.id, name = %group.name, parent = ?parent, "Group created");
        Ok(group)
    }

    /// Every group with its parent's name, ordered by ID.
    pub async fn list(&self) -> AppResult<Vec<GroupListing>> {
        self.group_repo.list_with_parents().await
    }

    /// Get a group by name. Surrounding whitespace is ignored, as in `create`.
    pub async fn get(&self, name: &str) -> AppResult<Group> {
        let name = name.trim();
        self.group_repo
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Group '{name}' not found")))
    }

    /// Get a group by ID.
    pub async fn get_by_id(&self, id: GroupId) -> AppResult<Group> {
        self.group_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Group {id} not found")))
    }

    /// Fail with a validation error unless `id` names an existing group.
    pub async fn validate_exists(&self, id: GroupId) -> AppResult<()> {
        if self.group_repo.exists(id).await? {
            Ok(())
        } else {
            Err(AppError::validation(format!("Group {id} does not exist")))
        }
    }

    /// Delete the named group and all of its descendants.
    ///
    /// Files in any removed group are moved to the root group. Nothing is
    /// modified unless the whole subtree can be removed.
    pub async fn delete(&self, name: &str) -> AppResult<GroupDeletion> {
        let target = self.get(name).await?;
        if target.is_root() {
            return Err(AppError::validation(format!(
                "The root group '{}' cannot be deleted",
                target.name
            )));
        }

        let subtree = self.collect_subtree(target).await?;
        let ids: Vec<GroupId> = subtree.iter().map(|g| g.id).collect();
        let reassigned_files = self.group_repo.delete_subtree(&ids).await?;

        let removed: Vec<String> = subtree.into_iter().map(|g| g.name).collect();
        info!(
            group = %name,
            removed = removed.len(),
            reassigned_files,
            "Group subtree deleted"
        );

        Ok(GroupDeletion {
            removed,
            reassigned_files,
        })
    }

    /// Walk the subtree below `root` and return it children-first.
    ///
    /// Each group has a single parent, so meeting a group twice means the
    /// parent links form a cycle.
    async fn collect_subtree(&self, root: Group) -> AppResult<Vec<Group>> {
        let mut visited = HashSet::from([root.id]);
        let mut stack = vec![(root, false)];
        let mut ordered = Vec::new();

        while let Some((group, expanded)) = stack.pop() {
            if expanded {
                ordered.push(group);
                continue;
            }

            let children = self.group_repo.find_children(group.id).await?;
            stack.push((group, true));
            for child in children {
                if !visited.insert(child.id) {
                    return Err(AppError::internal(format!(
                        "Group hierarchy is cyclic at '{}' ({})",
                        child.name, child.id
                    )));
                }
                stack.push((child, false));
            }
        }

        Ok(ordered)
    }
}
