//! Group repository implementation.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use chunkvault_core::error::{AppError, ErrorKind};
use chunkvault_core::result::AppResult;
use chunkvault_core::types::GroupId;
use chunkvault_entity::group::model::{CreateGroup, Group, GroupListing};

use super::is_unique_violation;

/// Repository for group CRUD and subtree removal.
#[derive(Debug, Clone)]
pub struct GroupRepository {
    pool: SqlitePool,
}

impl GroupRepository {
    /// Create a new group repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a group by ID.
    pub async fn find_by_id(&self, id: GroupId) -> AppResult<Option<Group>> {
        sqlx::query_as::<_, Group>("SELECT id, name, parent_id FROM groups WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, format!("Failed to find group {id}"), e)
            })
    }

    /// Find a group by its unique name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Group>> {
        sqlx::query_as::<_, Group>("SELECT id, name, parent_id FROM groups WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to find group '{name}'"),
                    e,
                )
            })
    }

    /// Check whether a group exists.
    pub async fn exists(&self, id: GroupId) -> AppResult<bool> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM groups WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map(|count| count > 0)
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, format!("Failed to check group {id}"), e)
            })
    }

    /// List direct children of a group.
    pub async fn find_children(&self, parent_id: GroupId) -> AppResult<Vec<Group>> {
        sqlx::query_as::<_, Group>(
            "SELECT id, name, parent_id FROM groups WHERE parent_id = ? ORDER BY id ASC",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to list children of group {parent_id}"),
                e,
            )
        })
    }

    /// List every group with its parent's name, ordered by ID.
    pub async fn list_with_parents(&self) -> AppResult<Vec<GroupListing>> {
        sqlx::query_as::<_, GroupListing>(
            "SELECT g.id, g.name, p.name AS parent_name \
             FROM groups g LEFT JOIN groups p ON g.parent_id = p.id \
             ORDER BY g.id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list groups", e))
    }

    /// Create a new group.
    pub async fn create(&self, data: &CreateGroup) -> AppResult<Group> {
        sqlx::query_as::<_, Group>(
            "INSERT INTO groups (name, parent_id) VALUES (?, ?) RETURNING id, name, parent_id",
        )
        .bind(&data.name)
        .bind(data.parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict(format!("Group '{}' already exists", data.name))
            } else {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to create group '{}'", data.name),
                    e,
                )
            }
        })
    }

    /// Remove a set of groups atomically.
    ///
    /// Files in any of the groups are moved to the root group first. Groups
    /// are deleted in the given order, so `ordered` must list children before
    /// their parents. Returns the number of reassigned files.
    pub async fn delete_subtree(&self, ordered: &[GroupId]) -> AppResult<u64> {
        if ordered.is_empty() {
            return Ok(0);
        }
        if ordered.iter().any(|id| id.is_root()) {
            return Err(AppError::validation("The root group cannot be deleted"));
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut reassign: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("UPDATE files SET group_id = ");
        reassign.push_bind(GroupId::ROOT);
        reassign.push(" WHERE group_id IN (");
        let mut ids = reassign.separated(", ");
        for id in ordered {
            ids.push_bind(*id);
        }
        ids.push_unseparated(")");

        let reassigned = reassign
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to reassign files to root", e)
            })?
            .rows_affected();

        for id in ordered {
            sqlx::query("DELETE FROM groups WHERE id = ?")
                .bind(*id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Database,
                        format!("Failed to delete group {id}"),
                        e,
                    )
                })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit group deletion", e)
        })?;

        Ok(reassigned)
    }
}
