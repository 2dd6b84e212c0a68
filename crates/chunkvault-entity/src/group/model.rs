//! Group entity model.

use chunkvault_core::types::GroupId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Name of the root group every file falls back to.
pub const ROOT_GROUP_NAME: &str = "uncategorized";

/// A named category that files belong to. Groups form a forest through
/// `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Group {
    /// Unique group identifier.
    pub id: GroupId,
    /// Unique, non-empty group name.
    pub name: String,
    /// Parent group (None for top-level groups).
    pub parent_id: Option<GroupId>,
}

impl Group {
    /// Check if this is the root `uncategorized` group.
    pub fn is_root(&self) -> bool {
        self.id.is_root()
    }
}

/// Data required to create a new group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroup {
    /// Group name.
    pub name: String,
    /// Resolved parent group.
    pub parent_id: Option<GroupId>,
}

/// A group together with its parent's name, as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct GroupListing {
    pub id: GroupId,
    pub name: String,
    pub parent_name: Option<String>,
}

impl GroupListing {
    /// The parent's name, or `"root"` for top-level groups.
    pub fn parent_label(&self) -> &str {
        self.parent_name.as_deref().unwrap_or("root")
    }
}

/// Result of deleting a group subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDeletion {
    /// Names of the removed groups, children before parents.
    pub removed: Vec<String>,
    /// Number of files moved to the root group.
    pub reassigned_files: u64,
}
