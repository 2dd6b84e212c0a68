//! Read-side file projections used by search.

use chunkvault_core::types::{FileId, GroupId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Maximum number of rows a file search returns.
pub const FILE_LIST_LIMIT: i64 = 50;

/// Search filters. All set filters must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileQuery {
    /// Substring of the file name, matched with SQL `LIKE` (ASCII
    /// case-insensitive).
    pub name_contains: Option<String>,
    /// Exact file id.
    pub id: Option<FileId>,
    /// Exact owning group.
    pub group_id: Option<GroupId>,
}

impl FileQuery {
    pub fn by_name(fragment: impl Into<String>) -> Self {
        Self {
            name_contains: Some(fragment.into()),
            ..Self::default()
        }
    }

    pub fn by_id(id: FileId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn in_group(group_id: GroupId) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::default()
        }
    }
}

/// A file row joined with its group's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FileListing {
    pub id: FileId,
    pub name: String,
    pub size: i64,
    pub total_parts: i64,
    pub group_name: String,
}

impl FileListing {
    /// Render the size with a binary unit and two decimals, e.g. `25.00 MB`.
    pub fn human_size(&self) -> String {
        const KB: f64 = 1024.0;
        const MB: f64 = KB * 1024.0;
        const GB: f64 = MB * 1024.0;

        let size = self.size as f64;
        if size >= GB {
            format!("{:.2} GB", size / GB)
        } else if size >= MB {
            format!("{:.2} MB", size / MB)
        } else if size >= KB {
            format!("{:.2} KB", size / KB)
        } else {
            format!("{} B", self.size)
        }
    }
}
