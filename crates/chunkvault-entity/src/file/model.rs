//! File entity model.

use chrono::{DateTime, Utc};
use chunkvault_core::types::{FileId, GroupId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A file registered in the store. Its bytes live in the blob backend as
/// `total_parts` chunks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: FileId,
    /// Base name of the uploaded source.
    pub name: String,
    /// Number of chunks, `ceil(size / chunk_size)`.
    pub total_parts: i64,
    /// Size of the original content in bytes.
    pub size: i64,
    /// Lowercase hex SHA-256 of the full content.
    pub content_hash: String,
    /// The group this file belongs to.
    pub group_id: GroupId,
    /// When the file was registered.
    pub created_at: DateTime<Utc>,
}

impl File {
    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.name)
            .map(|ext| ext.to_lowercase())
    }

    /// Whether the file has no content (and therefore no parts).
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Data required to register a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    pub name: String,
    pub total_parts: i64,
    pub size: i64,
    pub content_hash: String,
    pub group_id: GroupId,
}
