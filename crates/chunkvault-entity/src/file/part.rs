//! Part entity: one stored chunk of a file.

use chunkvault_core::types::{BlobId, FileId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A chunk of a file held by the blob backend under an opaque id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Part {
    /// Backend-issued id of the stored chunk.
    pub id: BlobId,
    /// The owning file.
    pub file_id: FileId,
    /// Zero-based position of the chunk within the file.
    pub seq: i64,
}

/// A stored chunk awaiting registration together with its file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPart {
    pub id: BlobId,
    pub seq: i64,
}
