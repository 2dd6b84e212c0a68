//! Local filesystem blob backend.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use chunkvault_core::error::{AppError, ErrorKind};
use chunkvault_core::result::AppResult;
use chunkvault_core::traits::BlobBackend;
use chunkvault_core::types::BlobId;

/// Stores each chunk as a file under `root/<shard>/<uuid>`.
///
/// Ids are UUIDv7, so they sort by creation time.
#[derive(Debug, Clone)]
pub struct LocalBlobBackend {
    /// Root directory for all stored blobs.
    root: PathBuf,
}

impl LocalBlobBackend {
    /// Create a new local backend rooted at the given path.
    pub async fn new(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Backend,
                format!("Failed to create blob root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Resolve an id to its on-disk path. Anything that is not a UUID
    /// cannot have been issued here.
    fn resolve(&self, id: &BlobId) -> AppResult<PathBuf> {
        let uuid = Uuid::parse_str(id.as_str())
            .map_err(|_| AppError::not_found(format!("Blob {id} not found")))?;
        let name = uuid.simple().to_string();
        let shard = &name[name.len() - 2..];
        Ok(self.root.join(shard).join(name))
    }
}

fn map_io(op: &str, id: &BlobId, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("Blob {id} not found"))
    } else {
        AppError::with_source(ErrorKind::Backend, format!("Failed to {op} blob {id}"), e)
    }
}

#[async_trait]
impl BlobBackend for LocalBlobBackend {
    fn backend_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn store(&self, label: &str, data: Bytes) -> AppResult<BlobId> {
        let id = BlobId::new(Uuid::now_v7().to_string());
        let path = self.resolve(&id)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| map_io("store", &id, e))?;
        }
        fs::write(&path, &data)
            .await
            .map_err(|e| map_io("store", &id, e))?;

        debug!(%id, label, bytes = data.len(), "Stored blob");
        Ok(id)
    }

    async fn fetch(&self, id: &BlobId) -> AppResult<Bytes> {
        let path = self.resolve(id)?;
        let data = fs::read(&path).await.map_err(|e| map_io("fetch", id, e))?;
        Ok(Bytes::from(data))
    }

    async fn remove(&self, id: &BlobId) -> AppResult<()> {
        let path = self.resolve(id)?;
        fs::remove_file(&path)
            .await
            .map_err(|e| map_io("remove", id, e))?;
        debug!(%id, "Removed blob");
        Ok(())
    }
}
