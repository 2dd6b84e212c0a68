//! Blob backend trait for pluggable chunk storage.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;
use crate::types::BlobId;

/// An opaque remote object store holding individual chunks.
///
/// The backend chooses the identifier for every stored object; callers only
/// persist it and hand it back. Implementations live in `chunkvault-storage`.
///
/// Errors: `fetch` and `remove` return `ErrorKind::NotFound` for unknown ids
/// and `ErrorKind::Backend` for any other failure.
#[async_trait]
pub trait BlobBackend: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend type name (e.g. "local", "memory").
    fn backend_type(&self) -> &str;

    /// Check whether the backend is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Store `data` under a human-readable `label` and return its id.
    async fn store(&self, label: &str, data: Bytes) -> AppResult<BlobId>;

    /// Fetch the full contents of a stored object.
    async fn fetch(&self, id: &BlobId) -> AppResult<Bytes>;

    /// Remove a stored object.
    async fn remove(&self, id: &BlobId) -> AppResult<()>;
}
