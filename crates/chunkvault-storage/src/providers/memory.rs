//! In-process blob backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use chunkvault_core::error::AppError;
use chunkvault_core::result::AppResult;
use chunkvault_core::traits::BlobBackend;
use chunkvault_core::types::BlobId;

#[derive(Debug, Clone)]
struct StoredBlob {
    label: String,
    data: Bytes,
}

/// Holds blobs in a map. Ids are zero-padded counters, so they sort in
/// store order. Contents are lost when the backend is dropped.
#[derive(Debug, Default)]
pub struct MemoryBlobBackend {
    blobs: RwLock<HashMap<BlobId, StoredBlob>>,
    next_id: AtomicU64,
}

impl MemoryBlobBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs currently held.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    pub async fn contains(&self, id: &BlobId) -> bool {
        self.blobs.read().await.contains_key(id)
    }

    /// The label a blob was stored under.
    pub async fn label_of(&self, id: &BlobId) -> Option<String> {
        self.blobs.read().await.get(id).map(|b| b.label.clone())
    }

    /// Replace a blob's contents in place.
    pub async fn overwrite(&self, id: &BlobId, data: Bytes) -> AppResult<()> {
        let mut blobs = self.blobs.write().await;
        let blob = blobs
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("Blob {id} not found")))?;
        blob.data = data;
        Ok(())
    }
}

#[async_trait]
impl BlobBackend for MemoryBlobBackend {
    fn backend_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn store(&self, label: &str, data: Bytes) -> AppResult<BlobId> {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        let id = BlobId::new(format!("mem-{n:012}"));
        self.blobs.write().await.insert(
            id.clone(),
            StoredBlob {
                label: label.to_string(),
                data,
            },
        );
        Ok(id)
    }

    async fn fetch(&self, id: &BlobId) -> AppResult<Bytes> {
        self.blobs
            .read()
            .await
            .get(id)
            .map(|b| b.data.clone())
            .ok_or_else(|| AppError::not_found(format!("Blob {id} not found")))
    }

    async fn remove(&self, id: &BlobId) -> AppResult<()> {
        self.blobs
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("Blob {id} not found")))
    }
}
