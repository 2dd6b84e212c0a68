//! Blob backend implementations.

pub mod local;
pub mod memory;

use std::sync::Arc;

use tracing::info;

use chunkvault_core::config::BackendConfig;
use chunkvault_core::error::AppError;
use chunkvault_core::result::AppResult;
use chunkvault_core::traits::BlobBackend;

pub use local::LocalBlobBackend;
pub use memory::MemoryBlobBackend;

/// Build the backend selected by `storage.backend.provider`.
pub async fn from_config(config: &BackendConfig) -> AppResult<Arc<dyn BlobBackend>> {
    let backend: Arc<dyn BlobBackend> = match config.provider.as_str() {
        "local" => Arc::new(LocalBlobBackend::new(&config.local_root).await?),
        "memory" => Arc::new(MemoryBlobBackend::new()),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown blob backend provider '{other}'"
            )));
        }
    };
    info!(provider = backend.backend_type(), "Blob backend ready");
    Ok(backend)
}
