//! ChunkVault: a chunked content store.
//!
//! Files are split into fixed-size parts, each part is handed to an opaque
//! blob backend, and a SQLite metadata store records enough to reassemble,
//! list, and delete them later. [`ChunkVault`] wires configuration, the
//! database pool, the backend, and the services together.

pub mod telemetry;

use std::path::Path;
use std::sync::Arc;

use tracing::info;

pub use chunkvault_core::config::AppConfig;
pub use chunkvault_core::error::{AppError, ErrorKind};
pub use chunkvault_core::result::AppResult;
pub use chunkvault_core::traits::BlobBackend;
pub use chunkvault_core::types::{BlobId, FileId, GroupId};
pub use chunkvault_entity::file::{File, FileListing, FileQuery, Part};
pub use chunkvault_entity::group::{Group, GroupDeletion, GroupListing};
pub use chunkvault_service::DownloadOutcome;

pub use chunkvault_database::DatabasePool;
use chunkvault_database::migration::run_migrations;
use chunkvault_database::repositories::{FileRepository, GroupRepository, PartRepository};
use chunkvault_service::{
    DeleteService, DownloadService, GroupService, SearchService, UploadService,
};

/// Handle to an open store. Cheap to clone; clones share the pool and the
/// backend.
#[derive(Debug, Clone)]
pub struct ChunkVault {
    config: Arc<AppConfig>,
    db: DatabasePool,
    backend: Arc<dyn BlobBackend>,
    uploads: Arc<UploadService>,
    downloads: Arc<DownloadService>,
    deletes: Arc<DeleteService>,
    search: Arc<SearchService>,
    groups: Arc<GroupService>,
}

impl ChunkVault {
    /// Open the store with the backend named in the configuration.
    pub async fn open(config: AppConfig) -> AppResult<Self> {
        let backend = chunkvault_storage::providers::from_config(&config.storage.backend).await?;
        Self::with_backend(config, backend).await
    }

    /// Open the store with an explicitly supplied backend.
    pub async fn with_backend(config: AppConfig, backend: Arc<dyn BlobBackend>) -> AppResult<Self> {
        config.validate()?;
        info!(
            version = env!("CARGO_PKG_VERSION"),
            backend = backend.backend_type(),
            chunk_size = config.storage.chunk_size_bytes,
            "Opening ChunkVault"
        );

        let db = DatabasePool::connect(&config.database).await?;
        run_migrations(db.pool()).await?;

        let file_repo = Arc::new(FileRepository::new(db.pool().clone()));
        let part_repo = Arc::new(PartRepository::new(db.pool().clone()));
        let group_repo = Arc::new(GroupRepository::new(db.pool().clone()));

        let uploads = Arc::new(UploadService::new(
            Arc::clone(&file_repo),
            Arc::clone(&group_repo),
            Arc::clone(&backend),
            &config.storage,
            &config.transfer,
        ));
        let downloads = Arc::new(DownloadService::new(
            Arc::clone(&file_repo),
            Arc::clone(&part_repo),
            Arc::clone(&backend),
            &config.storage,
            &config.transfer,
        ));
        let deletes = Arc::new(DeleteService::new(
            Arc::clone(&file_repo),
            Arc::clone(&part_repo),
            Arc::clone(&backend),
        ));
        let search = Arc::new(SearchService::new(
            Arc::clone(&file_repo),
            Arc::clone(&part_repo),
            Arc::clone(&group_repo),
        ));
        let groups = Arc::new(GroupService::new(Arc::clone(&group_repo)));

        info!("ChunkVault ready");

        Ok(Self {
            config: Arc::new(config),
            db,
            backend,
            uploads,
            downloads,
            deletes,
            search,
            groups,
        })
    }

    /// Upload a local file into `group_id`.
    pub async fn upload(&self, source: impl AsRef<Path>, group_id: GroupId) -> AppResult<File> {
        self.uploads.upload(source.as_ref(), group_id).await
    }

    /// Reassemble a file into the configured output directory.
    pub async fn download(&self, file_id: FileId, destination: &str) -> AppResult<DownloadOutcome> {
        self.downloads.download(file_id, destination).await
    }

    /// Delete a file and its parts.
    pub async fn delete(&self, file_id: FileId) -> AppResult<usize> {
        self.deletes.delete(file_id).await
    }

    pub fn groups(&self) -> &GroupService {
        &self.groups
    }

    pub fn files(&self) -> &SearchService {
        &self.search
    }

    pub fn downloads(&self) -> &DownloadService {
        &self.downloads
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn backend(&self) -> &Arc<dyn BlobBackend> {
        &self.backend
    }

    pub fn database(&self) -> &DatabasePool {
        &self.db
    }

    /// Check that both the metadata store and the backend respond.
    pub async fn health_check(&self) -> AppResult<bool> {
        Ok(self.db.health_check().await? && self.backend.health_check().await?)
    }

    /// Close the database pool.
    pub async fn close(&self) {
        self.db.close().await;
    }
}
