//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::TempDir;

use chunkvault::{AppConfig, AppError, AppResult, BlobBackend, BlobId, ChunkVault};
use chunkvault_storage::MemoryBlobBackend;

/// Chunk size used by every test vault.
pub const CHUNK: u64 = 25;

/// Knobs for a test vault.
#[derive(Debug, Default, Clone)]
pub struct Options {
    /// Transfer concurrency; zero means the default of one.
    pub concurrency: usize,
    pub verify: bool,
    pub faults: Faults,
}

/// 1-based call numbers on which the backend fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct Faults {
    pub store_on: Option<usize>,
    pub fetch_on: Option<usize>,
    pub remove_on: Option<usize>,
}

/// Test vault context
pub struct TestVault {
    /// The vault under test
    pub vault: ChunkVault,
    /// Blobs held by the backend, bypassing any injected faults
    pub blobs: Arc<MemoryBlobBackend>,
    /// Scratch directory holding the database, staging and output dirs
    pub dir: TempDir,
}

impl TestVault {
    /// Create a vault with default options
    pub async fn new() -> Self {
        Self::with_options(Options::default()).await
    }

    pub async fn with_options(options: Options) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = AppConfig::default();
        config.database.url = format!("sqlite://{}/db.sqlite", dir.path().display());
        config.storage.chunk_size_bytes = CHUNK;
        config.storage.staging_dir = dir.path().join("staging");
        config.storage.output_dir = dir.path().join("out");
        config.storage.backend.provider = "memory".to_string();
        config.transfer.concurrency = options.concurrency.max(1);
        config.transfer.verify_on_download = options.verify;

        let blobs = Arc::new(MemoryBlobBackend::new());
        let backend: Arc<dyn BlobBackend> = Arc::new(FaultyBackend::new(
            Arc::clone(&blobs),
            options.faults,
        ));

        let vault = ChunkVault::with_backend(config, backend)
            .await
            .expect("Failed to open vault");

        Self { vault, blobs, dir }
    }

    /// Write `data` to a source file named `name` and return its path
    pub async fn write_source(&self, name: &str, data: &[u8]) -> PathBuf {
        let src = self.dir.path().join("src");
        tokio::fs::create_dir_all(&src)
            .await
            .expect("Failed to create source dir");
        let path = src.join(name);
        tokio::fs::write(&path, data)
            .await
            .expect("Failed to write source file");
        path
    }

    /// Number of entries left in the staging directory
    pub async fn staged_entries(&self) -> usize {
        let staging = self.dir.path().join("staging");
        let Ok(mut entries) = tokio::fs::read_dir(&staging).await else {
            return 0;
        };
        let mut count = 0;
        while entries
            .next_entry()
            .await
            .expect("Failed to read staging")
            .is_some()
        {
            count += 1;
        }
        count
    }
}

/// Deterministic, non-repeating-per-chunk test content
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31 + i / 251) % 251) as u8).collect()
}

/// Wraps a memory backend and fails chosen calls.
#[derive(Debug)]
pub struct FaultyBackend {
    inner: Arc<MemoryBlobBackend>,
    faults: Faults,
    stores: AtomicUsize,
    fetches: AtomicUsize,
    removes: AtomicUsize,
}

impl FaultyBackend {
    pub fn new(inner: Arc<MemoryBlobBackend>, faults: Faults) -> Self {
        Self {
            inner,
            faults,
            stores: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
            removes: AtomicUsize::new(0),
        }
    }

    fn check(counter: &AtomicUsize, fail_on: Option<usize>, op: &str) -> AppResult<()> {
        let call = counter.fetch_add(1, Ordering::SeqCst) + 1;
        if fail_on == Some(call) {
            return Err(AppError::backend(format!("injected {op} failure on call {call}")));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobBackend for FaultyBackend {
    fn backend_type(&self) -> &str {
        "faulty-memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn store(&self, label: &str, data: Bytes) -> AppResult<BlobId> {
        Self::check(&self.stores, self.faults.store_on, "store")?;
        self.inner.store(label, data).await
    }

    async fn fetch(&self, id: &BlobId) -> AppResult<Bytes> {
        Self::check(&self.fetches, self.faults.fetch_on, "fetch")?;
        self.inner.fetch(id).await
    }

    async fn remove(&self, id: &BlobId) -> AppResult<()> {
        Self::check(&self.removes, self.faults.remove_on, "remove")?;
        self.inner.remove(id).await
    }
}
