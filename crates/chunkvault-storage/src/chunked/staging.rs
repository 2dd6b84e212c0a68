//! Transient on-disk staging for chunks awaiting transfer.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use chunkvault_core::error::{AppError, ErrorKind};
use chunkvault_core::result::AppResult;

/// Root directory under which each upload gets its own staging session.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open a fresh, empty session directory.
    pub async fn open_session(&self) -> AppResult<StagingSession> {
        let id = Uuid::new_v4();
        let dir = self.root.join(id.to_string());
        fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create staging directory: {}", dir.display()),
                e,
            )
        })?;
        debug!(session = %id, dir = %dir.display(), "Opened staging session");
        Ok(StagingSession { id, dir })
    }
}

/// The staging directory of a single upload.
#[derive(Debug, Clone)]
pub struct StagingSession {
    id: Uuid,
    dir: PathBuf,
}

impl StagingSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the staged copy of chunk `seq`.
    pub fn chunk_path(&self, seq: u64) -> PathBuf {
        self.dir.join(format!("{seq:06}.chunk"))
    }

    /// Write a chunk to the session directory.
    pub async fn stage(&self, seq: u64, data: &Bytes) -> AppResult<PathBuf> {
        let path = self.chunk_path(seq);
        fs::write(&path, data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to stage chunk {seq}: {}", path.display()),
                e,
            )
        })?;
        Ok(path)
    }

    /// Purge the whole session directory. Failures are logged, not returned.
    pub async fn purge(&self) {
        match fs::remove_dir_all(&self.dir).await {
            Ok(()) => debug!(session = %self.id, "Purged staging session"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                session = %self.id,
                dir = %self.dir.display(),
                error = %e,
                "Failed to purge staging session"
            ),
        }
    }
}

/// Read a staged chunk back into memory.
pub async fn load_staged(path: &Path) -> AppResult<Bytes> {
    fs::read(path).await.map(Bytes::from).map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to read staged chunk: {}", path.display()),
            e,
        )
    })
}

/// Remove a staged chunk once it has been handed off. Missing files are fine.
pub async fn discard_staged(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Failed to remove staged chunk");
        }
    }
}
