//! File upload service: split, stage, store, then register.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info, warn};

use chunkvault_core::config::{StorageConfig, TransferConfig};
use chunkvault_core::error::{AppError, ErrorKind};
use chunkvault_core::result::AppResult;
use chunkvault_core::traits::BlobBackend;
use chunkvault_core::types::GroupId;
use chunkvault_database::repositories::file::FileRepository;
use chunkvault_database::repositories::group::GroupRepository;
use chunkvault_entity::file::{CreateFile, File, NewPart};
use chunkvault_storage::chunked::staging::{discard_staged, load_staged};
use chunkvault_storage::chunked::{
    ChunkSplitter, SplitSummary, StagingArea, StagingSession, expected_parts,
};

/// Uploads local files into the blob backend as fixed-size parts.
///
/// Metadata is written only after every chunk has been stored, in a single
/// transaction. A failed upload leaves no rows behind and makes a
/// best-effort attempt to remove the chunks it already stored.
#[derive(Clone)]
pub struct UploadService {
    /// File repository.
    file_repo: Arc<FileRepository>,
    /// Group repository.
    group_repo: Arc<GroupRepository>,
    /// Blob backend receiving the chunks.
    backend: Arc<dyn BlobBackend>,
    /// Staging area for chunks in flight.
    staging: StagingArea,
    chunk_size: u64,
    concurrency: usize,
}

impl std::fmt::Debug for UploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadService")
            .field("backend", &self.backend.backend_type())
            .field("chunk_size", &self.chunk_size)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        file_repo: Arc<FileRepository>,
        group_repo: Arc<GroupRepository>,
        backend: Arc<dyn BlobBackend>,
        storage: &StorageConfig,
        transfer: &TransferConfig,
    ) -> Self {
        Self {
            file_repo,
            group_repo,
            backend,
            staging: StagingArea::new(storage.staging_dir.clone()),
            chunk_size: storage.chunk_size_bytes,
            concurrency: transfer.concurrency.max(1),
        }
    }

    /// Upload the file at `source` into `group_id`.
    pub async fn upload(&self, source: &Path, group_id: GroupId) -> AppResult<File> {
        if !self.group_repo.exists(group_id).await? {
            return Err(AppError::validation(format!(
                "Group {group_id} does not exist"
            )));
        }

        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                AppError::validation(format!("'{}' does not name a file", source.display()))
            })?;

        let reader = tokio::fs::File::open(source)
            .await
            .map_err(|e| source_error(source, "open", e))?;
        let size = reader
            .metadata()
            .await
            .map_err(|e| source_error(source, "stat", e))?
            .len();
        let expected = expected_parts(size, self.chunk_size);

        info!(
            name = %name,
            size,
            expected_parts = expected,
            group_id = %group_id,
            "Starting upload"
        );

        let session = self.staging.open_session().await?;
        let mut stored = Vec::new();
        let outcome = self
            .store_chunks(reader, &name, &session, &mut stored)
            .await;
        session.purge().await;

        let summary = match outcome {
            Ok(summary) => summary,
            Err(e) => {
                self.compensate(&name, &stored).await;
                return Err(e);
            }
        };

        if summary.chunks != expected || summary.size != size {
            self.compensate(&name, &stored).await;
            return Err(AppError::validation(format!(
                "'{name}' changed during upload: expected {size} bytes in {expected} parts, \
                 read {} bytes in {} parts",
                summary.size, summary.chunks
            )));
        }

        stored.sort_by_key(|p| p.seq);

        let data = CreateFile {
            name: name.clone(),
            total_parts: summary.chunks as i64,
            size: summary.size as i64,
            content_hash: summary.content_hash.into_string(),
            group_id,
        };

        let file = match self.file_repo.create_with_parts(&data, &stored).await {
            Ok(file) => file,
            Err(e) => {
                self.compensate(&name, &stored).await;
                return Err(e);
            }
        };

        info!(
            file_id = %file.id,
            name = %file.name,
            size = file.size,
            parts = file.total_parts,
            "Upload completed"
        );

        Ok(file)
    }

    /// Split the source and hand every chunk to the backend.
    ///
    /// At most `concurrency` chunks are staged or in flight at once. Every
    /// successfully stored chunk is pushed onto `stored`, including when an
    /// error is returned, so the caller can clean up.
    async fn store_chunks(
        &self,
        reader: tokio::fs::File,
        name: &str,
        session: &StagingSession,
        stored: &mut Vec<NewPart>,
    ) -> AppResult<SplitSummary> {
        let mut splitter = ChunkSplitter::new(reader, self.chunk_size)?;
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let (tx, mut rx) = mpsc::unbounded_channel::<AppResult<NewPart>>();

        let mut spawned = 0usize;
        let mut received = 0usize;
        let mut failure: Option<AppError> = None;

        loop {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| AppError::internal(format!("Transfer semaphore closed: {e}")))?;

            // Finished tasks report before releasing their permit, so every
            // task that freed a slot has its result queued by now.
            while let Ok(result) = rx.try_recv() {
                received += 1;
                collect(result, stored, &mut failure);
            }
            if failure.is_some() {
                break;
            }

            let chunk = match splitter.next_chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            };

            let staged = match session.stage(chunk.seq, &chunk.data).await {
                Ok(path) => path,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            };

            let seq = chunk.seq;
            let label = format!("{name}.part{seq}");
            let backend = Arc::clone(&self.backend);
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = store_staged(backend.as_ref(), &label, seq, &staged).await;
                let _ = tx.send(result);
                drop(permit);
            });
            spawned += 1;
        }

        drop(tx);
        while let Some(result) = rx.recv().await {
            received += 1;
            collect(result, stored, &mut failure);
        }

        if let Some(e) = failure {
            return Err(e);
        }
        if received != spawned {
            return Err(AppError::internal(format!(
                "{} of {spawned} chunk transfers for '{name}' did not report back",
                spawned - received
            )));
        }

        Ok(splitter.finish())
    }

    /// Remove chunks stored by a failed upload. Errors are logged only.
    async fn compensate(&self, name: &str, stored: &[NewPart]) {
        if stored.is_empty() {
            return;
        }
        let mut removed = 0usize;
        for part in stored {
            match self.backend.remove(&part.id).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(
                    name = %name,
                    part_id = %part.id,
                    seq = part.seq,
                    error = %e,
                    "Failed to remove chunk of aborted upload"
                ),
            }
        }
        warn!(
            name = %name,
            removed,
            total = stored.len(),
            "Rolled back chunks of aborted upload"
        );
    }
}

async fn store_staged(
    backend: &dyn BlobBackend,
    label: &str,
    seq: u64,
    staged: &Path,
) -> AppResult<NewPart> {
    let data = load_staged(staged).await?;
    let bytes = data.len();
    let id = backend.store(label, data).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Backend,
            format!("Failed to store chunk {seq} ('{label}')"),
            e,
        )
    })?;
    discard_staged(staged).await;
    debug!(seq, part_id = %id, bytes, "Stored chunk");
    Ok(NewPart {
        id,
        seq: seq as i64,
    })
}

fn collect(result: AppResult<NewPart>, stored: &mut Vec<NewPart>, failure: &mut Option<AppError>) {
    match result {
        Ok(part) => stored.push(part),
        Err(e) => {
            if failure.is_none() {
                *failure = Some(e);
            }
        }
    }
}

fn source_error(source: &Path, op: &str, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::with_source(
            ErrorKind::NotFound,
            format!("Source file {} not found", source.display()),
            e,
        )
    } else {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to {op} source file {}", source.display()),
            e,
        )
    }
}
