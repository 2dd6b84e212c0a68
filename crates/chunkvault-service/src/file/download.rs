//! File download service: fetch parts in order and reassemble.

use std::path::PathBuf;
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{info, warn};

use chunkvault_core::config::{StorageConfig, TransferConfig};
use chunkvault_core::error::{AppError, ErrorKind};
use chunkvault_core::result::AppResult;
use chunkvault_core::traits::BlobBackend;
use chunkvault_core::types::FileId;
use chunkvault_database::repositories::file::FileRepository;
use chunkvault_database::repositories::part::PartRepository;
use chunkvault_entity::file::File;
use chunkvault_storage::chunked::{ContentHash, ContentHasher};

/// Reassembles stored files from their parts.
#[derive(Clone)]
pub struct DownloadService {
    /// File repository.
    file_repo: Arc<FileRepository>,
    /// Part repository.
    part_repo: Arc<PartRepository>,
    /// Blob backend holding the chunks.
    backend: Arc<dyn BlobBackend>,
    /// Directory downloads are written into.
    output_dir: PathBuf,
    concurrency: usize,
    verify: bool,
}

impl std::fmt::Debug for DownloadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadService")
            .field("output_dir", &self.output_dir)
            .field("concurrency", &self.concurrency)
            .field("verify", &self.verify)
            .finish()
    }
}

/// Result of a completed reassembly.
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    /// The file that was reassembled.
    pub file: File,
    /// Where the content was written, when written to disk.
    pub path: Option<PathBuf>,
    /// Number of bytes written.
    pub bytes_written: u64,
    /// Digest of the bytes actually written.
    pub content_hash: ContentHash,
    /// Whether the digest was checked against the recorded hash.
    pub verified: bool,
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(
        file_repo: Arc<FileRepository>,
        part_repo: Arc<PartRepository>,
        backend: Arc<dyn BlobBackend>,
        storage: &StorageConfig,
        transfer: &TransferConfig,
    ) -> Self {
        Self {
            file_repo,
            part_repo,
            backend,
            output_dir: storage.output_dir.clone(),
            concurrency: transfer.concurrency.max(1),
            verify: transfer.verify_on_download,
        }
    }

    /// Reassemble `file_id` into `<output_dir>/<destination>`.
    ///
    /// A failure part-way leaves everything written so far in place,
    /// including the full output when verification fails.
    pub async fn download(&self, file_id: FileId, destination: &str) -> AppResult<DownloadOutcome> {
        validate_destination_name(destination)?;
        let file = self.find_file(file_id).await?;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create output directory {}", self.output_dir.display()),
                    e,
                )
            })?;

        let path = self.output_dir.join(destination);
        let out = tokio::fs::File::create(&path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create {}", path.display()),
                e,
            )
        })?;

        let mut writer = BufWriter::new(out);
        let written = self.write_parts(file, &mut writer).await;
        // Flush even when reassembly failed so the partial output stays on disk.
        let flushed = writer.shutdown().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to flush {}", path.display()),
                e,
            )
        });
        let mut outcome = settle(written, flushed)?;

        info!(
            file_id = %outcome.file.id,
            path = %path.display(),
            bytes = outcome.bytes_written,
            verified = outcome.verified,
            "Download completed"
        );

        outcome.path = Some(path);
        Ok(outcome)
    }

    /// Reassemble `file_id` into an arbitrary writer.
    pub async fn reassemble_into<W>(&self, file_id: FileId, writer: &mut W) -> AppResult<DownloadOutcome>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let file = self.find_file(file_id).await?;
        let written = self.write_parts(file, writer).await;
        let flushed = writer.flush().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to flush output", e)
        });
        settle(written, flushed)
    }

    async fn find_file(&self, file_id: FileId) -> AppResult<File> {
        self.file_repo
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    async fn write_parts<W>(&self, file: File, writer: &mut W) -> AppResult<DownloadOutcome>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let parts = self.part_repo.find_by_file(file.id).await?;
        if parts.len() as i64 != file.total_parts {
            warn!(
                file_id = %file.id,
                expected = file.total_parts,
                found = parts.len(),
                "File has an incomplete part set"
            );
        }

        let file_id = file.id;
        let mut fetched = stream::iter(parts)
            .map(|part| {
                let backend = Arc::clone(&self.backend);
                async move {
                    backend.fetch(&part.id).await.map_err(|e| {
                        AppError::with_source(
                            ErrorKind::Backend,
                            format!(
                                "Failed to fetch part {} (seq {}) of file {file_id}",
                                part.id, part.seq
                            ),
                            e,
                        )
                    })
                }
            })
            .buffered(self.concurrency);

        let mut hasher = ContentHasher::new();
        while let Some(data) = fetched.try_next().await? {
            hasher.update(&data);
            writer.write_all(&data).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to write output for file {file_id}"),
                    e,
                )
            })?;
        }

        let bytes_written = hasher.bytes_hashed();
        let content_hash = hasher.finalize();

        if self.verify && !content_hash.matches(&file.content_hash) {
            return Err(AppError::integrity(format!(
                "Content hash mismatch for file {file_id}: recorded {}, reassembled {content_hash}",
                file.content_hash
            )));
        }

        Ok(DownloadOutcome {
            file,
            path: None,
            bytes_written,
            content_hash,
            verified: self.verify,
        })
    }
}

/// Combine the reassembly result with the final flush. A reassembly error
/// wins; a flush failure behind it is only logged.
fn settle(
    written: AppResult<DownloadOutcome>,
    flushed: AppResult<()>,
) -> AppResult<DownloadOutcome> {
    match (written, flushed) {
        (Ok(outcome), Ok(())) => Ok(outcome),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(flush)) => {
            warn!(error = %flush, "Failed to flush partial output");
            Err(e)
        }
    }
}

/// A destination must be a plain file name inside the output directory.
fn validate_destination_name(name: &str) -> AppResult<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(AppError::validation(format!(
            "Invalid destination name '{name}'"
        )));
    }
    Ok(())
}
