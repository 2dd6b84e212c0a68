//! File deletion service.

use std::sync::Arc;

use tracing::{debug, info, warn};

use chunkvault_core::error::{AppError, ErrorKind};
use chunkvault_core::result::AppResult;
use chunkvault_core::traits::BlobBackend;
use chunkvault_core::types::FileId;
use chunkvault_database::repositories::file::FileRepository;
use chunkvault_database::repositories::part::PartRepository;

/// Removes a file's chunks from the backend, then its metadata.
///
/// Parts are removed one at a time, in order. If removing a part fails the
/// deletion stops there: earlier parts are gone, that part and all later
/// ones stay registered, and so does the file row. Calling `delete` again
/// resumes from the first remaining part; a part whose blob is already
/// gone from the backend only has its row dropped.
#[derive(Clone)]
pub struct DeleteService {
    /// File repository.
    file_repo: Arc<FileRepository>,
    /// Part repository.
    part_repo: Arc<PartRepository>,
    /// Blob backend holding the chunks.
    backend: Arc<dyn BlobBackend>,
}

impl std::fmt::Debug for DeleteService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeleteService").finish()
    }
}

impl DeleteService {
    /// Creates a new delete service.
    pub fn new(
        file_repo: Arc<FileRepository>,
        part_repo: Arc<PartRepository>,
        backend: Arc<dyn BlobBackend>,
    ) -> Self {
        Self {
            file_repo,
            part_repo,
            backend,
        }
    }

    /// Delete a file and all of its parts. Returns the number of parts removed.
    pub async fn delete(&self, file_id: FileId) -> AppResult<usize> {
        let file = self
            .file_repo
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;

        let parts = self.part_repo.find_by_file(file_id).await?;
        let total = parts.len();

        for part in parts {
            match self.backend.remove(&part.id).await {
                Ok(()) => {}
                // Left over from an attempt that removed the blob but not the row.
                Err(e) if e.kind == ErrorKind::NotFound => {
                    warn!(
                        file_id = %file_id,
                        part_id = %part.id,
                        seq = part.seq,
                        "Part already absent from backend, dropping its row"
                    );
                }
                Err(e) => {
                    return Err(AppError::with_source(
                        ErrorKind::Backend,
                        format!(
                            "Failed to remove part {} (seq {}) of file {file_id}",
                            part.id, part.seq
                        ),
                        e,
                    ));
                }
            }
            self.part_repo.delete(&part.id).await?;
            debug!(file_id = %file_id, part_id = %part.id, seq = part.seq, "Removed part");
        }

        self.file_repo.delete(file_id).await?;

        info!(file_id = %file_id, name = %file.name, parts = total, "File deleted");
        Ok(total)
    }
}
