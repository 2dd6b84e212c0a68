//! File lookup and filtered listing.

use std::sync::Arc;

use chunkvault_core::error::AppError;
use chunkvault_core::result::AppResult;
use chunkvault_core::types::FileId;
use chunkvault_database::repositories::file::FileRepository;
use chunkvault_database::repositories::group::GroupRepository;
use chunkvault_database::repositories::part::PartRepository;
use chunkvault_entity::file::{File, FileListing, FileQuery, Part};

/// Read-only access to registered files.
#[derive(Debug, Clone)]
pub struct SearchService {
    /// File repository.
    file_repo: Arc<FileRepository>,
    /// Part repository.
    part_repo: Arc<PartRepository>,
    /// Group repository.
    group_repo: Arc<GroupRepository>,
}

impl SearchService {
    /// Creates a new search service.
    pub fn new(
        file_repo: Arc<FileRepository>,
        part_repo: Arc<PartRepository>,
        group_repo: Arc<GroupRepository>,
    ) -> Self {
        Self {
            file_repo,
            part_repo,
            group_repo,
        }
    }

    /// List files matching every set filter, capped at 50 rows.
    pub async fn search(&self, query: &FileQuery) -> AppResult<Vec<FileListing>> {
        if let Some(group_id) = query.group_id {
            if !self.group_repo.exists(group_id).await? {
                return Err(AppError::validation(format!(
                    "Group {group_id} does not exist"
                )));
            }
        }
        self.file_repo.search(query).await
    }

    /// Get a file by ID.
    pub async fn get(&self, file_id: FileId) -> AppResult<File> {
        self.file_repo
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    /// The parts of a file in reassembly order.
    pub async fn parts(&self, file_id: FileId) -> AppResult<Vec<Part>> {
        self.get(file_id).await?;
        self.part_repo.find_by_file(file_id).await
    }
}
