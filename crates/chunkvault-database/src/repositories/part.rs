//! Part repository implementation.

use sqlx::SqlitePool;

use chunkvault_core::error::{AppError, ErrorKind};
use chunkvault_core::result::AppResult;
use chunkvault_core::types::{BlobId, FileId};
use chunkvault_entity::file::part::Part;

/// Repository for the chunk rows of a file.
#[derive(Debug, Clone)]
pub struct PartRepository {
    pool: SqlitePool,
}

impl PartRepository {
    /// Create a new part repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All parts of a file in reassembly order.
    pub async fn find_by_file(&self, file_id: FileId) -> AppResult<Vec<Part>> {
        sqlx::query_as::<_, Part>(
            "SELECT id, file_id, seq FROM parts WHERE file_id = ? ORDER BY seq ASC",
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to list parts of file {file_id}"),
                e,
            )
        })
    }

    /// Delete a single part row.
    pub async fn delete(&self, id: &BlobId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM parts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, format!("Failed to delete part {id}"), e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Count the parts registered for a file.
    pub async fn count_by_file(&self, file_id: FileId) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM parts WHERE file_id = ?")
            .bind(file_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to count parts of file {file_id}"),
                    e,
                )
            })
    }
}
