//! File repository implementation.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use chunkvault_core::error::{AppError, ErrorKind};
use chunkvault_core::result::AppResult;
use chunkvault_core::types::FileId;
use chunkvault_entity::file::listing::{FILE_LIST_LIMIT, FileListing, FileQuery};
use chunkvault_entity::file::model::{CreateFile, File};
use chunkvault_entity::file::part::NewPart;

const FILE_COLUMNS: &str = "id, name, total_parts, size, content_hash, group_id, created_at";

/// Repository for file CRUD and query operations.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: SqlitePool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a file by ID.
    pub async fn find_by_id(&self, id: FileId) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(&format!("SELECT {FILE_COLUMNS} FROM files WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, format!("Failed to find file {id}"), e)
            })
    }

    /// Register a file together with all of its parts in one transaction.
    ///
    /// Either the file row and every part row become visible, or none do.
    pub async fn create_with_parts(&self, data: &CreateFile, parts: &[NewPart]) -> AppResult<File> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let file = sqlx::query_as::<_, File>(&format!(
            "INSERT INTO files (name, total_parts, size, content_hash, group_id, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {FILE_COLUMNS}"
        ))
        .bind(&data.name)
        .bind(data.total_parts)
        .bind(data.size)
        .bind(&data.content_hash)
        .bind(data.group_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to register file '{}'", data.name),
                e,
            )
        })?;

        for part in parts {
            sqlx::query("INSERT INTO parts (id, file_id, seq) VALUES (?, ?, ?)")
                .bind(&part.id)
                .bind(file.id)
                .bind(part.seq)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Database,
                        format!(
                            "Failed to register part {} (seq {}) of file '{}'",
                            part.id, part.seq, data.name
                        ),
                        e,
                    )
                })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to commit registration of file '{}'", data.name),
                e,
            )
        })?;

        Ok(file)
    }

    /// Search files joined with their group name.
    ///
    /// Set filters are combined with AND; at most [`FILE_LIST_LIMIT`] rows
    /// are returned, ordered by ID.
    pub async fn search(&self, query: &FileQuery) -> AppResult<Vec<FileListing>> {
        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT f.id, f.name, f.size, f.total_parts, g.name AS group_name \
             FROM files f JOIN groups g ON f.group_id = g.id WHERE 1 = 1",
        );

        if let Some(fragment) = query.name_contains.as_deref().filter(|s| !s.is_empty()) {
            builder.push(" AND f.name LIKE ");
            builder.push_bind(format!("%{}%", escape_like(fragment)));
            builder.push(" ESCAPE '\\'");
        }
        if let Some(id) = query.id {
            builder.push(" AND f.id = ");
            builder.push_bind(id);
        }
        if let Some(group_id) = query.group_id {
            builder.push(" AND f.group_id = ");
            builder.push_bind(group_id);
        }

        builder.push(" ORDER BY f.id ASC LIMIT ");
        builder.push_bind(FILE_LIST_LIMIT);

        builder
            .build_query_as::<FileListing>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to search files", e))
    }

    /// Delete a file row. Its parts must already be gone.
    pub async fn delete(&self, id: FileId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, format!("Failed to delete file {id}"), e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all registered files.
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM files")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count files", e))
    }
}

/// Escape `LIKE` wildcards so the fragment matches literally.
fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
