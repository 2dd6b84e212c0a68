//! Database migration runner.

use sqlx::SqlitePool;
use tracing::info;

use chunkvault_core::error::{AppError, ErrorKind};

/// Run all pending database migrations.
///
/// Migrations are embedded at compile time from the workspace `migrations/`
/// directory; re-running them against an up-to-date database is a no-op.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    info!("Running database migrations...");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database migrations completed successfully");
    Ok(())
}
