//! Convenience result type alias for ChunkVault.

use crate::error::AppError;

/// A specialized `Result` type for ChunkVault operations.
pub type AppResult<T> = Result<T, AppError>;
