//! Repository implementations for all ChunkVault entities.

pub mod file;
pub mod group;
pub mod part;

pub use file::FileRepository;
pub use group::GroupRepository;
pub use part::PartRepository;

/// Whether a sqlx error is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
