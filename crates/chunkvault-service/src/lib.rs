//! # chunkvault-service
//!
//! Business logic service layer for ChunkVault. Each service orchestrates
//! the metadata repositories and the blob backend to implement one
//! application-level use case.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod file;
pub mod group;

pub use file::{DeleteService, DownloadOutcome, DownloadService, SearchService, UploadService};
pub use group::GroupService;
