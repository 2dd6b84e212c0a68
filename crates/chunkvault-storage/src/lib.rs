//! # chunkvault-storage
//!
//! Chunk splitting, content hashing, upload staging, and the blob backend
//! implementations for ChunkVault.

pub mod chunked;
pub mod providers;

pub use chunked::{ChunkSplitter, ContentHash, StagingArea};
pub use providers::{LocalBlobBackend, MemoryBlobBackend};
