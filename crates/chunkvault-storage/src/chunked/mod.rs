//! Chunk splitting, hashing, and staging.

pub mod hash;
pub mod splitter;
pub mod staging;

pub use hash::{ContentHash, ContentHasher, hash_reader};
pub use splitter::{Chunk, ChunkSplitter, SplitSummary, expected_parts};
pub use staging::{StagingArea, StagingSession};
