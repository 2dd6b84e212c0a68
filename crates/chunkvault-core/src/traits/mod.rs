//! Core traits defined in `chunkvault-core` and implemented by other crates.

pub mod backend;

pub use backend::BlobBackend;
