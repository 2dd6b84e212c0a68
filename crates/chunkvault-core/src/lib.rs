//! # chunkvault-core
//!
//! Core crate for ChunkVault. Contains the blob backend trait,
//! configuration schemas, typed identifiers, and the unified error system.
//!
//! This crate has **no** internal dependencies on other ChunkVault crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
