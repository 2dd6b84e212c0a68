//! # chunkvault-database
//!
//! SQLite connection management, embedded migrations, and the repositories
//! that make up the ChunkVault metadata store.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
