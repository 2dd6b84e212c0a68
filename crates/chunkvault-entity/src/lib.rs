//! # chunkvault-entity
//!
//! Domain entity models for ChunkVault. Every struct in this crate
//! represents a metadata table row or a read-side projection of one.
//! Database rows derive `sqlx::FromRow`.

pub mod file;
pub mod group;
