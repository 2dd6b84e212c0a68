//! Core type definitions used across the ChunkVault workspace.

pub mod id;

pub use id::*;
