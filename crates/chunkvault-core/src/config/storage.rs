//! Chunking and blob backend configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Size of every chunk except possibly the last (default 25 MiB).
    #[serde(default = "default_chunk_size")]
    pub chunk_size_bytes: u64,
    /// Directory where chunks are staged before being handed to the backend.
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,
    /// Directory downloads are reassembled into.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Blob backend selection.
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            chunk_size_bytes: default_chunk_size(),
            staging_dir: default_staging_dir(),
            output_dir: default_output_dir(),
            backend: BackendConfig::default(),
        }
    }
}

/// Blob backend provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Provider name: `"local"` or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Root directory for the `local` provider.
    #[serde(default = "default_local_root")]
    pub local_root: PathBuf,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            local_root: default_local_root(),
        }
    }
}

fn default_chunk_size() -> u64 {
    25 * 1024 * 1024
}

fn default_staging_dir() -> PathBuf {
    std::env::temp_dir().join("chunkvault-staging")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./out")
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_local_root() -> PathBuf {
    PathBuf::from("./data/blobs")
}
