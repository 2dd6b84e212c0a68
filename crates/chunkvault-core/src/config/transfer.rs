//! Transfer behaviour configuration.

use serde::{Deserialize, Serialize};

/// Upload and download tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Maximum number of chunks in flight against the backend.
    /// `1` keeps transfers strictly sequential.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Compare the reassembled digest against the recorded content hash.
    #[serde(default)]
    pub verify_on_download: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            verify_on_download: false,
        }
    }
}

fn default_concurrency() -> usize {
    1
}
