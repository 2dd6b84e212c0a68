//! Database configuration.

use serde::{Deserialize, Serialize};

/// Metadata store connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL (`sqlite://path` or `sqlite::memory:`).
    #[serde(default = "default_url")]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// How long a statement waits on a locked database, in milliseconds.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_connections: default_max_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

fn default_url() -> String {
    "sqlite://data/db.sqlite".to_string()
}

fn default_max_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_busy_timeout() -> u64 {
    5_000
}
