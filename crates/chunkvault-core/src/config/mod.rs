//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! optional TOML files plus `CHUNKVAULT__` environment variables. Each
//! sub-module represents a logical configuration section.

pub mod database;
pub mod logging;
pub mod storage;
pub mod transfer;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::storage::{BackendConfig, StorageConfig};
pub use self::transfer::TransferConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Every section has defaults, so an empty source set yields a usable
/// configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Metadata store connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Chunking, staging, and blob backend settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Upload and download behaviour.
    #[serde(default)]
    pub transfer: TransferConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default` with an environment-specific overlay
    /// `config/{env}` and environment variables prefixed with `CHUNKVAULT__`
    /// (e.g. `CHUNKVAULT__STORAGE__CHUNK_SIZE_BYTES`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CHUNKVAULT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the store unusable.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.url.trim().is_empty() {
            return Err(AppError::configuration("database.url must not be empty"));
        }
        if self.database.max_connections == 0 {
            return Err(AppError::configuration(
                "database.max_connections must be at least 1",
            ));
        }
        if self.storage.chunk_size_bytes == 0 {
            return Err(AppError::configuration(
                "storage.chunk_size_bytes must be greater than zero",
            ));
        }
        if self.transfer.concurrency == 0 {
            return Err(AppError::configuration(
                "transfer.concurrency must be at least 1",
            ));
        }
        match self.logging.format.as_str() {
            "json" | "pretty" => {}
            other => {
                return Err(AppError::configuration(format!(
                    "logging.format must be \"json\" or \"pretty\", got \"{other}\""
                )));
            }
        }
        Ok(())
    }
}
