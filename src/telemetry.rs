//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt};

use chunkvault_core::config::LoggingConfig;
use chunkvault_core::error::AppError;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured level. Calling this twice returns an
/// error instead of panicking.
pub fn init_logging(config: &LoggingConfig) -> Result<(), AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .try_init(),
        _ => fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    result.map_err(|e| AppError::configuration(format!("Failed to initialise logging: {e}")))
}
