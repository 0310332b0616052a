//! Tracing subscriber installation

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::ConfigError;

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` wins over `config.level` when it is set. Fails if a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| ConfigError::Logging(format!("invalid level {:?}: {}", config.level, e)))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| ConfigError::Logging(e.to_string()))?;

    tracing::debug!(level = %config.level, json = config.json, "Logging initialized");
    Ok(())
}
