//! Rectorate configuration loading

use ::config::{Config, Environment, File};
use rectorate_access::Identity;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;

type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RectorateConfig {
    /// Root identity installed when a fresh ledger is created
    pub rector: Identity,
    #[serde(default)]
    pub event_log: EventLogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where events are appended
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLogConfig {
    /// JSON-lines file; events stay in memory when unset
    pub path: Option<PathBuf>,
}

/// Logging output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG` when set
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl RectorateConfig {
    /// Configuration with defaults for everything but the rector
    pub fn new(rector: Identity) -> Self {
        Self {
            rector,
            event_log: EventLogConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.rector.is_null() {
            return Err(ConfigError::Validation(
                "rector must not be the null identity".to_string(),
            ));
        }
        if let Some(path) = &self.event_log.path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(
                    "event_log.path must not be empty".to_string(),
                ));
            }
        }
        EnvFilter::try_new(&self.logging.level).map_err(|e| {
            ConfigError::Validation(format!(
                "invalid logging.level {:?}: {}",
                self.logging.level, e
            ))
        })?;
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }
}

/// Loads [`RectorateConfig`] from a TOML file and the environment
///
/// Environment variables take precedence over the file. With the default
/// prefix, `RECTORATE_RECTOR` sets the rector and `RECTORATE_EVENT_LOG__PATH`
/// sets the event log path.
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Loader reading only the environment
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: "RECTORATE".to_string(),
        }
    }

    /// Loader reading `path` (if it exists) and the environment
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: Some(path),
            ..Self::new()
        }
    }

    /// Use a different environment variable prefix
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    /// Load and validate
    pub fn load(&self) -> Result<RectorateConfig> {
        let mut builder = Config::builder();
        if let Some(path) = &self.config_path {
            builder = builder.add_source(File::from(path.clone()).required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__"),
        );

        let config: RectorateConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        tracing::debug!(
            path = ?self.config_path,
            rector = %config.rector,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Validate and write `config` to the loader's path
    pub fn save(&self, config: &RectorateConfig) -> Result<()> {
        config.validate()?;
        let path = self.config_path.as_ref().ok_or_else(|| {
            ConfigError::Validation("no configuration path to save to".to_string())
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, config.to_toml()?)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
