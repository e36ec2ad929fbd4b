//! Application configuration module
//!
//! Configuration can be built in code with [`AppConfigBuilder`] or loaded
//! from a TOML file:
//!
//! ```toml
//! server_url = "https://reports.example.com"
//! submit_timeout_ms = 15000
//! probe_interval_secs = 10
//! max_concurrent_submissions = 1
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default per-submission timeout
pub const DEFAULT_SUBMIT_TIMEOUT_MS: u64 = 15_000;
/// Default interval between reachability probes
pub const DEFAULT_PROBE_INTERVAL_SECS: u64 = 10;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Report API base URL
    pub server_url: Option<String>,
    /// SQLite file backing the offline queue
    pub database_path: Option<PathBuf>,
    /// Upper bound for one report submission
    pub submit_timeout_ms: u64,
    /// How often the connectivity monitor probes the server
    pub probe_interval_secs: u64,
    /// Submissions in flight during one drain pass
    pub max_concurrent_submissions: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            database_path: None,
            submit_timeout_ms: DEFAULT_SUBMIT_TIMEOUT_MS,
            probe_interval_secs: DEFAULT_PROBE_INTERVAL_SECS,
            max_concurrent_submissions: 1,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.server_url {
            let valid = (url.starts_with("http://") || url.starts_with("https://"))
                && url.split("://").nth(1).is_some_and(|rest| !rest.is_empty());
            if !valid {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        if self.submit_timeout_ms == 0 {
            return Err(ConfigError::invalid_value("submit_timeout_ms", "must be greater than zero"));
        }
        if self.probe_interval_secs == 0 {
            return Err(ConfigError::invalid_value("probe_interval_secs", "must be greater than zero"));
        }
        if self.max_concurrent_submissions == 0 {
            return Err(ConfigError::invalid_value(
                "max_concurrent_submissions",
                "must be at least one",
            ));
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Start from an existing configuration
    pub fn from_config(config: AppConfig) -> Self {
        Self { config }
    }

    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.config.server_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    /// Set the queue database path
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.database_path = Some(path.into());
        self
    }

    pub fn submit_timeout_ms(mut self, millis: u64) -> Self {
        self.config.submit_timeout_ms = millis;
        self
    }

    pub fn probe_interval_secs(mut self, secs: u64) -> Self {
        self.config.probe_interval_secs = secs;
        self
    }

    pub fn max_concurrent_submissions(mut self, limit: usize) -> Self {
        self.config.max_concurrent_submissions = limit;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },
    #[error("could not read configuration: {0}")]
    Io(String),
    #[error("could not parse configuration: {0}")]
    Parse(String),
}

impl ConfigError {
    pub fn invalid_value(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }
}
