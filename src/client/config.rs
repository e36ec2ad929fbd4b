use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError};

/// Default server URL
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Environment variable overriding the server URL
pub const API_URL_ENV: &str = "FIELDREPORT_API_URL";

/// Environment variable overriding the queue database path
pub const DB_PATH_ENV: &str = "FIELDREPORT_DB_PATH";

/// Client configuration wrapper.
#[derive(Debug, Clone)]
pub struct Config {
    app: AppConfig,
}

impl Default for Config {
    fn default() -> Self {
        match Self::with_builder(AppConfig::builder()) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring invalid environment configuration: {}", e);
                Self { app: AppConfig::default() }
            }
        }
    }
}

impl Config {
    /// Create a new configuration from defaults and environment overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a builder, then apply environment overrides
    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        let app = builder.build()?;
        Self::from_app_config(app)
    }

    /// Load a TOML file, then apply environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_app_config(AppConfig::load(path)?)
    }

    fn from_app_config(app: AppConfig) -> Result<Self, ConfigError> {
        let mut builder = AppConfigBuilder::from_config(app);
        if let Ok(url) = std::env::var(API_URL_ENV) {
            builder = builder.server_url(url);
        }
        if let Ok(path) = std::env::var(DB_PATH_ENV) {
            builder = builder.database_path(path);
        }
        Ok(Self { app: builder.build()? })
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url(), path)
    }

    pub fn server_url(&self) -> &str {
        self.app.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    /// SQLite file backing the offline queue
    ///
    /// Falls back to the platform data directory.
    pub fn database_path(&self) -> PathBuf {
        match &self.app.database_path {
            Some(path) => path.clone(),
            None => {
                let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
                path.push("fieldreport");
                path.push("queue.db");
                path
            }
        }
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.app.submit_timeout_ms)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.app.probe_interval_secs)
    }

    pub fn max_concurrent_submissions(&self) -> usize {
        self.app.max_concurrent_submissions
    }

    pub fn app(&self) -> &AppConfig {
        &self.app
    }
}
