use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SyncError};

/// Main configuration structure for the replication DDL routing tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Source (binlog master) connection settings
    #[serde(default)]
    pub source: DatabaseConfig,

    /// Target connection settings
    #[serde(default = "default_target")]
    pub target: DatabaseConfig,

    /// Status reporting settings
    #[serde(default)]
    pub status: StatusConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database host (e.g., "localhost:3306")
    #[serde(default = "default_source_host")]
    pub host: String,

    /// Database username
    #[serde(default = "default_username")]
    pub username: String,

    /// Database password (can be overridden by environment variable)
    #[serde(default)]
    pub password: Option<String>,

    /// Database name
    #[serde(default)]
    pub database: Option<String>,

    /// Connection pool size
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Status reporting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Seconds between status snapshots
    #[serde(default = "default_report_interval")]
    pub report_interval_secs: u64,

    /// Probe the source with SHOW MASTER STATUS when privileged
    #[serde(default = "default_probe_master")]
    pub probe_master: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional)
    #[serde(default)]
    pub file: Option<String>,

    /// Enable console output
    #[serde(default = "default_console_output")]
    pub console: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: DatabaseConfig::default(),
            target: default_target(),
            status: StatusConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_source_host(),
            username: default_username(),
            password: None,
            database: None,
            pool_size: default_pool_size(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: default_report_interval(),
            probe_master: default_probe_master(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            console: default_console_output(),
        }
    }
}

fn default_target() -> DatabaseConfig {
    DatabaseConfig {
        host: default_target_host(),
        ..DatabaseConfig::default()
    }
}

// Default value functions
fn default_source_host() -> String {
    "localhost:3306".to_string()
}
fn default_target_host() -> String {
    "localhost:4000".to_string()
}
fn default_username() -> String {
    "root".to_string()
}
fn default_pool_size() -> u32 {
    5
}
fn default_timeout() -> u64 {
    30
}
fn default_report_interval() -> u64 {
    5
}
fn default_probe_master() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_console_output() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from a JSON or TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("json");

        let content = std::fs::read_to_string(path)
            .map_err(|e| SyncError::Configuration(format!("Failed to read config file: {e}")))?;

        let config = match extension {
            "json" => serde_json::from_str(&content)
                .map_err(|e| SyncError::Configuration(format!("Failed to parse JSON config: {e}")))?,
            "toml" => toml::from_str(&content)
                .map_err(|e| SyncError::Configuration(format!("Failed to parse TOML config: {e}")))?,
            _ => {
                return Err(SyncError::Configuration(format!(
                    "Unsupported config file format: {extension}"
                )))
            }
        };

        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_environment_overrides();
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_environment_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    pub fn apply_environment_overrides(&mut self) {
        if let Ok(host) = std::env::var("SYNC_SOURCE_HOST") {
            self.source.host = host;
        }
        if let Ok(username) = std::env::var("SYNC_SOURCE_USERNAME") {
            self.source.username = username;
        }
        if let Ok(password) = std::env::var("SYNC_SOURCE_PASSWORD") {
            self.source.password = Some(password);
        }
        if let Ok(database) = std::env::var("SYNC_SOURCE_DATABASE") {
            self.source.database = Some(database);
        }

        if let Ok(host) = std::env::var("SYNC_TARGET_HOST") {
            self.target.host = host;
        }
        if let Ok(username) = std::env::var("SYNC_TARGET_USERNAME") {
            self.target.username = username;
        }
        if let Ok(password) = std::env::var("SYNC_TARGET_PASSWORD") {
            self.target.password = Some(password);
        }

        if let Ok(level) = std::env::var("SYNC_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(interval) = std::env::var("SYNC_STATUS_INTERVAL") {
            if let Ok(interval) = interval.parse() {
                self.status.report_interval_secs = interval;
            }
        }
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("json");

        let content = match extension {
            "json" => serde_json::to_string_pretty(self)
                .map_err(|e| SyncError::Configuration(format!("Failed to serialize config: {e}")))?,
            "toml" => toml::to_string_pretty(self)
                .map_err(|e| SyncError::Configuration(format!("Failed to serialize config: {e}")))?,
            _ => {
                return Err(SyncError::Configuration(format!(
                    "Unsupported config file format: {extension}"
                )))
            }
        };

        std::fs::write(path, content)
            .map_err(|e| SyncError::Configuration(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Get the source password, checking environment variables if not set in config
    pub fn get_source_password(&self) -> Option<String> {
        self.source
            .password
            .clone()
            .or_else(|| std::env::var("SYNC_SOURCE_PASSWORD").ok())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (role, db) in [("source", &self.source), ("target", &self.target)] {
            if db.host.is_empty() {
                return Err(SyncError::Configuration(format!("{role} host cannot be empty")));
            }
            if db.username.is_empty() {
                return Err(SyncError::Configuration(format!(
                    "{role} username cannot be empty"
                )));
            }
            if db.pool_size == 0 {
                return Err(SyncError::Configuration(format!(
                    "{role} pool size must be greater than 0"
                )));
            }
            if db.timeout_secs == 0 {
                return Err(SyncError::Configuration(format!(
                    "{role} timeout must be greater than 0"
                )));
            }
        }
        if self.status.report_interval_secs == 0 {
            return Err(SyncError::Configuration(
                "status report interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration builder for programmatic configuration
pub struct ConfigBuilder {
    config: AppConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn source_host(mut self, host: impl Into<String>) -> Self {
        self.config.source.host = host.into();
        self
    }

    pub fn source_username(mut self, username: impl Into<String>) -> Self {
        self.config.source.username = username.into();
        self
    }

    pub fn source_password(mut self, password: impl Into<String>) -> Self {
        self.config.source.password = Some(password.into());
        self
    }

    pub fn source_database(mut self, database: impl Into<String>) -> Self {
        self.config.source.database = Some(database.into());
        self
    }

    pub fn target_host(mut self, host: impl Into<String>) -> Self {
        self.config.target.host = host.into();
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn report_interval(mut self, secs: u64) -> Self {
        self.config.status.report_interval_secs = secs;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
