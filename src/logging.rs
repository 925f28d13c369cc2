use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::errors::{Result, SyncError};

/// Logging setup shared by the binaries.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub console: bool,
    pub file: bool,
    pub file_path: PathBuf,
}

impl LogConfig {
    pub fn new() -> Self {
        Self {
            level: Level::INFO,
            console: true,
            file: false,
            file_path: PathBuf::from("ddl-router.log"),
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    pub fn with_file(mut self, file: bool) -> Self {
        self.file = file;
        self
    }

    pub fn with_file_path(mut self, path: PathBuf) -> Self {
        self.file_path = path;
        self
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level when set. With file
/// logging enabled, output goes to the configured file instead of the
/// console.
pub fn init_logging(config: LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string().to_lowercase()));

    if config.file {
        let dir = config
            .file_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = config
            .file_path
            .file_name()
            .unwrap_or_else(|| OsStr::new("ddl-router.log"));
        let appender = tracing_appender::rolling::never(dir, file_name);

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(appender)
            .with_ansi(false)
            .try_init()
            .map_err(|e| SyncError::Logging(e.to_string()))?;
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| SyncError::Logging(e.to_string()))?;
    }

    Ok(())
}

/// Initializes logging with default settings (INFO to the console).
pub fn init_default_logging() -> Result<()> {
    init_logging(LogConfig::new())
}

/// Initializes logging driven entirely by `RUST_LOG`.
pub fn init_logging_from_env() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .map_err(|e| SyncError::Logging(e.to_string()))
}
