use std::env;
use std::path::PathBuf;

use clap::Parser;
use rpassword::prompt_password;
use tracing::Level;

use crate::errors::{Result, SyncError};
use crate::logging::LogConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "ddl-router")]
#[command(about = "Replication DDL resolution and routing tools")]
pub struct CommonArgs {
    /// Source hostname and port in format hostname:port
    #[arg(short = 'H', long, default_value = "localhost:3306")]
    pub host: String,
    /// Username for database authentication
    #[arg(short = 'u', long, default_value = "root")]
    pub user: String,
    /// Database name (optional)
    #[arg(short = 'd', long)]
    pub database: Option<String>,
    /// Skip password prompt (for automated runs)
    #[arg(long)]
    pub no_password_prompt: bool,
    /// Password from command line (alternative to prompt)
    #[arg(long)]
    pub password: Option<String>,
    // Logging options
    /// Log level (debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
    /// Enable file logging
    #[arg(long)]
    pub log_file: bool,
    /// Log file path
    #[arg(long)]
    pub log_file_path: Option<String>,
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    pub fn get_password(&self) -> Result<String> {
        if let Some(ref password) = self.password {
            return Ok(password.clone());
        }
        if let Ok(password) = env::var("SYNC_SOURCE_PASSWORD") {
            return Ok(password);
        }
        if !self.no_password_prompt {
            return prompt_password("Password: ").map_err(SyncError::Io);
        }
        Err(SyncError::CliArgument(
            "No password provided and password prompt is disabled".to_string(),
        ))
    }

    pub fn get_host(&self) -> String {
        env::var("SYNC_SOURCE_HOST").unwrap_or_else(|_| self.host.clone())
    }

    pub fn get_user(&self) -> String {
        env::var("SYNC_SOURCE_USERNAME").unwrap_or_else(|_| self.user.clone())
    }

    pub fn get_database(&self) -> Option<String> {
        env::var("SYNC_SOURCE_DATABASE").ok().or(self.database.clone())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.host.contains(':') {
            return Err(SyncError::CliArgument(
                "Host must be in format 'hostname:port'".to_string(),
            ));
        }
        if let Some(port_str) = self.host.split(':').nth(1)
            && port_str.parse::<u16>().is_err()
        {
            return Err(SyncError::CliArgument("Invalid port number".to_string()));
        }
        if self.user.is_empty() {
            return Err(SyncError::CliArgument("Username cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn init_logging(&self) -> Result<()> {
        let level = match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        let level = if self.verbose { Level::DEBUG } else { level };
        let mut config = LogConfig::new().with_level(level).with_console(true);
        if self.log_file {
            config = config.with_file(true);
            if let Some(ref file_path) = self.log_file_path {
                config = config.with_file_path(PathBuf::from(file_path));
            }
        }
        crate::logging::init_logging(config)
    }
}

pub fn parse_args() -> Result<CommonArgs> {
    let args = CommonArgs::parse();
    args.validate()?;
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(host: &str, user: &str) -> CommonArgs {
        CommonArgs {
            host: host.to_string(),
            user: user.to_string(),
            database: None,
            no_password_prompt: true,
            password: None,
            log_level: "info".to_string(),
            log_file: false,
            log_file_path: None,
            verbose: false,
        }
    }

    #[test]
    fn validates_host_format() {
        assert!(args("localhost:3306", "root").validate().is_ok());
        assert!(args("localhost", "root").validate().is_err());
        assert!(args("localhost:notaport", "root").validate().is_err());
    }

    #[test]
    fn validates_username() {
        assert!(args("localhost:3306", "").validate().is_err());
    }

    #[test]
    fn password_prompt_can_be_disabled() {
        let err = args("localhost:3306", "root").get_password().unwrap_err();
        assert!(format!("{err}").contains("password prompt is disabled"));
    }

    #[test]
    fn explicit_password_wins() {
        let mut a = args("localhost:3306", "root");
        a.password = Some("secret".to_string());
        assert_eq!(a.get_password().unwrap(), "secret");
    }
}
