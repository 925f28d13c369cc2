use thiserror::Error;

/// Main error type for the replication DDL routing engine.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("DDL error: {0}")]
    Ddl(DdlError),

    #[error("Connection error: {0}")]
    Connection(mysql::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("CLI argument error: {0}")]
    CliArgument(String),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(std::io::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Structured failures from statement resolution and routing.
#[derive(Error, Debug)]
pub enum DdlError {
    /// Statement text the parser rejected. Non-fatal at the splitter, which
    /// degrades to pass-through of the original text; fatal at the extractor
    /// and rewriter.
    #[error("error while parsing sql: {sql}, err: {message}")]
    Parse { sql: String, message: String },

    /// A DROP TABLE naming several tables reached a single-table contract.
    /// The statement must go through the splitter first.
    #[error("drop table with multiple tables, statement must be split first: {sql}")]
    MultiTableDrop { sql: String },

    /// DDL kind outside the routing dispatch.
    #[error("unsupported ddl kind: {sql}")]
    UnsupportedKind { sql: String },
}

pub type Result<T> = std::result::Result<T, SyncError>;

impl From<DdlError> for SyncError {
    fn from(err: DdlError) -> Self {
        SyncError::Ddl(err)
    }
}

impl From<mysql::Error> for SyncError {
    fn from(err: mysql::Error) -> Self {
        SyncError::Connection(err)
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err)
    }
}

impl From<String> for SyncError {
    fn from(err: String) -> Self {
        SyncError::Unknown(err)
    }
}

impl From<&str> for SyncError {
    fn from(err: &str) -> Self {
        SyncError::Unknown(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddl_error_display_includes_statement_text() {
        let err = DdlError::UnsupportedKind {
            sql: "CREATE VIEW v AS SELECT 1".to_string(),
        };
        assert!(format!("{err}").contains("CREATE VIEW v AS SELECT 1"));
    }

    #[test]
    fn sync_error_wraps_ddl_error() {
        let err: SyncError = DdlError::MultiTableDrop {
            sql: "DROP TABLE a, b".to_string(),
        }
        .into();
        assert!(format!("{err}").contains("multiple tables"));
    }

    #[test]
    fn result_alias() {
        fn returns_result() -> Result<u32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }
}
