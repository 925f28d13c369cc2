pub mod cli;
pub mod config;
pub mod connection;
pub mod errors;
pub mod extract;
pub mod logging;
pub mod rewrite;
pub mod route;
pub mod splitter;
pub mod status;

pub use cli::{parse_args, CommonArgs};
pub use config::{AppConfig, ConfigBuilder, DatabaseConfig, LoggingConfig, StatusConfig};
pub use connection::{
    create_connection, create_connection_pool, parse_host_port, probe_repl_client_privilege,
    server_version, MysqlMasterStatusProbe,
};
pub use errors::{DdlError, Result, SyncError};
pub use extract::{classify_ddl, ddl_table_refs};
pub use logging::{init_default_logging, init_logging, init_logging_from_env, LogConfig};
pub use rewrite::Rewriter;
pub use route::{DdlKind, RouteMap, TableRef};
pub use splitter::{split_ddl, trim_ctrl_chars, SplitResult};
pub use status::{
    BinlogPosition, EventCounters, MasterStatus, MasterStatusProbe, ReplicationCursor,
    StatusReporter, SyncStatus,
};
