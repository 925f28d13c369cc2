use mysql::prelude::*;
use mysql::{OptsBuilder, Pool, PooledConn, Row};

use crate::errors::{Result, SyncError};
use crate::status::{BinlogPosition, MasterStatus, MasterStatusProbe};

/// Parse host and port from a string in format "hostname:port"
pub fn parse_host_port(host_port: &str) -> Result<(String, u16)> {
    let parts: Vec<&str> = host_port.split(':').collect();
    if parts.len() != 2 {
        return Err(SyncError::Configuration(
            "Host must be in format hostname:port".to_string(),
        ));
    }

    let host = parts[0].to_string();
    let port = parts[1]
        .parse::<u16>()
        .map_err(|_| SyncError::Configuration("Invalid port number".to_string()))?;

    Ok((host, port))
}

/// Create a connection pool to the source using the provided parameters
pub fn create_connection_pool(
    host: &str,
    port: u16,
    user: &str,
    password: &str,
    database: Option<&str>,
) -> Result<Pool> {
    let mut builder = OptsBuilder::new()
        .ip_or_hostname(Some(host))
        .tcp_port(port)
        .user(Some(user))
        .pass(Some(password));

    if let Some(db) = database {
        builder = builder.db_name(Some(db));
    }

    let pool = Pool::new(builder)?;
    Ok(pool)
}

/// Create a single pooled connection using the provided parameters
pub fn create_connection(
    host: &str,
    port: u16,
    user: &str,
    password: &str,
    database: Option<&str>,
) -> Result<PooledConn> {
    let pool = create_connection_pool(host, port, user, password, database)?;
    let conn = pool.get_conn()?;
    Ok(conn)
}

/// Get the server version
pub fn server_version(conn: &mut PooledConn) -> Result<Option<String>> {
    let version: Option<String> = conn.query_first("SELECT VERSION()")?;
    Ok(version)
}

/// MySQL error 1227: the session lacks SUPER and/or REPLICATION CLIENT.
const ER_SPECIFIC_ACCESS_DENIED: u16 = 1227;

/// One-shot check whether the session may run `SHOW MASTER STATUS`.
///
/// Error 1227 means the privilege is absent; any other failure is a
/// connectivity fault and surfaces to the caller.
pub fn probe_repl_client_privilege(conn: &mut PooledConn) -> Result<bool> {
    match conn.query_first::<Row, _>("SHOW MASTER STATUS") {
        Ok(_) => Ok(true),
        Err(mysql::Error::MySqlError(err)) if err.code == ER_SPECIFIC_ACCESS_DENIED => Ok(false),
        Err(err) => Err(SyncError::Connection(err)),
    }
}

/// `SHOW MASTER STATUS` probe over a shared connection pool.
///
/// Round-trip timeouts come from the pool's connection options; the probe
/// adds no policy of its own.
pub struct MysqlMasterStatusProbe {
    pool: Pool,
}

impl MysqlMasterStatusProbe {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

impl MasterStatusProbe for MysqlMasterStatusProbe {
    fn master_status(&self) -> Result<MasterStatus> {
        let mut conn = self.pool.get_conn()?;
        let row: Option<Row> = conn.query_first("SHOW MASTER STATUS")?;

        // An empty result set means binlogging is disabled on the source;
        // report zero values rather than failing.
        let Some(row) = row else {
            return Ok(MasterStatus::default());
        };

        let name: String = row.get("File").unwrap_or_default();
        let pos: u64 = row.get("Position").unwrap_or_default();
        // NULL on sources without GTID mode, absent entirely on some forks
        let gtid_set: String = row
            .get::<Option<String>, _>("Executed_Gtid_Set")
            .flatten()
            .unwrap_or_default();
        Ok(MasterStatus {
            position: BinlogPosition::new(name, pos),
            gtid_set,
        })
    }
}
