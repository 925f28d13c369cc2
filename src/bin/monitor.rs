//! Prints periodic replication status snapshots for a source database.

use std::process;
use std::time::{Duration, Instant};

use clap::Parser;
use ddl_router::{
    create_connection_pool, parse_host_port, probe_repl_client_privilege, server_version,
    AppConfig, CommonArgs, DatabaseConfig, EventCounters, MysqlMasterStatusProbe,
    ReplicationCursor, StatusReporter,
};
use tokio::time::sleep;
use tracing::info;

#[derive(Parser)]
#[command(name = "monitor")]
#[command(about = "Replication status monitor")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Configuration file (JSON or TOML); overrides connection flags
    #[arg(short, long)]
    config: Option<String>,

    /// Seconds between status reports
    #[arg(short = 't', long, default_value = "5")]
    interval: u64,

    /// Total monitoring duration in seconds
    #[arg(long, default_value = "60")]
    duration: u64,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = args.common.validate() {
        eprintln!("✗ Invalid arguments: {e}");
        process::exit(1);
    }
    if let Err(e) = args.common.init_logging() {
        eprintln!("✗ Failed to initialize logging: {e}");
    }

    if let Err(e) = run(&args).await {
        eprintln!("✗ Failed to monitor replication status: {e}");

        let error_msg = e.to_string().to_lowercase();
        if error_msg.contains("access denied") || error_msg.contains("authentication") {
            eprintln!("  → Check your username and password");
        } else if error_msg.contains("connection refused") || error_msg.contains("timeout") {
            eprintln!("  → Check if the source is running on the specified host and port");
        }

        process::exit(1);
    }
}

async fn run(args: &Args) -> ddl_router::Result<()> {
    let (source, interval, probe_master) = match &args.config {
        Some(path) => {
            let config = AppConfig::from_file_with_env(path)?;
            config.validate()?;
            let password = config.get_source_password().unwrap_or_default();
            let mut source = config.source.clone();
            source.password = Some(password);
            (source, config.status.report_interval_secs, config.status.probe_master)
        }
        None => {
            let source = DatabaseConfig {
                host: args.common.get_host(),
                username: args.common.get_user(),
                password: Some(args.common.get_password()?),
                database: args.common.get_database(),
                ..DatabaseConfig::default()
            };
            (source, args.interval, true)
        }
    };

    let (host, port) = parse_host_port(&source.host)?;
    let pool = create_connection_pool(
        &host,
        port,
        &source.username,
        source.password.as_deref().unwrap_or(""),
        source.database.as_deref(),
    )?;

    let mut conn = pool.get_conn()?;
    if let Some(version) = server_version(&mut conn)? {
        info!(version = %version, "connected to source");
    }
    let privileged = if probe_master {
        let privileged = probe_repl_client_privilege(&mut conn)?;
        if !privileged {
            info!("session lacks REPLICATION CLIENT, master fields will stay empty");
        }
        privileged
    } else {
        false
    };
    drop(conn);

    let reporter = StatusReporter::new(privileged);
    let probe = MysqlMasterStatusProbe::new(pool);

    // No replication loop runs here, so counters and the local cursor stay
    // at zero; the snapshot tracks the live master coordinates.
    let counters = EventCounters::new();
    let cursor = ReplicationCursor::default();

    let started = Instant::now();
    while started.elapsed() < Duration::from_secs(args.duration) {
        let status = reporter.report(&counters, &cursor, &probe);
        let line = serde_json::to_string(&status)
            .map_err(|e| ddl_router::SyncError::Unknown(e.to_string()))?;
        println!("{} {line}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S"));

        sleep(Duration::from_secs(interval)).await;
    }

    println!("✓ Monitoring completed after {}s", args.duration);
    Ok(())
}
