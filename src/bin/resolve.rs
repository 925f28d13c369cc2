//! Resolves one captured DDL statement end-to-end: split into atomic
//! statements, extract references, route them, rewrite, and print the
//! statements to execute.

use std::collections::HashMap;
use std::io::Read;
use std::process;

use clap::Parser;
use ddl_router::{
    classify_ddl, ddl_table_refs, init_logging, split_ddl, LogConfig, RouteMap, Rewriter,
    SyncError, TableRef,
};
use tracing::{warn, Level};

#[derive(Parser)]
#[command(name = "resolve")]
#[command(about = "Split and route a captured DDL statement")]
struct Args {
    /// Statement text; read from stdin when omitted
    #[arg(short, long)]
    sql: Option<String>,

    /// Route entry `origin_schema.origin_table=target_schema.target_table`
    /// (omit the table part for database-level routes); repeatable
    #[arg(short = 'r', long = "route")]
    routes: Vec<String>,

    /// Log level (debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    if let Err(e) = init_logging(LogConfig::new().with_level(level)) {
        eprintln!("✗ Failed to initialize logging: {e}");
    }

    if let Err(e) = run(&args) {
        eprintln!("✗ Failed to resolve statement: {e}");
        process::exit(1);
    }
}

fn run(args: &Args) -> ddl_router::Result<()> {
    let mut routes: HashMap<TableRef, TableRef> = HashMap::new();
    for entry in &args.routes {
        let (from, to) = parse_route(entry)?;
        routes.insert(lowercased(&from), to);
    }

    let sql = match &args.sql {
        Some(sql) => sql.clone(),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let split = split_ddl(&sql);
    if let Some(err) = split.error {
        warn!(error = %err, "statement did not parse, passing it through unchanged");
        for stmt in &split.statements {
            println!("{stmt}");
        }
        return Ok(());
    }

    let rewriter = Rewriter::new();
    for stmt in &split.statements {
        let kind = classify_ddl(stmt)?;
        let origin = ddl_table_refs(stmt)?;
        let target: Vec<TableRef> = origin.iter().map(|r| route_of(&routes, r)).collect();
        let routed = rewriter.rewrite(stmt, kind, &RouteMap::new(origin, target))?;
        println!("{routed}");
    }
    Ok(())
}

/// Exact table routes win over schema-level routes; unrouted references map
/// to themselves.
fn route_of(routes: &HashMap<TableRef, TableRef>, origin: &TableRef) -> TableRef {
    if let Some(target) = routes.get(origin) {
        return target.clone();
    }
    if !origin.is_schema_only() {
        if let Some(target) = routes.get(&TableRef::schema_only(origin.schema.clone())) {
            return TableRef::new(target.schema.clone(), origin.name.clone());
        }
    }
    origin.clone()
}

fn parse_route(entry: &str) -> ddl_router::Result<(TableRef, TableRef)> {
    let (from, to) = entry
        .split_once('=')
        .ok_or_else(|| SyncError::CliArgument(format!("route must be origin=target: {entry}")))?;
    Ok((parse_ref(from.trim()), parse_ref(to.trim())))
}

fn parse_ref(s: &str) -> TableRef {
    match s.split_once('.') {
        Some((schema, table)) => TableRef::new(schema, table),
        None => TableRef::schema_only(s),
    }
}

fn lowercased(r: &TableRef) -> TableRef {
    TableRef::new(r.schema.to_ascii_lowercase(), r.name.to_ascii_lowercase())
}
