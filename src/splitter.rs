//! Decomposition of captured DDL statements into atomic single-effect
//! statements.
//!
//! Multi-table DROP TABLE, multi-clause ALTER TABLE and multi-pair RENAME
//! TABLE all affect more than one table or clause at a time; downstream
//! routing operates on exactly one effect per statement.

use sqlparser::ast::{ObjectType, Statement};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;
use tracing::debug;

use crate::errors::DdlError;
use crate::route::{table_ref_of, DdlKind};

/// Strips leading and trailing control characters (the C0 set and DEL) that
/// upstream binlog capture can leave around statement text.
pub fn trim_ctrl_chars(s: &str) -> &str {
    s.trim_matches(|c: char| (c as u32) < 32 || c as u32 == 127)
}

/// Outcome of resolving one captured statement.
///
/// A parse failure does not abort the pipeline: the trimmed original text is
/// passed through and the error travels alongside for logging.
#[derive(Debug)]
pub struct SplitResult {
    pub statements: Vec<String>,
    pub error: Option<DdlError>,
}

impl SplitResult {
    fn empty() -> Self {
        Self {
            statements: Vec::new(),
            error: None,
        }
    }

    fn passthrough(sql: &str, error: Option<DdlError>) -> Self {
        Self {
            statements: vec![sql.to_string()],
            error,
        }
    }
}

/// Resolves one captured DDL statement into atomic statements.
///
/// `DROP TABLE test.a, test2.b` becomes `` DROP TABLE `test`.`a` `` and
/// `` DROP TABLE `test2`.`b` ``; multi-clause ALTER TABLE and multi-pair
/// RENAME TABLE split the same way. Other DDL kinds pass through unchanged,
/// and non-DDL statements yield an empty result.
pub fn split_ddl(sql: &str) -> SplitResult {
    let sql = trim_ctrl_chars(sql);

    // Multi-statement parse entry point: captured text may carry trailing
    // comments or other benign irregularities a strict single-statement
    // parse would reject.
    let stmts = match Parser::parse_sql(&MySqlDialect {}, sql) {
        Ok(stmts) => stmts,
        Err(err) => {
            return SplitResult::passthrough(
                sql,
                Some(DdlError::Parse {
                    sql: sql.to_string(),
                    message: err.to_string(),
                }),
            );
        }
    };

    // A binlog query event carries one logical statement; anything after the
    // first is capture noise.
    let Some(stmt) = stmts.first() else {
        return SplitResult::empty();
    };
    if !DdlKind::of(stmt).is_ddl() {
        return SplitResult::empty();
    }

    let statements = match stmt {
        Statement::Drop {
            object_type: ObjectType::Table,
            if_exists,
            names,
            ..
        } => {
            let exists = if *if_exists { "IF EXISTS " } else { "" };
            names
                .iter()
                .map(|name| format!("DROP TABLE {exists}{}", table_ref_of(name)))
                .collect()
        }
        Statement::AlterTable(alter) => {
            debug!(statement = %sql, clauses = alter.operations.len(), "splitting alter table statement");
            alter
                .operations
                .iter()
                .map(|op| {
                    // Each output owns its own single-operation clone of the
                    // statement; no clause container is shared across outputs.
                    let mut single = stmt.clone();
                    if let Statement::AlterTable(alter) = &mut single {
                        alter.operations = vec![op.clone()];
                    }
                    single.to_string()
                })
                .collect()
        }
        Statement::RenameTable(renames) => renames
            .iter()
            .map(|pair| {
                format!(
                    "RENAME TABLE {} TO {}",
                    table_ref_of(&pair.old_name),
                    table_ref_of(&pair.new_name)
                )
            })
            .collect(),
        _ => vec![sql.to_string()],
    };

    SplitResult { statements, error: None }
}
