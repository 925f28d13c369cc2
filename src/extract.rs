//! Extraction of the ordered schema/table identifiers an atomic DDL
//! statement references.
//!
//! The result order is a contract: the external route resolver builds the
//! target side of a [`RouteMap`](crate::route::RouteMap) positionally
//! against it.

use sqlparser::ast::{
    AlterTableOperation, CreateTableLikeKind, ObjectType, RenameTableNameKind, SchemaName, Statement,
};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;

use crate::errors::DdlError;
use crate::route::{schema_ref_of, table_ref_of, DdlKind, TableRef};

fn parse_single(sql: &str) -> Result<Statement, DdlError> {
    let mut stmts = Parser::parse_sql(&MySqlDialect {}, sql).map_err(|err| DdlError::Parse {
        sql: sql.to_string(),
        message: err.to_string(),
    })?;
    if stmts.is_empty() {
        return Err(DdlError::Parse {
            sql: sql.to_string(),
            message: "statement text is empty".to_string(),
        });
    }
    Ok(stmts.remove(0))
}

/// Kind of one atomic DDL statement, for driving the rewrite dispatch.
pub fn classify_ddl(sql: &str) -> Result<DdlKind, DdlError> {
    Ok(DdlKind::of(&parse_single(sql)?))
}

/// Ordered identifiers referenced by one atomic DDL statement.
///
/// Most kinds yield a single reference. `CREATE TABLE ... LIKE` yields the
/// new table then the reference table; `RENAME TABLE` and
/// `ALTER TABLE ... RENAME TO` yield the old table then the new one.
/// Identifiers come back ASCII-lowercased: route matching is
/// case-insensitive, while splitting and rewriting preserve the original
/// spelling.
///
/// Multi-table DROP TABLE is rejected; it must go through
/// [`split_ddl`](crate::splitter::split_ddl) first.
pub fn ddl_table_refs(sql: &str) -> Result<Vec<TableRef>, DdlError> {
    let stmt = parse_single(sql)?;

    let mut refs = Vec::new();
    match &stmt {
        Statement::CreateDatabase { db_name, .. } => refs.push(schema_ref_of(db_name)),
        Statement::CreateSchema { schema_name, .. } => match schema_name {
            SchemaName::Simple(name) => refs.push(schema_ref_of(name)),
            _ => return Err(unsupported(sql)),
        },
        Statement::CreateTable(create) => {
            refs.push(table_ref_of(&create.name));
            if let Some(like) = &create.like {
                let like_name = match like {
                    CreateTableLikeKind::Parenthesized(inner)
                    | CreateTableLikeKind::Plain(inner) => &inner.name,
                };
                refs.push(table_ref_of(like_name));
            }
        }
        Statement::Drop {
            object_type,
            names,
            table,
            ..
        } => match object_type {
            ObjectType::Table => {
                if names.len() != 1 {
                    return Err(DdlError::MultiTableDrop {
                        sql: sql.to_string(),
                    });
                }
                refs.push(table_ref_of(&names[0]));
            }
            ObjectType::Database | ObjectType::Schema => match names.first() {
                Some(name) => refs.push(schema_ref_of(name)),
                None => return Err(unsupported(sql)),
            },
            // The table a MySQL DROP INDEX acts on lives in its ON clause.
            ObjectType::Index => match table {
                Some(on_table) => refs.push(table_ref_of(on_table)),
                None => return Err(unsupported(sql)),
            },
            _ => return Err(unsupported(sql)),
        },
        Statement::Truncate(truncate) => match truncate.table_names.first() {
            Some(target) => refs.push(table_ref_of(&target.name)),
            None => return Err(unsupported(sql)),
        },
        Statement::AlterTable(alter) => {
            refs.push(table_ref_of(&alter.name));
            if let Some(AlterTableOperation::RenameTable { table_name }) = alter.operations.first() {
                let new_name = match table_name {
                    RenameTableNameKind::As(name) | RenameTableNameKind::To(name) => name,
                };
                refs.push(table_ref_of(new_name));
            }
        }
        Statement::RenameTable(renames) => match renames.first() {
            Some(pair) => {
                refs.push(table_ref_of(&pair.old_name));
                refs.push(table_ref_of(&pair.new_name));
            }
            None => return Err(unsupported(sql)),
        },
        Statement::CreateIndex(create) => refs.push(table_ref_of(&create.table_name)),
        _ => return Err(unsupported(sql)),
    }

    for r in &mut refs {
        r.schema.make_ascii_lowercase();
        r.name.make_ascii_lowercase();
    }
    Ok(refs)
}

fn unsupported(sql: &str) -> DdlError {
    DdlError::UnsupportedKind {
        sql: sql.to_string(),
    }
}
