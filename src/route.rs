use std::fmt;

use serde::{Deserialize, Serialize};
use sqlparser::ast::{ObjectName, ObjectNamePart, ObjectType, Statement};

/// A schema/table pair referenced by a DDL statement.
///
/// An empty `name` denotes a schema-only reference (database-level DDL); an
/// empty `schema` denotes a table resolved against the session default
/// database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Reference to a database itself rather than a table in it.
    pub fn schema_only(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: String::new(),
        }
    }

    pub fn is_schema_only(&self) -> bool {
        self.name.is_empty()
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "`{}`", self.schema)
        } else if self.schema.is_empty() {
            write!(f, "`{}`", self.name)
        } else {
            write!(f, "`{}`.`{}`", self.schema, self.name)
        }
    }
}

/// The DDL statement kinds the routing engine understands.
///
/// `Other` is a DDL-class statement with no routing support (views,
/// sequences, ...); `NonDdl` is anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdlKind {
    CreateDatabase,
    DropDatabase,
    CreateTable,
    DropTable,
    TruncateTable,
    AlterTable,
    RenameTable,
    CreateIndex,
    DropIndex,
    Other,
    NonDdl,
}

impl DdlKind {
    /// Classifies a parsed statement. The `SCHEMA` keyword is a synonym of
    /// `DATABASE` in MySQL and maps to the database kinds.
    pub fn of(stmt: &Statement) -> DdlKind {
        match stmt {
            Statement::CreateDatabase { .. } | Statement::CreateSchema { .. } => {
                DdlKind::CreateDatabase
            }
            Statement::CreateTable { .. } => DdlKind::CreateTable,
            Statement::AlterTable { .. } => DdlKind::AlterTable,
            Statement::RenameTable { .. } => DdlKind::RenameTable,
            Statement::Truncate { .. } => DdlKind::TruncateTable,
            Statement::CreateIndex { .. } => DdlKind::CreateIndex,
            Statement::Drop { object_type, .. } => match object_type {
                ObjectType::Table => DdlKind::DropTable,
                ObjectType::Database | ObjectType::Schema => DdlKind::DropDatabase,
                ObjectType::Index => DdlKind::DropIndex,
                _ => DdlKind::Other,
            },
            Statement::CreateView { .. }
            | Statement::AlterIndex { .. }
            | Statement::CreateSequence { .. } => DdlKind::Other,
            _ => DdlKind::NonDdl,
        }
    }

    pub fn is_ddl(self) -> bool {
        self != DdlKind::NonDdl
    }
}

/// Positional origin → target identifier mapping for one atomic statement.
///
/// Index 0 is the primary subject; index 1, when present, is the secondary
/// reference (a LIKE table, or the new name of a rename).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMap {
    pub origin: Vec<TableRef>,
    pub target: Vec<TableRef>,
}

impl RouteMap {
    pub fn new(origin: Vec<TableRef>, target: Vec<TableRef>) -> Self {
        Self { origin, target }
    }

    /// Mapping that routes every identifier to itself.
    pub fn identity(refs: Vec<TableRef>) -> Self {
        Self {
            target: refs.clone(),
            origin: refs,
        }
    }

    /// True when no positional pair differs, so no identifier rewrite is
    /// needed.
    pub fn is_identity(&self) -> bool {
        self.origin == self.target
    }
}

pub(crate) fn ident_parts(name: &ObjectName) -> Vec<String> {
    name.0
        .iter()
        .map(|part| match part {
            ObjectNamePart::Identifier(ident) => ident.value.clone(),
            other => other.to_string(),
        })
        .collect()
}

/// `schema.table` (or bare `table`) object name as a `TableRef`.
pub(crate) fn table_ref_of(name: &ObjectName) -> TableRef {
    let mut parts = ident_parts(name);
    let table = parts.pop().unwrap_or_default();
    let schema = parts.pop().unwrap_or_default();
    TableRef::new(schema, table)
}

/// Database-level object name as a schema-only `TableRef`.
pub(crate) fn schema_ref_of(name: &ObjectName) -> TableRef {
    TableRef::schema_only(ident_parts(name).pop().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_ref_display_quotes_identifiers() {
        assert_eq!(TableRef::new("test", "a").to_string(), "`test`.`a`");
        assert_eq!(TableRef::new("", "a").to_string(), "`a`");
        assert_eq!(TableRef::schema_only("test").to_string(), "`test`");
    }

    #[test]
    fn schema_only_refs_have_empty_name() {
        let r = TableRef::schema_only("db");
        assert!(r.is_schema_only());
        assert_eq!(r.name, "");
    }

    #[test]
    fn identity_route_detection() {
        let refs = vec![TableRef::new("a", "t1"), TableRef::new("a", "t2")];
        assert!(RouteMap::identity(refs.clone()).is_identity());

        let routed = RouteMap::new(refs, vec![TableRef::new("b", "t1"), TableRef::new("b", "t2")]);
        assert!(!routed.is_identity());
    }
}
