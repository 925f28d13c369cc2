//! Rewriting of one atomic DDL statement against a target routing mapping.
//!
//! Most kinds are rewritten by narrow text substitution anchored on compiled
//! patterns: the statements reaching this dispatch are atomic, so their
//! grammar shapes are narrow enough that locating the identifier clause in
//! text is lower-risk than regenerating DDL from a mutated parse tree.
//! TRUNCATE and RENAME carry nothing worth preserving and are regenerated
//! outright.

use regex::{NoExpand, Regex};
use tracing::warn;

use crate::errors::DdlError;
use crate::route::{DdlKind, RouteMap, TableRef};

/// Start offset of the final whitespace-delimited token of `literal`,
/// ignoring trailing spaces.
pub(crate) fn find_last_word(literal: &str) -> usize {
    let bytes = literal.as_bytes();
    let mut idx = bytes.len();
    while idx > 0 && bytes[idx - 1] == b' ' {
        idx -= 1;
    }
    while idx > 0 && bytes[idx - 1] != b' ' {
        idx -= 1;
    }
    idx
}

/// Remainder of a matched token from the start of the column-definition
/// list, for `CREATE TABLE t(...)` written without a separating space.
fn table_define_tail(literal: &str) -> &str {
    match literal.find('(') {
        Some(i) => &literal[i..],
        None => "",
    }
}

fn use_prefixed(sql: &str, schema: &str) -> String {
    format!("USE `{schema}`; {sql};")
}

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("static pattern")
}

/// Rewrites atomic DDL statements to their routed form.
///
/// The patterns are compiled once at construction and held immutably; the
/// value is cheap to share by reference across statement-processing workers.
pub struct Rewriter {
    create_database: Regex,
    drop_database: Regex,
    create_table: Regex,
    create_table_like: Regex,
    drop_table: Regex,
    alter_table: Regex,
    create_index_on: Regex,
    drop_index_on: Regex,
}

impl Rewriter {
    pub fn new() -> Self {
        Self {
            create_database: pattern(r"(?i)^\s*CREATE\s+(DATABASE|SCHEMA)\s+(IF\s+NOT\s+EXISTS\s+)?\S+"),
            drop_database: pattern(r"(?i)^\s*DROP\s+(DATABASE|SCHEMA)\s+(IF\s+EXISTS\s+)?\S+"),
            create_table: pattern(r"(?i)CREATE\s+TABLE\s+(IF\s+NOT\s+EXISTS\s+)?\S+"),
            create_table_like: pattern(r"(?i)CREATE\s+TABLE\s+(IF\s+NOT\s+EXISTS\s+)?\S+\s*\(?\s*LIKE\s+\S+"),
            drop_table: pattern(r"(?i)^\s*DROP\s+TABLE\s+(IF\s+EXISTS\s+)?\S+"),
            alter_table: pattern(r"(?i)^\s*ALTER\s+TABLE\s+\S+"),
            create_index_on: pattern(r"(?i)ON\s+\S+\s*\("),
            drop_index_on: pattern(r"(?i)ON\s+\S+"),
        }
    }

    /// Rewrites one atomic statement to its target routing and returns the
    /// text to execute, `USE` prefix included where one belongs.
    ///
    /// `route.origin` and `route.target` must have the same length and the
    /// order produced by [`ddl_table_refs`](crate::extract::ddl_table_refs);
    /// a mismatch is a caller bug, not bad input, and panics rather than
    /// rewriting the wrong slot.
    pub fn rewrite(&self, sql: &str, kind: DdlKind, route: &RouteMap) -> Result<String, DdlError> {
        assert_eq!(
            route.origin.len(),
            route.target.len(),
            "origin/target cardinality mismatch for: {sql}"
        );
        assert!(!route.origin.is_empty(), "empty routing for: {sql}");

        if route.is_identity() {
            // CREATE DATABASE defines the schema itself; a USE prefix would
            // name a database that need not exist yet.
            if kind == DdlKind::CreateDatabase {
                return Ok(format!("{sql};"));
            }
            return Ok(use_prefixed(sql, &route.origin[0].schema));
        }

        let target = &route.target;
        let sql = match kind {
            DdlKind::CreateDatabase => {
                return Ok(self.swap_last_token(
                    &self.create_database,
                    sql,
                    &quoted_schema(&target[0]),
                ));
            }
            DdlKind::DropDatabase => {
                return Ok(self.swap_last_token(
                    &self.drop_database,
                    sql,
                    &quoted_schema(&target[0]),
                ));
            }
            DdlKind::CreateTable => {
                let sql = if target.len() == 2 {
                    self.swap_like_clause(sql, &target[1])
                } else {
                    sql.to_string()
                };
                self.swap_create_table(&sql, &target[0])
            }
            DdlKind::DropTable => {
                self.swap_last_token(&self.drop_table, sql, &target[0].to_string())
            }
            DdlKind::TruncateTable => format!("TRUNCATE TABLE {}", target[0]),
            DdlKind::AlterTable => {
                // A secondary identifier means ALTER ... RENAME [TO|AS]: the
                // new table reference is the statement's final token.
                let sql = if target.len() == 2 {
                    let idx = find_last_word(sql);
                    format!("{}{}", &sql[..idx], target[1])
                } else {
                    sql.to_string()
                };
                self.replace_match(&self.alter_table, &sql, &format!("ALTER TABLE {}", target[0]))
            }
            DdlKind::RenameTable => {
                assert_eq!(
                    target.len(),
                    2,
                    "rename table routing requires two identifiers for: {sql}"
                );
                return Ok(format!("RENAME TABLE {} TO {}", target[0], target[1]));
            }
            DdlKind::CreateIndex => {
                self.replace_match(&self.create_index_on, sql, &format!("ON {} (", target[0]))
            }
            DdlKind::DropIndex => {
                self.replace_match(&self.drop_index_on, sql, &format!("ON {}", target[0]))
            }
            DdlKind::Other | DdlKind::NonDdl => {
                return Err(DdlError::UnsupportedKind {
                    sql: sql.to_string(),
                });
            }
        };

        Ok(use_prefixed(&sql, &target[0].schema))
    }

    /// Swaps the final token of the pattern's match for `replacement`,
    /// leaving everything else in place.
    fn swap_last_token(&self, re: &Regex, sql: &str, replacement: &str) -> String {
        let Some(m) = re.find(sql) else {
            warn!(statement = %sql, "statement did not match its rewrite pattern");
            return sql.to_string();
        };
        let prefix = m.as_str();
        let keep = &prefix[..find_last_word(prefix)];
        format!("{}{keep}{replacement}{}", &sql[..m.start()], &sql[m.end()..])
    }

    /// Swaps the table reference of a `LIKE` clause, keeping a closing
    /// parenthesis when the clause was written in its parenthesized form.
    fn swap_like_clause(&self, sql: &str, target: &TableRef) -> String {
        let Some(m) = self.create_table_like.find(sql) else {
            warn!(statement = %sql, "statement did not match its rewrite pattern");
            return sql.to_string();
        };
        let prefix = m.as_str();
        let keep = &prefix[..find_last_word(prefix)];
        let closing = if prefix.ends_with(')') { ")" } else { "" };
        format!(
            "{}{keep}{target}{closing}{}",
            &sql[..m.start()],
            &sql[m.end()..]
        )
    }

    /// Swaps the `CREATE TABLE schema.table` clause, keeping everything from
    /// the start of the column-definition list onward.
    fn swap_create_table(&self, sql: &str, target: &TableRef) -> String {
        let Some(m) = self.create_table.find(sql) else {
            warn!(statement = %sql, "statement did not match its rewrite pattern");
            return sql.to_string();
        };
        let prefix = m.as_str();
        let idx = find_last_word(prefix);
        let tail = table_define_tail(&prefix[idx..]);
        format!(
            "{}{}{target}{tail}{}",
            &sql[..m.start()],
            &prefix[..idx],
            &sql[m.end()..]
        )
    }

    fn replace_match(&self, re: &Regex, sql: &str, replacement: &str) -> String {
        if !re.is_match(sql) {
            warn!(statement = %sql, "statement did not match its rewrite pattern");
            return sql.to_string();
        }
        re.replace(sql, NoExpand(replacement)).into_owned()
    }
}

impl Default for Rewriter {
    fn default() -> Self {
        Self::new()
    }
}

fn quoted_schema(target: &TableRef) -> String {
    format!("`{}`", target.schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::RouteMap;

    fn routed(origin: &[(&str, &str)], target: &[(&str, &str)]) -> RouteMap {
        let build = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(s, n)| TableRef::new(*s, *n))
                .collect::<Vec<_>>()
        };
        RouteMap::new(build(origin), build(target))
    }

    #[test]
    fn find_last_word_locates_final_token() {
        assert_eq!(find_last_word("DROP TABLE `a`.`b`"), 11);
        assert_eq!(find_last_word("CREATE DATABASE foo   "), 16);
        assert_eq!(find_last_word("foo"), 0);
        assert_eq!(find_last_word(""), 0);
    }

    #[test]
    fn identity_route_adds_use_prefix_only() {
        let rw = Rewriter::new();
        let route = routed(&[("a", "t1")], &[("a", "t1")]);
        let out = rw
            .rewrite("ALTER TABLE `a`.`t1` ADD COLUMN c INT", DdlKind::AlterTable, &route)
            .unwrap();
        assert_eq!(out, "USE `a`; ALTER TABLE `a`.`t1` ADD COLUMN c INT;");
    }

    #[test]
    fn identity_create_database_gets_no_use_prefix() {
        let rw = Rewriter::new();
        let route = routed(&[("d", "")], &[("d", "")]);
        let out = rw
            .rewrite("CREATE DATABASE d", DdlKind::CreateDatabase, &route)
            .unwrap();
        assert_eq!(out, "CREATE DATABASE d;");
    }

    #[test]
    fn create_database_routes_schema_token() {
        let rw = Rewriter::new();
        let route = routed(&[("a", "")], &[("b", "")]);
        let out = rw
            .rewrite("CREATE DATABASE IF NOT EXISTS a", DdlKind::CreateDatabase, &route)
            .unwrap();
        assert_eq!(out, "CREATE DATABASE IF NOT EXISTS `b`");
    }

    #[test]
    fn drop_database_routes_schema_token() {
        let rw = Rewriter::new();
        let route = routed(&[("a", "")], &[("b", "")]);
        let out = rw
            .rewrite("DROP SCHEMA a", DdlKind::DropDatabase, &route)
            .unwrap();
        assert_eq!(out, "DROP SCHEMA `b`");
    }

    #[test]
    fn create_table_routes_table_clause() {
        let rw = Rewriter::new();
        let route = routed(&[("a", "t1")], &[("b", "t2")]);
        let out = rw
            .rewrite("CREATE TABLE a.t1 (id INT)", DdlKind::CreateTable, &route)
            .unwrap();
        assert_eq!(out, "USE `b`; CREATE TABLE `b`.`t2` (id INT);");
    }

    #[test]
    fn create_table_keeps_unspaced_definition_list() {
        let rw = Rewriter::new();
        let route = routed(&[("a", "t1")], &[("b", "t2")]);
        let out = rw
            .rewrite("CREATE TABLE a.t1(id INT)", DdlKind::CreateTable, &route)
            .unwrap();
        assert_eq!(out, "USE `b`; CREATE TABLE `b`.`t2`(id INT);");
    }

    #[test]
    fn create_table_like_routes_both_references() {
        let rw = Rewriter::new();
        let route = routed(&[("a", "t1"), ("a", "ref1")], &[("b", "t2"), ("b", "refx")]);
        let out = rw
            .rewrite("CREATE TABLE a.t1 LIKE a.ref1", DdlKind::CreateTable, &route)
            .unwrap();
        assert_eq!(out, "USE `b`; CREATE TABLE `b`.`t2` LIKE `b`.`refx`;");
    }

    #[test]
    fn create_table_like_keeps_parenthesized_form() {
        let rw = Rewriter::new();
        let route = routed(&[("a", "t1"), ("a", "ref1")], &[("b", "t2"), ("b", "refx")]);
        let out = rw
            .rewrite("CREATE TABLE a.t1 (LIKE a.ref1)", DdlKind::CreateTable, &route)
            .unwrap();
        assert_eq!(out, "USE `b`; CREATE TABLE `b`.`t2` (LIKE `b`.`refx`);");
    }

    #[test]
    fn drop_table_routes_table_reference() {
        let rw = Rewriter::new();
        let route = routed(&[("a", "t1")], &[("b", "t2")]);
        let out = rw
            .rewrite("DROP TABLE IF EXISTS `a`.`t1`", DdlKind::DropTable, &route)
            .unwrap();
        assert_eq!(out, "USE `b`; DROP TABLE IF EXISTS `b`.`t2`;");
    }

    #[test]
    fn truncate_is_fully_regenerated() {
        let rw = Rewriter::new();
        let route = routed(&[("a", "t1")], &[("b", "t2")]);
        let out = rw
            .rewrite(
                "TRUNCATE TABLE `a`.`t1` /* partition p0 */",
                DdlKind::TruncateTable,
                &route,
            )
            .unwrap();
        assert_eq!(out, "USE `b`; TRUNCATE TABLE `b`.`t2`;");
    }

    #[test]
    fn alter_table_routes_prefix() {
        let rw = Rewriter::new();
        let route = routed(&[("a", "t1")], &[("b", "t2")]);
        let out = rw
            .rewrite("ALTER TABLE a.t1 ADD COLUMN c INT", DdlKind::AlterTable, &route)
            .unwrap();
        assert_eq!(out, "USE `b`; ALTER TABLE `b`.`t2` ADD COLUMN c INT;");
    }

    #[test]
    fn alter_rename_routes_both_references() {
        let rw = Rewriter::new();
        let route = routed(&[("a", "t1"), ("a", "t2")], &[("c", "x"), ("c", "y")]);
        let out = rw
            .rewrite("ALTER TABLE a.t1 RENAME TO a.t2", DdlKind::AlterTable, &route)
            .unwrap();
        assert_eq!(out, "USE `c`; ALTER TABLE `c`.`x` RENAME TO `c`.`y`;");
    }

    #[test]
    fn rename_table_is_fully_regenerated() {
        let rw = Rewriter::new();
        let route = routed(&[("a", "t1"), ("a", "t2")], &[("c", "x"), ("c", "y")]);
        let out = rw
            .rewrite("RENAME TABLE a.t1 TO a.t2", DdlKind::RenameTable, &route)
            .unwrap();
        assert_eq!(out, "RENAME TABLE `c`.`x` TO `c`.`y`");
    }

    #[test]
    fn create_index_routes_on_clause_only() {
        let rw = Rewriter::new();
        let route = routed(&[("a", "t1")], &[("b", "t2")]);
        let out = rw
            .rewrite("CREATE INDEX idx ON a.t1 (c1, c2)", DdlKind::CreateIndex, &route)
            .unwrap();
        assert_eq!(out, "USE `b`; CREATE INDEX idx ON `b`.`t2` (c1, c2);");
    }

    #[test]
    fn drop_index_routes_on_clause_only() {
        let rw = Rewriter::new();
        let route = routed(&[("a", "t1")], &[("b", "t2")]);
        let out = rw
            .rewrite("DROP INDEX idx ON a.t1", DdlKind::DropIndex, &route)
            .unwrap();
        assert_eq!(out, "USE `b`; DROP INDEX idx ON `b`.`t2`;");
    }

    #[test]
    fn unsupported_kind_is_rejected_with_text() {
        let rw = Rewriter::new();
        let route = routed(&[("a", "v")], &[("b", "v")]);
        let err = rw
            .rewrite("CREATE VIEW a.v AS SELECT 1", DdlKind::Other, &route)
            .unwrap_err();
        match err {
            DdlError::UnsupportedKind { sql } => assert!(sql.contains("CREATE VIEW")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    #[should_panic(expected = "cardinality mismatch")]
    fn cardinality_mismatch_is_a_precondition_fault() {
        let rw = Rewriter::new();
        let route = RouteMap::new(
            vec![TableRef::new("a", "t1"), TableRef::new("a", "t2")],
            vec![TableRef::new("b", "t1")],
        );
        let _ = rw.rewrite("RENAME TABLE a.t1 TO a.t2", DdlKind::RenameTable, &route);
    }
}
