//! End-to-end tests of the statement resolution pipeline: split into atomic
//! statements, extract references, route, rewrite.

use std::collections::HashMap;

use ddl_router::{
    classify_ddl, ddl_table_refs, split_ddl, DdlError, RouteMap, Rewriter, TableRef,
};

/// Routes every atomic statement of `sql` through the given origin→target
/// table mapping, identity for anything unrouted.
fn route_all(sql: &str, routes: &[(TableRef, TableRef)]) -> Vec<String> {
    let lookup: HashMap<TableRef, TableRef> = routes.iter().cloned().collect();
    let rewriter = Rewriter::new();

    let split = split_ddl(sql);
    assert!(split.error.is_none(), "unexpected parse error: {:?}", split.error);

    split
        .statements
        .iter()
        .map(|stmt| {
            let kind = classify_ddl(stmt).unwrap();
            let origin = ddl_table_refs(stmt).unwrap();
            let target: Vec<TableRef> = origin
                .iter()
                .map(|r| lookup.get(r).cloned().unwrap_or_else(|| r.clone()))
                .collect();
            rewriter
                .rewrite(stmt, kind, &RouteMap::new(origin, target))
                .unwrap()
        })
        .collect()
}

#[test]
fn multi_table_drop_routes_per_table() {
    let routed = route_all(
        "DROP TABLE IF EXISTS test.a, test2.b",
        &[
            (TableRef::new("test", "a"), TableRef::new("merged", "a")),
            (TableRef::new("test2", "b"), TableRef::new("merged", "b")),
        ],
    );
    assert_eq!(
        routed,
        vec![
            "USE `merged`; DROP TABLE IF EXISTS `merged`.`a`;",
            "USE `merged`; DROP TABLE IF EXISTS `merged`.`b`;",
        ]
    );
}

#[test]
fn multi_clause_alter_routes_per_clause() {
    let routed = route_all(
        "ALTER TABLE test.t1 ADD COLUMN c1 INT, DROP COLUMN c2",
        &[(TableRef::new("test", "t1"), TableRef::new("shard", "t1"))],
    );
    assert_eq!(routed.len(), 2);
    assert!(routed[0].starts_with("USE `shard`; ALTER TABLE `shard`.`t1`"));
    assert!(routed[0].contains("ADD COLUMN c1"));
    assert!(routed[1].starts_with("USE `shard`; ALTER TABLE `shard`.`t1`"));
    assert!(routed[1].contains("DROP COLUMN c2"));
}

#[test]
fn identity_routing_adds_only_the_use_prefix() {
    let routed = route_all("DROP TABLE IF EXISTS `test`.`a`", &[]);
    assert_eq!(routed, vec!["USE `test`; DROP TABLE IF EXISTS `test`.`a`;"]);

    let routed = route_all("CREATE DATABASE d1", &[]);
    assert_eq!(routed, vec!["CREATE DATABASE d1;"]);
}

#[test]
fn create_table_like_routes_both_references() {
    let routed = route_all(
        "CREATE TABLE a.t1 LIKE a.ref1",
        &[
            (TableRef::new("a", "t1"), TableRef::new("b", "t2")),
            (TableRef::new("a", "ref1"), TableRef::new("b", "refx")),
        ],
    );
    assert_eq!(routed, vec!["USE `b`; CREATE TABLE `b`.`t2` LIKE `b`.`refx`;"]);
}

#[test]
fn rename_table_is_regenerated_per_pair() {
    let routed = route_all(
        "RENAME TABLE a.t1 TO a.t2",
        &[
            (TableRef::new("a", "t1"), TableRef::new("c", "x")),
            (TableRef::new("a", "t2"), TableRef::new("c", "y")),
        ],
    );
    assert_eq!(routed, vec!["RENAME TABLE `c`.`x` TO `c`.`y`"]);
}

#[test]
fn multi_pair_rename_splits_into_independent_statements() {
    let routed = route_all(
        "RENAME TABLE a.t1 TO a.t2, a.t3 TO a.t4",
        &[
            (TableRef::new("a", "t1"), TableRef::new("b", "t1")),
            (TableRef::new("a", "t2"), TableRef::new("b", "t2")),
        ],
    );
    assert_eq!(
        routed,
        vec![
            // the routed pair drops its USE prefix with the regeneration,
            // the identity pair keeps one
            "RENAME TABLE `b`.`t1` TO `b`.`t2`",
            "USE `a`; RENAME TABLE `a`.`t3` TO `a`.`t4`;",
        ]
    );
}

#[test]
fn extraction_requires_split_input() {
    let err = ddl_table_refs("DROP TABLE test.a, test2.b").unwrap_err();
    assert!(matches!(err, DdlError::MultiTableDrop { .. }));

    // After splitting, each statement extracts cleanly.
    let split = split_ddl("DROP TABLE test.a, test2.b");
    for stmt in &split.statements {
        assert_eq!(ddl_table_refs(stmt).unwrap().len(), 1);
    }
}

#[test]
fn unparsable_capture_degrades_to_passthrough() {
    let split = split_ddl("\u{0}DROP TABLE ???\u{7f}");
    assert!(matches!(split.error, Some(DdlError::Parse { .. })));
    assert_eq!(split.statements, vec!["DROP TABLE ???"]);
}

#[test]
fn non_ddl_capture_yields_nothing_to_execute() {
    let split = split_ddl("UPDATE t SET a = 1");
    assert!(split.error.is_none());
    assert!(split.statements.is_empty());
}
