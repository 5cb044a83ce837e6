//! Insert-or-update synthesis for optional table rows.

use pretty_assertions::assert_eq;

use crate::ast::*;
use crate::error::TranslateError;
use crate::transpiler::dialect::Dialect;
use crate::transpiler::{MutationOperation, TranslateOptions, translate_upsert};

fn person_ext() -> OptionalTableUpdate {
    OptionalTableUpdate {
        table: "person_ext".into(),
        key_bindings: vec![ColumnValueBinding::new("id", Expr::param("id"))],
        value_bindings: vec![
            ColumnValueBinding::new("x", Expr::param("x")),
            ColumnValueBinding::new("y", Expr::param("y")),
        ],
        optimistic_lock_bindings: Vec::new(),
        optional: false,
    }
}

fn locked(mut update: OptionalTableUpdate) -> OptionalTableUpdate {
    update
        .optimistic_lock_bindings
        .push(ColumnValueBinding::new("v", Expr::param("v")));
    update
}

fn optional(mut update: OptionalTableUpdate) -> OptionalTableUpdate {
    update.optional = true;
    update
}

fn upsert(update: &OptionalTableUpdate, dialect: Dialect) -> Result<MutationOperation, TranslateError> {
    translate_upsert(update, &dialect.descriptor(), TranslateOptions::default())
}

fn single_sql(operation: MutationOperation) -> String {
    match operation {
        MutationOperation::Merge(stmt) | MutationOperation::Upsert(stmt) => stmt.sql,
        other => panic!("expected a single statement, got {:?}", other),
    }
}

#[test]
fn test_ansi_merge() {
    let operation = upsert(&person_ext(), Dialect::Ansi).unwrap();
    let MutationOperation::Merge(stmt) = operation else {
        panic!("expected MERGE");
    };
    assert_eq!(
        stmt.sql,
        "MERGE INTO person_ext AS t USING (VALUES (?, ?, ?)) AS s (id, x, y) ON (t.id=s.id) \
         WHEN NOT MATCHED THEN INSERT (id, x, y) VALUES (s.id, s.x, s.y) \
         WHEN MATCHED THEN UPDATE SET x=s.x, y=s.y"
    );
    assert_eq!(
        stmt.binders,
        vec![Binder::named("id"), Binder::named("x"), Binder::named("y")]
    );
    assert!(stmt.affected_tables.contains("person_ext"));
}

#[test]
fn test_ansi_merge_optional_with_lock() {
    let update = optional(locked(person_ext()));
    let operation = upsert(&update, Dialect::Ansi).unwrap();
    let MutationOperation::Merge(stmt) = operation else {
        panic!("expected MERGE");
    };
    assert_eq!(
        stmt.sql,
        "MERGE INTO person_ext AS t USING (VALUES (?, ?, ?)) AS s (id, x, y) ON (t.id=s.id) \
         WHEN NOT MATCHED AND (s.x IS NOT NULL OR s.y IS NOT NULL) THEN INSERT (id, x, y) VALUES (s.id, s.x, s.y) \
         WHEN MATCHED AND s.x IS NULL AND s.y IS NULL AND t.v=? THEN DELETE \
         WHEN MATCHED AND t.v=? THEN UPDATE SET x=s.x, y=s.y"
    );
    assert_eq!(stmt.binders.len(), 5);
    assert_eq!(stmt.binders[3], Binder::named("v"));
    assert_eq!(stmt.binders[4], Binder::named("v"));
}

#[test]
fn test_oracle_merge_selects_from_dual() {
    let update = optional(locked(person_ext()));
    let sql = single_sql(upsert(&update, Dialect::Oracle).unwrap());
    assert_eq!(
        sql,
        "MERGE INTO person_ext t USING (SELECT :1 id, :2 x, :3 y FROM dual) s ON (t.id=s.id) \
         WHEN MATCHED THEN UPDATE SET x=s.x, y=s.y WHERE t.v=:4 DELETE WHERE s.x IS NULL AND s.y IS NULL \
         WHEN NOT MATCHED THEN INSERT (id, x, y) VALUES (s.id, s.x, s.y) WHERE (s.x IS NOT NULL OR s.y IS NOT NULL)"
    );
}

#[test]
fn test_sqlserver_merge_is_terminated() {
    let sql = single_sql(upsert(&person_ext(), Dialect::SqlServer).unwrap());
    assert_eq!(
        sql,
        "MERGE INTO person_ext AS t USING (VALUES (@p1, @p2, @p3)) AS s (id, x, y) ON (t.id=s.id) \
         WHEN NOT MATCHED THEN INSERT (id, x, y) VALUES (s.id, s.x, s.y) \
         WHEN MATCHED THEN UPDATE SET x=s.x, y=s.y;"
    );
}

#[test]
fn test_h2_merge_casts_typed_parameters() {
    let mut update = person_ext();
    update.key_bindings = vec![ColumnValueBinding::new(
        "id",
        Expr::typed_param("id", SqlType::integer()),
    )];
    let sql = single_sql(upsert(&update, Dialect::H2).unwrap());
    assert!(
        sql.starts_with("MERGE INTO person_ext AS t USING (VALUES (CAST(? AS integer), ?, ?)) AS s (id, x, y)"),
        "{}",
        sql
    );
}

#[test]
fn test_postgres_on_conflict() {
    let operation = upsert(&person_ext(), Dialect::Postgres).unwrap();
    let MutationOperation::Upsert(stmt) = operation else {
        panic!("expected INSERT .. ON CONFLICT");
    };
    assert_eq!(
        stmt.sql,
        "INSERT INTO person_ext (id, x, y) VALUES ($1, $2, $3) \
         ON CONFLICT (id) DO UPDATE SET x=excluded.x, y=excluded.y"
    );
}

#[test]
fn test_postgres_on_conflict_with_lock() {
    let sql = single_sql(upsert(&locked(person_ext()), Dialect::Postgres).unwrap());
    assert_eq!(
        sql,
        "INSERT INTO person_ext (id, x, y) VALUES ($1, $2, $3) \
         ON CONFLICT (id) DO UPDATE SET x=excluded.x, y=excluded.y WHERE person_ext.v=$4"
    );
}

#[test]
fn test_postgres_key_only_does_nothing() {
    let mut update = person_ext();
    update.value_bindings.clear();
    let sql = single_sql(upsert(&update, Dialect::Postgres).unwrap());
    assert_eq!(sql, "INSERT INTO person_ext (id) VALUES ($1) ON CONFLICT (id) DO NOTHING");
}

#[test]
fn test_postgres_optional_falls_back_to_statement_sequence() {
    let operation = upsert(&optional(person_ext()), Dialect::Postgres).unwrap();
    let MutationOperation::UpdateOrInsert { update, insert, delete } = &operation else {
        panic!("expected update-or-insert, got {:?}", operation);
    };
    assert_eq!(update.sql, "UPDATE person_ext SET x=$1, y=$2 WHERE id=$3");
    assert_eq!(
        update.binders,
        vec![Binder::named("x"), Binder::named("y"), Binder::named("id")]
    );
    assert_eq!(insert.sql, "INSERT INTO person_ext (id, x, y) VALUES ($1, $2, $3)");
    assert_eq!(
        delete.as_ref().map(|d| d.sql.as_str()),
        Some("DELETE FROM person_ext WHERE id=$1")
    );
    assert_eq!(operation.statements().len(), 3);
}

#[test]
fn test_mysql_on_duplicate_key() {
    let sql = single_sql(upsert(&person_ext(), Dialect::MySQL).unwrap());
    assert_eq!(
        sql,
        "INSERT INTO person_ext (id, x, y) VALUES (?, ?, ?) ON DUPLICATE KEY UPDATE x=VALUES(x), y=VALUES(y)"
    );
}

#[test]
fn test_mysql_lock_falls_back() {
    let operation = upsert(&locked(person_ext()), Dialect::MySQL).unwrap();
    let MutationOperation::UpdateOrInsert { update, delete, .. } = &operation else {
        panic!("expected update-or-insert, got {:?}", operation);
    };
    assert_eq!(update.sql, "UPDATE person_ext SET x=?, y=? WHERE id=? AND v=?");
    assert!(delete.is_none());
    assert_eq!(operation.statements().len(), 2);
}

#[test]
fn test_missing_keys_are_rejected() {
    let mut update = person_ext();
    update.key_bindings.clear();
    assert!(matches!(
        upsert(&update, Dialect::Postgres),
        Err(TranslateError::Structural(_))
    ));
}

#[test]
fn test_fallback_without_values_is_unsupported() {
    let mut update = optional(person_ext());
    update.value_bindings.clear();
    assert!(matches!(
        upsert(&update, Dialect::MySQL),
        Err(TranslateError::Unsupported(_))
    ));
}

#[test]
fn test_operation_serializes_with_kind_tag() {
    let operation = upsert(&person_ext(), Dialect::MySQL).unwrap();
    let json = serde_json::to_value(&operation).unwrap();
    assert_eq!(json["kind"], "upsert");
    assert!(json["sql"].as_str().unwrap().starts_with("INSERT INTO person_ext"));
}
