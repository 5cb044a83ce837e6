//! FULL JOIN emulation.

use pretty_assertions::assert_eq;

use super::person_ids;
use crate::ast::builders::*;
use crate::ast::*;
use crate::error::TranslateError;
use crate::transpiler::ToSql;
use crate::transpiler::dialect::Dialect;

/// `SELECT a.id, b.id FROM A a FULL JOIN B b ON a.k=b.k`
fn full_join_query() -> QueryBuilder {
    select(vec![col("a", "id"), col("b", "id")]).from(table("A", "a").join(join(
        JoinKind::Full,
        table("B", "b"),
        Predicate::equal(col("a", "k"), col("b", "k")),
    )))
}

const LEFT: &str = "SELECT a.id, b.id FROM A AS a LEFT JOIN B AS b ON a.k=b.k";
const RIGHT: &str = "SELECT a.id, b.id FROM A AS a RIGHT JOIN B AS b ON a.k=b.k";
const INNER: &str = "SELECT a.id, b.id FROM A AS a INNER JOIN B AS b ON a.k=b.k";

#[test]
fn test_native_full_join() {
    let sql = full_join_query().build().to_sql_with_dialect(Dialect::Postgres).unwrap().sql;
    assert_eq!(sql, "SELECT a.id, b.id FROM A AS a FULL JOIN B AS b ON a.k=b.k");
}

#[test]
fn test_single_full_join_with_except_all() {
    let sql = full_join_query().build().to_sql_with_dialect(Dialect::H2).unwrap().sql;
    assert_eq!(sql, format!("({} UNION ALL {}) EXCEPT ALL {}", LEFT, RIGHT, INNER));
}

#[test]
fn test_single_full_join_without_except_all() {
    let out = full_join_query().build().to_sql_with_dialect(Dialect::MySQL).unwrap();
    assert_eq!(out.sql, format!("{} UNION ALL {} WHERE a.k IS NULL", LEFT, RIGHT));
    assert_eq!(out.affected_tables.len(), 2);
}

#[test]
fn test_distinct_uses_union() {
    let sql = full_join_query()
        .distinct()
        .build()
        .to_sql_with_dialect(Dialect::H2)
        .unwrap()
        .sql;
    assert_eq!(
        sql,
        "SELECT DISTINCT a.id, b.id FROM A AS a LEFT JOIN B AS b ON a.k=b.k \
         UNION SELECT DISTINCT a.id, b.id FROM A AS a RIGHT JOIN B AS b ON a.k=b.k WHERE a.k IS NULL"
    );
}

#[test]
fn test_existing_restriction_is_kept_in_every_branch() {
    let sql = full_join_query()
        .filter(Predicate::equal(col("a", "tenant"), param("tenant")))
        .build()
        .to_sql_with_dialect(Dialect::MySQL)
        .unwrap();
    assert_eq!(
        sql.sql,
        format!(
            "{} WHERE a.tenant=? UNION ALL {} WHERE a.tenant=? AND a.k IS NULL",
            LEFT, RIGHT
        )
    );
    assert_eq!(sql.binders.len(), 2);
}

#[test]
fn test_sort_and_fetch_move_to_outer_group() {
    let sql = full_join_query()
        .order_by(SortSpecification::desc(col("b", "name")))
        .fetch(Expr::literal(10))
        .build()
        .to_sql_with_dialect(Dialect::MySQL)
        .unwrap()
        .sql;
    assert_eq!(
        sql,
        "SELECT a.id, b.id, b.name FROM A AS a LEFT JOIN B AS b ON a.k=b.k \
         UNION ALL SELECT a.id, b.id, b.name FROM A AS a RIGHT JOIN B AS b ON a.k=b.k WHERE a.k IS NULL \
         ORDER BY 3 DESC LIMIT 10"
    );
}

#[test]
fn test_null_rank_selection_for_outer_sort() {
    let sql = full_join_query()
        .order_by(SortSpecification::asc(col("a", "id")).nulls(NullPrecedence::First))
        .build()
        .to_sql_with_dialect(Dialect::MySQL)
        .unwrap()
        .sql;
    assert_eq!(
        sql,
        "SELECT a.id, b.id, IF(a.id IS NULL, 0, 1) FROM A AS a LEFT JOIN B AS b ON a.k=b.k \
         UNION ALL SELECT a.id, b.id, IF(a.id IS NULL, 0, 1) FROM A AS a RIGHT JOIN B AS b ON a.k=b.k \
         WHERE a.k IS NULL ORDER BY 3 ASC, 1 ASC"
    );
}

#[test]
fn test_two_full_joins_enumerate_four_branches() {
    let query = select(vec![col("a", "id"), col("b", "id"), col("c", "id")])
        .from(
            table("A", "a")
                .join(join(
                    JoinKind::Full,
                    table("B", "b"),
                    Predicate::equal(col("a", "k"), col("b", "k")),
                ))
                .join(join(
                    JoinKind::Full,
                    table("C", "c"),
                    Predicate::equal(col("b", "j"), col("c", "j")),
                )),
        )
        .build();
    let sql = query.to_sql_with_dialect(Dialect::MySQL).unwrap().sql;
    let branches: Vec<&str> = sql.split(" UNION ALL ").collect();
    let head = "SELECT a.id, b.id, c.id FROM A AS a";
    assert_eq!(
        branches,
        vec![
            format!("{head} LEFT JOIN B AS b ON a.k=b.k LEFT JOIN C AS c ON b.j=c.j"),
            format!(
                "{head} LEFT JOIN B AS b ON a.k=b.k RIGHT JOIN C AS c ON b.j=c.j WHERE b.j IS NULL AND b.k IS NOT NULL"
            ),
            format!("{head} RIGHT JOIN B AS b ON a.k=b.k LEFT JOIN C AS c ON b.j=c.j WHERE a.k IS NULL"),
            format!(
                "{head} RIGHT JOIN B AS b ON a.k=b.k RIGHT JOIN C AS c ON b.j=c.j WHERE a.k IS NULL AND b.j IS NULL"
            ),
        ]
    );
}

#[test]
fn test_full_join_inside_subquery_is_emulated_in_place() {
    let inner = select(vec![col("a", "id")])
        .from(table("A", "a").join(join(
            JoinKind::Full,
            table("B", "b"),
            Predicate::equal(col("a", "k"), col("b", "k")),
        )))
        .filter(Predicate::equal(col("a", "owner_id"), col("p", "id")))
        .build();
    let sql = person_ids()
        .filter(Predicate::exists(inner))
        .build()
        .to_sql_with_dialect(Dialect::MySQL)
        .unwrap()
        .sql;
    assert_eq!(
        sql,
        "SELECT p.id FROM person AS p WHERE EXISTS (\
         SELECT a.id FROM A AS a LEFT JOIN B AS b ON a.k=b.k WHERE a.owner_id=p.id \
         UNION ALL SELECT a.id FROM A AS a RIGHT JOIN B AS b ON a.k=b.k WHERE a.owner_id=p.id AND a.k IS NULL)"
    );
}

#[test]
fn test_distinct_with_unselected_sort_is_infeasible() {
    let result = full_join_query()
        .distinct()
        .order_by(SortSpecification::asc(col("b", "name")))
        .build()
        .to_sql_with_dialect(Dialect::MySQL);
    assert!(matches!(result, Err(TranslateError::EmulationInfeasible(_))));
}

#[test]
fn test_full_join_without_key_is_infeasible() {
    let query = select(vec![col("a", "id")])
        .from(table("A", "a").join(join(
            JoinKind::Full,
            table("B", "b"),
            Predicate::compare(col("a", "k"), ComparisonOp::Lt, col("b", "k")),
        )))
        .build();
    assert!(matches!(
        query.to_sql_with_dialect(Dialect::MySQL),
        Err(TranslateError::EmulationInfeasible(_))
    ));
}
