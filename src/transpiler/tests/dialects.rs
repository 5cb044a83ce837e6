//! Dialect-specific spelling and capability fallbacks.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use super::{owner_of, person_ids};
use crate::ast::builders::*;
use crate::ast::*;
use crate::error::{TranslateError, TranslateResult};
use crate::transpiler::dialect::Dialect;
use crate::transpiler::{CompiledStatement, ToSql};

fn compile(query: QueryPart, dialect: Dialect) -> TranslateResult<CompiledStatement> {
    query.to_sql_with_dialect(dialect)
}

fn sql(query: QueryPart, dialect: Dialect) -> String {
    compile(query, dialect).unwrap().sql
}

fn derived_person_ids() -> TableGroup {
    TableGroup::new(TableReference {
        source: TableSource::Query {
            query: Box::new(person_ids().build()),
            column_names: vec!["pid".into()],
        },
        identification_variable: Some("d".into()),
    })
}

fn doubly_nested_correlation() -> QueryPart {
    let innermost = select(vec![Expr::literal(1)])
        .from(table("C", "c"))
        .filter(Predicate::equal(col("c", "x"), col("a", "y")))
        .build();
    let middle = select(vec![Expr::literal(1)])
        .from(table("B", "b"))
        .filter(Predicate::exists(innermost))
        .build();
    select(vec![col("a", "id")])
        .from(table("A", "a"))
        .filter(Predicate::exists(middle))
        .build()
}

#[test]
fn test_postgres_markers_and_limit() {
    let query = person_ids()
        .filter(Predicate::equal(col("p", "id"), param("id")))
        .offset(Expr::literal(5))
        .fetch(param("n"))
        .build();
    let out = compile(query, Dialect::Postgres).unwrap();
    assert_eq!(out.sql, "SELECT p.id FROM person AS p WHERE p.id=$1 LIMIT $2 OFFSET 5");
    assert_eq!(out.binders, vec![Binder::named("id"), Binder::named("n")]);
}

#[test]
fn test_oracle_dual_and_booleans() {
    assert_eq!(sql(select(vec![Expr::literal(true)]).build(), Dialect::Oracle), "SELECT 1 FROM dual");
    assert_eq!(sql(select(vec![Expr::literal(true)]).build(), Dialect::Ansi), "SELECT TRUE");

    let query = person_ids()
        .filter(Predicate::BooleanExpr(col("p", "active")))
        .filter(Predicate::equal(col("p", "id"), param("id")))
        .build();
    assert_eq!(
        sql(query, Dialect::Oracle),
        "SELECT p.id FROM person p WHERE p.active=1 AND p.id=:1"
    );
}

#[test]
fn test_oracle_cast_type_names() {
    let query = select(vec![Expr::Cast {
        expr: Box::new(col("p", "code")),
        target: SqlType::varchar(10),
    }])
    .from(table("person", "p"))
    .build();
    assert_eq!(sql(query, Dialect::Oracle), "SELECT CAST(p.code AS varchar2(10 char)) FROM person p");
}

#[test]
fn test_oracle_decode() {
    let simple = Expr::CaseSimple {
        fixture: Box::new(col("p", "kind")),
        whens: vec![
            (Expr::literal("a"), Expr::literal(1)),
            (Expr::literal("b"), Expr::literal(2)),
        ],
        otherwise: Some(Box::new(Expr::literal(0))),
    };
    let searched = Expr::CaseSearched {
        whens: vec![
            (Predicate::is_null(col("p", "kind")), Expr::literal("none")),
            (Predicate::equal(col("p", "kind"), Expr::literal("a")), Expr::literal("A")),
        ],
        otherwise: None,
    };
    let range = Expr::CaseSearched {
        whens: vec![(
            Predicate::compare(col("p", "age"), ComparisonOp::Ge, Expr::literal(18)),
            Expr::literal("adult"),
        )],
        otherwise: None,
    };
    let query = select(vec![simple, searched, range]).from(table("person", "p")).build();
    assert_eq!(
        sql(query, Dialect::Oracle),
        "SELECT DECODE(p.kind, 'a', 1, 'b', 2, 0), DECODE(p.kind, NULL, 'none', 'a', 'A'), \
         CASE WHEN p.age>=18 THEN 'adult' END FROM person p"
    );
}

#[test]
fn test_oracle_parameter_arms_keep_case() {
    let searched = Expr::CaseSearched {
        whens: vec![
            (Predicate::equal(col("p", "kind"), Expr::literal("a")), Expr::literal("A")),
            (Predicate::equal(col("p", "kind"), param("kind")), Expr::literal("bound")),
        ],
        otherwise: None,
    };
    let simple = Expr::CaseSimple {
        fixture: Box::new(col("p", "kind")),
        whens: vec![(param("kind"), Expr::literal(1))],
        otherwise: Some(Box::new(Expr::literal(0))),
    };
    let query = select(vec![searched, simple]).from(table("person", "p")).build();
    assert_eq!(
        sql(query, Dialect::Oracle),
        "SELECT CASE WHEN p.kind='a' THEN 'A' WHEN p.kind=:1 THEN 'bound' END, \
         CASE p.kind WHEN :2 THEN 1 ELSE 0 END FROM person p"
    );
}

#[test]
fn test_mysql_nested_if() {
    let searched = Expr::CaseSearched {
        whens: vec![
            (
                Predicate::compare(col("p", "age"), ComparisonOp::Lt, Expr::literal(18)),
                Expr::literal("minor"),
            ),
            (
                Predicate::compare(col("p", "age"), ComparisonOp::Lt, Expr::literal(65)),
                Expr::literal("adult"),
            ),
        ],
        otherwise: None,
    };
    let simple = Expr::CaseSimple {
        fixture: Box::new(col("p", "kind")),
        whens: vec![(Expr::literal("a"), Expr::literal(1))],
        otherwise: Some(Box::new(Expr::literal(0))),
    };
    let query = select(vec![searched, simple]).from(table("person", "p")).build();
    assert_eq!(
        sql(query, Dialect::MySQL),
        "SELECT IF(p.age<18, 'minor', IF(p.age<65, 'adult', NULL)), IF(p.kind='a', 1, 0) FROM person AS p"
    );
}

#[test]
fn test_null_precedence_emulation() {
    let query = || {
        person_ids()
            .order_by(SortSpecification::asc(col("p", "name")).nulls(NullPrecedence::Last))
            .fetch(Expr::literal(10))
            .build()
    };
    assert_eq!(
        sql(query(), Dialect::MySQL),
        "SELECT p.id FROM person AS p ORDER BY IF(p.name IS NULL, 1, 0) ASC, p.name ASC LIMIT 10"
    );
    assert_eq!(
        sql(query(), Dialect::SqlServer),
        "SELECT p.id FROM person AS p ORDER BY CASE WHEN p.name IS NULL THEN 1 ELSE 0 END ASC, p.name ASC \
         OFFSET 0 ROWS FETCH FIRST 10 ROWS ONLY"
    );
    assert_eq!(
        sql(query(), Dialect::Postgres),
        "SELECT p.id FROM person AS p ORDER BY p.name ASC NULLS LAST LIMIT 10"
    );
}

#[test]
fn test_null_precedence_on_selection_ref_ranks_the_selection() {
    let query = || {
        select(vec![col("p", "id"), col("p", "name")])
            .from(table("person", "p"))
            .order_by(SortSpecification::asc(Expr::SelectionRef(2)).nulls(NullPrecedence::First))
            .build()
    };
    assert_eq!(
        sql(query(), Dialect::MySQL),
        "SELECT p.id, p.name FROM person AS p ORDER BY IF(p.name IS NULL, 0, 1) ASC, 2 ASC"
    );
    assert_eq!(
        sql(query(), Dialect::Postgres),
        "SELECT p.id, p.name FROM person AS p ORDER BY 2 ASC NULLS FIRST"
    );
}

#[test]
fn test_null_precedence_on_missing_selection_ref_is_structural() {
    let query = person_ids()
        .order_by(SortSpecification::asc(Expr::SelectionRef(4)).nulls(NullPrecedence::First))
        .build();
    assert!(matches!(compile(query, Dialect::MySQL), Err(TranslateError::Structural(_))));
}

#[test]
fn test_null_precedence_on_union_position_is_unsupported() {
    let query = QueryPart::Group(QueryGroup {
        operator: SetOperator::Union,
        parts: vec![person_ids().build(), person_ids().build()],
        sort: vec![SortSpecification::asc(Expr::SelectionRef(1)).nulls(NullPrecedence::First)],
        offset: None,
        fetch: None,
    });
    assert!(matches!(compile(query, Dialect::MySQL), Err(TranslateError::Unsupported(_))));
}

#[test]
fn test_offset_without_fetch_gets_unbounded_limit() {
    let query = || {
        select(vec![col("a", "id")])
            .from(table("A", "a"))
            .offset(Expr::literal(5))
            .build()
    };
    assert_eq!(
        sql(query(), Dialect::MySQL),
        "SELECT a.id FROM A AS a LIMIT 18446744073709551615 OFFSET 5"
    );
    assert_eq!(sql(query(), Dialect::SQLite), "SELECT a.id FROM A AS a LIMIT -1 OFFSET 5");
    assert_eq!(sql(query(), Dialect::Postgres), "SELECT a.id FROM A AS a OFFSET 5");
    assert_eq!(sql(query(), Dialect::Ansi), "SELECT a.id FROM A AS a OFFSET 5 ROWS");
}

#[test]
fn test_sqlserver_fetch_gets_order_and_offset() {
    let unsorted = select(vec![col("a", "id")])
        .from(table("A", "a"))
        .fetch(Expr::literal(5))
        .build();
    assert_eq!(
        sql(unsorted, Dialect::SqlServer),
        "SELECT a.id FROM A AS a ORDER BY (SELECT 0) OFFSET 0 ROWS FETCH FIRST 5 ROWS ONLY"
    );

    let sorted_offset = select(vec![col("a", "id")])
        .from(table("A", "a"))
        .order_by(SortSpecification::asc(col("a", "id")))
        .offset(Expr::literal(5))
        .build();
    assert_eq!(
        sql(sorted_offset, Dialect::SqlServer),
        "SELECT a.id FROM A AS a ORDER BY a.id ASC OFFSET 5 ROWS"
    );

    let plain = select(vec![col("a", "id")]).from(table("A", "a")).build();
    assert_eq!(sql(plain, Dialect::SqlServer), "SELECT a.id FROM A AS a");
}

#[test]
fn test_sqlserver_literals_and_markers() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    let query = select(vec![Expr::literal(date), Expr::literal(Value::Bytes(vec![0xCA, 0xFE]))])
        .from(table("person", "p"))
        .filter(Predicate::equal(col("p", "id"), param("id")))
        .build();
    assert_eq!(
        sql(query, Dialect::SqlServer),
        "SELECT CAST('2024-01-31' AS date), 0xCAFE FROM person AS p WHERE p.id=@p1"
    );
}

#[test]
fn test_dml_target_alias_is_dropped() {
    let update = Statement::Update(UpdateStatement {
        target: TableReference::named("person", "p"),
        assignments: vec![Assignment::new(ColumnReference::new("p", "name"), param("name"))],
        restriction: Some(Predicate::equal(col("p", "id"), param("id"))),
    });
    assert_eq!(
        update.to_sql_with_dialect(Dialect::SqlServer).unwrap().sql,
        "UPDATE person SET name=@p1 WHERE id=@p2"
    );
    assert_eq!(
        update.to_sql_with_dialect(Dialect::Oracle).unwrap().sql,
        "UPDATE person p SET name=:1 WHERE p.id=:2"
    );
}

#[test]
fn test_correlated_dml_target_is_qualified_by_table() {
    let inner = select(vec![Expr::literal(1)])
        .from(table("address", "a"))
        .filter(owner_of("a"))
        .build();
    let delete = Statement::Delete(DeleteStatement {
        target: TableReference::named("person", "p"),
        restriction: Some(Predicate::exists(inner)),
    });
    assert_eq!(
        delete.to_sql_with_dialect(Dialect::SQLite).unwrap().sql,
        "DELETE FROM person WHERE EXISTS (SELECT 1 FROM address AS a WHERE a.owner_id=person.id)"
    );
}

#[test]
fn test_h2_casts_typed_parameters_in_select() {
    let query = select(vec![Expr::typed_param("v", SqlType::integer()), param("w")])
        .from(table("person", "p"))
        .filter(Predicate::equal(col("p", "id"), Expr::typed_param("id", SqlType::integer())))
        .build();
    assert_eq!(
        sql(query, Dialect::H2),
        "SELECT CAST(? AS integer), ? FROM person AS p WHERE p.id=?"
    );
}

#[test]
fn test_lateral_requires_support() {
    let mut lateral = TableGroupJoin::new(JoinKind::Inner, derived_person_ids(), None);
    lateral.lateral = true;
    let query = select(vec![col("d", "pid")])
        .from(table("person", "x").join(lateral))
        .build();
    assert!(matches!(
        compile(query.clone(), Dialect::SqlServer),
        Err(TranslateError::Unsupported(_))
    ));
    assert!(compile(query, Dialect::Postgres).is_ok());
}

#[test]
fn test_derived_column_names_without_column_list() {
    let query = select(vec![col("d", "pid")]).from(derived_person_ids()).build();
    assert_eq!(
        sql(query, Dialect::SQLite),
        "SELECT d.pid FROM (SELECT p.id AS pid FROM person AS p) AS d"
    );
}

#[test]
fn test_oracle_values_table_as_union() {
    let values = TableReference {
        source: TableSource::Values {
            rows: vec![
                vec![Expr::literal(1), Expr::literal("a")],
                vec![Expr::literal(2), Expr::literal("b")],
            ],
            column_names: vec!["id".into(), "code".into()],
        },
        identification_variable: Some("v".into()),
    };
    let query = select(vec![col("v", "code")]).from(TableGroup::new(values)).build();
    assert_eq!(
        sql(query, Dialect::Oracle),
        "SELECT v.code FROM (SELECT 1 id, 'a' code FROM dual UNION ALL SELECT 2 id, 'b' code FROM dual) v"
    );
}

#[test]
fn test_oracle_multi_row_insert() {
    let insert = Statement::Insert(InsertStatement {
        target: TableReference::unaliased("person"),
        columns: vec!["id".into(), "name".into()],
        source: InsertSource::Values(vec![
            vec![param("id1"), param("name1")],
            vec![param("id2"), param("name2")],
        ]),
    });
    assert_eq!(
        insert.to_sql_with_dialect(Dialect::Oracle).unwrap().sql,
        "INSERT INTO person (id, name) SELECT :1, :2 FROM dual UNION ALL SELECT :3, :4 FROM dual"
    );
}

#[test]
fn test_nested_correlation_guard() {
    assert!(matches!(
        compile(doubly_nested_correlation(), Dialect::Oracle),
        Err(TranslateError::Unsupported(_))
    ));
    assert!(compile(doubly_nested_correlation(), Dialect::Ansi).is_ok());
}

#[test]
fn test_nested_correlation_guard_follows_paths() {
    let person = NavigablePath::new("Person");
    let innermost = select(vec![Expr::literal(1)])
        .from(table("C", "c"))
        .filter(Predicate::equal(
            col("c", "x"),
            Expr::Column(ColumnReference::at_path(person.clone(), "id")),
        ))
        .build();
    let middle = select(vec![Expr::literal(1)])
        .from(table("B", "b"))
        .filter(Predicate::exists(innermost))
        .build();
    let query = || {
        select(vec![col("a", "id")])
            .from(table("A", "a").at_path(person.clone()))
            .filter(Predicate::exists(middle.clone()))
            .build()
    };
    assert!(matches!(compile(query(), Dialect::Oracle), Err(TranslateError::Unsupported(_))));
    assert_eq!(
        sql(query(), Dialect::Ansi),
        "SELECT a.id FROM A AS a WHERE EXISTS (SELECT 1 FROM B AS b WHERE EXISTS (\
         SELECT 1 FROM C AS c WHERE c.x=a.id))"
    );
}

#[test]
fn test_except_all_requires_support() {
    let group = QueryGroup {
        operator: SetOperator::ExceptAll,
        parts: vec![
            person_ids().build(),
            select(vec![col("a", "owner_id")]).from(table("address", "a")).build(),
        ],
        sort: Vec::new(),
        offset: None,
        fetch: None,
    };
    assert!(matches!(
        compile(group.clone().into(), Dialect::MySQL),
        Err(TranslateError::Unsupported(_))
    ));
    assert_eq!(
        sql(group.into(), Dialect::Postgres),
        "SELECT p.id FROM person AS p EXCEPT ALL SELECT a.owner_id FROM address AS a"
    );
}

#[test]
fn test_every_dialect_renders_a_plain_select() {
    for dialect in Dialect::ALL {
        let query = person_ids()
            .filter(Predicate::equal(col("p", "id"), param("id")))
            .build();
        let out = compile(query, dialect).unwrap();
        assert_eq!(out.binders.len(), 1, "{}", dialect);
        assert!(out.sql.starts_with("SELECT p.id FROM person"), "{}", dialect);
    }
}
