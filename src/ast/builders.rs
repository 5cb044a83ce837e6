//! Shorthand constructors for building statement trees in code and tests.

use super::expr::{ColumnReference, Expr};
use super::from::{FromClause, JoinKind, TableGroup, TableGroupJoin, TableReference};
use super::predicate::Predicate;
use super::query::{QueryPart, QuerySpec, SelectClause, SortSpecification};

/// `alias.column`
pub fn col(qualifier: &str, column: &str) -> Expr {
    Expr::Column(ColumnReference::new(qualifier, column))
}

/// Named parameter `:name`.
pub fn param(name: &str) -> Expr {
    Expr::param(name)
}

/// Table group over a named table with an explicit alias.
pub fn table(name: &str, alias: &str) -> TableGroup {
    TableGroup::new(TableReference::named(name, alias))
}

pub fn join(kind: JoinKind, group: TableGroup, predicate: Predicate) -> TableGroupJoin {
    TableGroupJoin::new(kind, group, Some(predicate))
}

pub fn select(exprs: Vec<Expr>) -> QueryBuilder {
    QueryBuilder {
        spec: QuerySpec {
            select: SelectClause::new(exprs),
            ..QuerySpec::default()
        },
    }
}

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    spec: QuerySpec,
}

impl QueryBuilder {
    pub fn distinct(mut self) -> Self {
        self.spec.select.distinct = true;
        self
    }

    pub fn from(mut self, group: TableGroup) -> Self {
        self.spec.from.roots.push(group);
        self
    }

    pub fn from_clause(mut self, from: FromClause) -> Self {
        self.spec.from = from;
        self
    }

    /// Adds a conjunct to the restriction.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.spec.restriction = Some(Predicate::combine(self.spec.restriction.take(), predicate));
        self
    }

    pub fn group_by(mut self, expr: Expr) -> Self {
        self.spec.group_by.push(expr);
        self
    }

    pub fn having(mut self, predicate: Predicate) -> Self {
        self.spec.having = Some(predicate);
        self
    }

    pub fn order_by(mut self, sort: SortSpecification) -> Self {
        self.spec.sort.push(sort);
        self
    }

    pub fn offset(mut self, expr: Expr) -> Self {
        self.spec.offset = Some(expr);
        self
    }

    pub fn fetch(mut self, expr: Expr) -> Self {
        self.spec.fetch = Some(expr);
        self
    }

    pub fn build_spec(self) -> QuerySpec {
        self.spec
    }

    pub fn build(self) -> QueryPart {
        QueryPart::Spec(self.spec)
    }
}
