use serde::{Deserialize, Serialize};

use super::expr::Expr;
use super::from::FromClause;
use super::predicate::Predicate;

/// One select-list item. Positions are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlSelection {
    pub position: usize,
    pub expr: Expr,
    /// Column alias, used for derived tables on dialects without column lists.
    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectClause {
    #[serde(default)]
    pub distinct: bool,
    pub selections: Vec<SqlSelection>,
}

impl SelectClause {
    pub fn new(exprs: Vec<Expr>) -> Self {
        Self {
            distinct: false,
            selections: exprs
                .into_iter()
                .enumerate()
                .map(|(i, expr)| SqlSelection {
                    position: i + 1,
                    expr,
                    alias: None,
                })
                .collect(),
        }
    }

    /// Position of the first selection equal to `expr`.
    pub fn position_of(&self, expr: &Expr) -> Option<usize> {
        self.selections
            .iter()
            .find(|s| &s.expr == expr)
            .map(|s| s.position)
    }

    pub fn push(&mut self, expr: Expr) -> usize {
        let position = self.selections.len() + 1;
        self.selections.push(SqlSelection {
            position,
            expr,
            alias: None,
        });
        position
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPrecedence {
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpecification {
    pub expr: Expr,
    #[serde(default)]
    pub collation: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default)]
    pub nulls: Option<NullPrecedence>,
}

impl SortSpecification {
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            collation: None,
            order: SortOrder::Ascending,
            nulls: None,
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            order: SortOrder::Descending,
            ..Self::asc(expr)
        }
    }

    pub fn nulls(mut self, nulls: NullPrecedence) -> Self {
        self.nulls = Some(nulls);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub select: SelectClause,
    #[serde(default)]
    pub from: FromClause,
    #[serde(default)]
    pub restriction: Option<Predicate>,
    #[serde(default)]
    pub group_by: Vec<Expr>,
    #[serde(default)]
    pub having: Option<Predicate>,
    #[serde(default)]
    pub sort: Vec<SortSpecification>,
    #[serde(default)]
    pub offset: Option<Expr>,
    #[serde(default)]
    pub fetch: Option<Expr>,
}

impl QuerySpec {
    pub fn has_sort_or_limit(&self) -> bool {
        !self.sort.is_empty() || self.offset.is_some() || self.fetch.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetOperator {
    Union,
    UnionAll,
    Intersect,
    IntersectAll,
    Except,
    ExceptAll,
}

impl SetOperator {
    pub fn sql(&self) -> &'static str {
        match self {
            SetOperator::Union => " UNION ",
            SetOperator::UnionAll => " UNION ALL ",
            SetOperator::Intersect => " INTERSECT ",
            SetOperator::IntersectAll => " INTERSECT ALL ",
            SetOperator::Except => " EXCEPT ",
            SetOperator::ExceptAll => " EXCEPT ALL ",
        }
    }
}

/// Set operation over several query parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryGroup {
    pub operator: SetOperator,
    pub parts: Vec<QueryPart>,
    #[serde(default)]
    pub sort: Vec<SortSpecification>,
    #[serde(default)]
    pub offset: Option<Expr>,
    #[serde(default)]
    pub fetch: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryPart {
    Spec(QuerySpec),
    Group(QueryGroup),
}

impl QueryPart {
    /// The leftmost query specification, which defines the selection shape.
    pub fn first_spec(&self) -> Option<&QuerySpec> {
        match self {
            QueryPart::Spec(spec) => Some(spec),
            QueryPart::Group(group) => group.parts.first().and_then(QueryPart::first_spec),
        }
    }
}

impl From<QuerySpec> for QueryPart {
    fn from(spec: QuerySpec) -> Self {
        QueryPart::Spec(spec)
    }
}

impl From<QueryGroup> for QueryPart {
    fn from(group: QueryGroup) -> Self {
        QueryPart::Group(group)
    }
}
