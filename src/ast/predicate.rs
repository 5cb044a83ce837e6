use serde::{Deserialize, Serialize};

use super::expr::Expr;
use super::query::QueryPart;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Distinct,
    NotDistinct,
}

impl ComparisonOp {
    pub fn sql(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "<>",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
            ComparisonOp::Distinct => " IS DISTINCT FROM ",
            ComparisonOp::NotDistinct => " IS NOT DISTINCT FROM ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JunctionNature {
    Conjunction,
    Disjunction,
}

impl JunctionNature {
    pub fn keyword(&self) -> &'static str {
        match self {
            JunctionNature::Conjunction => " AND ",
            JunctionNature::Disjunction => " OR ",
        }
    }
}

/// Boolean-valued node of the statement tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Comparison {
        left: Expr,
        op: ComparisonOp,
        right: Expr,
    },
    Junction {
        nature: JunctionNature,
        predicates: Vec<Predicate>,
    },
    Negated(Box<Predicate>),
    /// Explicit parentheses.
    Grouped(Box<Predicate>),
    Nullness {
        expr: Expr,
        #[serde(default)]
        negated: bool,
    },
    Between {
        expr: Expr,
        low: Expr,
        high: Expr,
        #[serde(default)]
        negated: bool,
    },
    InList {
        expr: Expr,
        list: Vec<Expr>,
        #[serde(default)]
        negated: bool,
    },
    InSubquery {
        expr: Expr,
        query: Box<QueryPart>,
        #[serde(default)]
        negated: bool,
    },
    Exists {
        query: Box<QueryPart>,
        #[serde(default)]
        negated: bool,
    },
    Like {
        expr: Expr,
        pattern: Expr,
        #[serde(default)]
        escape: Option<Expr>,
        #[serde(default)]
        negated: bool,
        /// Compare both sides lower-cased.
        #[serde(default)]
        ignore_case: bool,
    },
    /// A boolean-typed expression used as a predicate.
    BooleanExpr(Expr),
}

impl Predicate {
    pub fn equal(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Predicate::Comparison {
            left: left.into(),
            op: ComparisonOp::Eq,
            right: right.into(),
        }
    }

    pub fn compare(left: impl Into<Expr>, op: ComparisonOp, right: impl Into<Expr>) -> Self {
        Predicate::Comparison {
            left: left.into(),
            op,
            right: right.into(),
        }
    }

    pub fn is_null(expr: impl Into<Expr>) -> Self {
        Predicate::Nullness {
            expr: expr.into(),
            negated: false,
        }
    }

    pub fn is_not_null(expr: impl Into<Expr>) -> Self {
        Predicate::Nullness {
            expr: expr.into(),
            negated: true,
        }
    }

    pub fn exists(query: QueryPart) -> Self {
        Predicate::Exists {
            query: Box::new(query),
            negated: false,
        }
    }

    /// Conjunction of `predicates`, collapsing trivial cases.
    pub fn and(predicates: Vec<Predicate>) -> Option<Self> {
        Self::junction(JunctionNature::Conjunction, predicates)
    }

    pub fn or(predicates: Vec<Predicate>) -> Option<Self> {
        Self::junction(JunctionNature::Disjunction, predicates)
    }

    fn junction(nature: JunctionNature, mut predicates: Vec<Predicate>) -> Option<Self> {
        match predicates.len() {
            0 => None,
            1 => predicates.pop(),
            _ => Some(Predicate::Junction { nature, predicates }),
        }
    }

    /// `true` for junctions without members, which render to nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Predicate::Junction { predicates, .. } => predicates.iter().all(Predicate::is_empty),
            Predicate::Grouped(inner) => inner.is_empty(),
            _ => false,
        }
    }

    /// Combine an optional restriction with an extra conjunct.
    pub fn combine(existing: Option<Predicate>, extra: Predicate) -> Predicate {
        match existing {
            None => extra,
            Some(Predicate::Junction {
                nature: JunctionNature::Conjunction,
                mut predicates,
            }) => {
                predicates.push(extra);
                Predicate::Junction {
                    nature: JunctionNature::Conjunction,
                    predicates,
                }
            }
            Some(other) if other.is_empty() => extra,
            Some(other) => Predicate::Junction {
                nature: JunctionNature::Conjunction,
                predicates: vec![other, extra],
            },
        }
    }
}
