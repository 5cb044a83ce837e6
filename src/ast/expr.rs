use serde::{Deserialize, Serialize};

use super::path::NavigablePath;
use super::predicate::Predicate;
use super::query::QueryPart;
use super::types::SqlType;
use super::values::Value;

/// What a column reference is qualified by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualifier {
    /// A literal SQL alias (identification variable).
    Alias(String),
    /// The table group registered for a navigable path; resolved to its alias
    /// at render time. `table` selects a secondary table of the group.
    Path {
        path: NavigablePath,
        #[serde(default)]
        table: Option<String>,
    },
}

impl std::fmt::Display for Qualifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Qualifier::Alias(alias) => write!(f, "{}", alias),
            Qualifier::Path { path, table: None } => write!(f, "{{{}}}", path),
            Qualifier::Path {
                path,
                table: Some(table),
            } => write!(f, "{{{}#{}}}", path, table),
        }
    }
}

/// A physical column or formula, identified by `(qualifier, column)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnReference {
    #[serde(default)]
    pub qualifier: Option<Qualifier>,
    /// Column name, or the formula text when `formula` is set.
    pub column: String,
    /// Formulas render verbatim and never take a qualifier.
    #[serde(default)]
    pub formula: bool,
    #[serde(default)]
    pub sql_type: Option<SqlType>,
}

impl ColumnReference {
    pub fn new(qualifier: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            qualifier: Some(Qualifier::Alias(qualifier.into())),
            column: column.into(),
            formula: false,
            sql_type: None,
        }
    }

    pub fn unqualified(column: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            column: column.into(),
            formula: false,
            sql_type: None,
        }
    }

    pub fn at_path(path: NavigablePath, column: impl Into<String>) -> Self {
        Self {
            qualifier: Some(Qualifier::Path { path, table: None }),
            column: column.into(),
            formula: false,
            sql_type: None,
        }
    }

    pub fn typed(mut self, sql_type: SqlType) -> Self {
        self.sql_type = Some(sql_type);
        self
    }

    /// The alias this column is qualified with, if it is a literal alias.
    pub fn alias(&self) -> Option<&str> {
        match &self.qualifier {
            Some(Qualifier::Alias(alias)) => Some(alias),
            _ => None,
        }
    }

    /// Deduplication key: two references with equal keys are one selection.
    pub fn key(&self) -> ColumnKey {
        ColumnKey {
            qualifier: self.qualifier.as_ref().map(|q| q.to_string()),
            column: self.column.clone(),
        }
    }
}

/// Stable `(qualifier, column)` identity of a column reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnKey {
    pub qualifier: Option<String>,
    pub column: String,
}

/// Value-binding descriptor produced for each rendered parameter marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Binder {
    /// Named query parameter (`:name`).
    Named {
        name: String,
        #[serde(default)]
        sql_type: Option<SqlType>,
    },
    /// Positional query parameter (`?1`).
    Positional {
        position: usize,
        #[serde(default)]
        sql_type: Option<SqlType>,
    },
    /// A literal the translator chose to bind instead of inlining.
    Literal {
        value: Value,
        #[serde(default)]
        sql_type: Option<SqlType>,
    },
}

impl Binder {
    pub fn named(name: impl Into<String>) -> Self {
        Binder::Named {
            name: name.into(),
            sql_type: None,
        }
    }

    pub fn positional(position: usize) -> Self {
        Binder::Positional {
            position,
            sql_type: None,
        }
    }

    pub fn with_type(self, ty: SqlType) -> Self {
        match self {
            Binder::Named { name, .. } => Binder::Named {
                name,
                sql_type: Some(ty),
            },
            Binder::Positional { position, .. } => Binder::Positional {
                position,
                sql_type: Some(ty),
            },
            Binder::Literal { value, .. } => Binder::Literal {
                value,
                sql_type: Some(ty),
            },
        }
    }

    pub fn sql_type(&self) -> Option<&SqlType> {
        match self {
            Binder::Named { sql_type, .. }
            | Binder::Positional { sql_type, .. }
            | Binder::Literal { sql_type, .. } => sql_type.as_ref(),
        }
    }
}

impl std::fmt::Display for Binder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Binder::Named { name, .. } => write!(f, ":{}", name),
            Binder::Positional { position, .. } => write!(f, "?{}", position),
            Binder::Literal { value, .. } => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl std::fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArithmeticOp::Add => write!(f, "+"),
            ArithmeticOp::Subtract => write!(f, "-"),
            ArithmeticOp::Multiply => write!(f, "*"),
            ArithmeticOp::Divide => write!(f, "/"),
            ArithmeticOp::Modulo => write!(f, "%"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Plus,
    Minus,
}

/// Expression node of the statement tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Column(ColumnReference),
    Literal {
        value: Value,
        #[serde(default)]
        sql_type: Option<SqlType>,
    },
    Parameter(Binder),
    Tuple(Vec<Expr>),
    Binary {
        left: Box<Expr>,
        op: ArithmeticOp,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `CASE WHEN p THEN r ... ELSE o END`
    CaseSearched {
        whens: Vec<(Predicate, Expr)>,
        #[serde(default)]
        otherwise: Option<Box<Expr>>,
    },
    /// `CASE f WHEN v THEN r ... ELSE o END`
    CaseSimple {
        fixture: Box<Expr>,
        whens: Vec<(Expr, Expr)>,
        #[serde(default)]
        otherwise: Option<Box<Expr>>,
    },
    /// Function or aggregate call, rendered as `name(args)`.
    Function {
        name: String,
        #[serde(default)]
        args: Vec<Expr>,
        #[serde(default)]
        distinct: bool,
    },
    CountStar {
        #[serde(default)]
        distinct: bool,
    },
    Cast {
        expr: Box<Expr>,
        target: SqlType,
    },
    /// Scalar subquery.
    Subquery(Box<QueryPart>),
    /// 1-based position of a select-list item; only valid in ORDER BY / GROUP BY.
    SelectionRef(usize),
}

impl Expr {
    pub fn column(qualifier: impl Into<String>, column: impl Into<String>) -> Self {
        Expr::Column(ColumnReference::new(qualifier, column))
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal {
            value: value.into(),
            sql_type: None,
        }
    }

    pub fn param(name: impl Into<String>) -> Self {
        Expr::Parameter(Binder::named(name))
    }

    pub fn typed_param(name: impl Into<String>, ty: SqlType) -> Self {
        Expr::Parameter(Binder::named(name).with_type(ty))
    }

    pub fn function(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Function {
            name: name.into(),
            args,
            distinct: false,
        }
    }

    pub fn as_column(&self) -> Option<&ColumnReference> {
        match self {
            Expr::Column(col) => Some(col),
            _ => None,
        }
    }

    /// Best-known SQL type of this expression.
    pub fn sql_type(&self) -> Option<SqlType> {
        match self {
            Expr::Column(col) => col.sql_type,
            Expr::Literal { value, sql_type } => sql_type.or_else(|| value.sql_type()),
            Expr::Parameter(binder) => binder.sql_type().copied(),
            Expr::Cast { target, .. } => Some(*target),
            Expr::Binary { left, right, .. } => left.sql_type().or_else(|| right.sql_type()),
            Expr::Unary { operand, .. } => operand.sql_type(),
            _ => None,
        }
    }
}

impl From<ColumnReference> for Expr {
    fn from(col: ColumnReference) -> Self {
        Expr::Column(col)
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Literal {
            value,
            sql_type: None,
        }
    }
}
