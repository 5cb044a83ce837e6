use serde::{Deserialize, Serialize};

use super::expr::{ColumnReference, Expr};
use super::from::TableReference;
use super::predicate::Predicate;
use super::query::QueryPart;

/// Top-level statement handed to the translator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    Select(QueryPart),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertSource {
    Values(Vec<Vec<Expr>>),
    Query(QueryPart),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertStatement {
    pub target: TableReference,
    pub columns: Vec<String>,
    pub source: InsertSource,
}

/// `SET` item; several columns form a tuple assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub columns: Vec<ColumnReference>,
    pub value: Expr,
}

impl Assignment {
    pub fn new(column: ColumnReference, value: Expr) -> Self {
        Self {
            columns: vec![column],
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStatement {
    pub target: TableReference,
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub restriction: Option<Predicate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteStatement {
    pub target: TableReference,
    #[serde(default)]
    pub restriction: Option<Predicate>,
}

impl Statement {
    /// Mutation target, `None` for queries.
    pub fn target(&self) -> Option<&TableReference> {
        match self {
            Statement::Select(_) => None,
            Statement::Insert(insert) => Some(&insert.target),
            Statement::Update(update) => Some(&update.target),
            Statement::Delete(delete) => Some(&delete.target),
        }
    }
}

/// One column of an optional table update and the value it receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnValueBinding {
    pub column: String,
    pub value: Expr,
}

impl ColumnValueBinding {
    pub fn new(column: impl Into<String>, value: Expr) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }
}

/// Insert-or-update(-or-delete) of one row of a secondary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionalTableUpdate {
    pub table: String,
    pub key_bindings: Vec<ColumnValueBinding>,
    pub value_bindings: Vec<ColumnValueBinding>,
    #[serde(default)]
    pub optimistic_lock_bindings: Vec<ColumnValueBinding>,
    /// Row is deleted once every value column is null.
    #[serde(default)]
    pub optional: bool,
}
