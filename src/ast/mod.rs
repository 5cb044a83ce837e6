//! Dialect-neutral statement tree.

pub mod builders;
pub mod expr;
pub mod from;
pub mod path;
pub mod predicate;
pub mod query;
pub mod statement;
pub mod types;
pub mod values;
pub mod visit;

pub use expr::{ArithmeticOp, Binder, ColumnKey, ColumnReference, Expr, Qualifier, UnaryOp};
pub use from::{
    FromClause, JoinKind, TableGroup, TableGroupJoin, TableReference, TableReferenceJoin,
    TableSource,
};
pub use path::NavigablePath;
pub use predicate::{ComparisonOp, JunctionNature, Predicate};
pub use query::{
    NullPrecedence, QueryGroup, QueryPart, QuerySpec, SelectClause, SetOperator, SortOrder,
    SortSpecification, SqlSelection,
};
pub use statement::{
    Assignment, ColumnValueBinding, DeleteStatement, InsertSource, InsertStatement,
    OptionalTableUpdate, Statement, UpdateStatement,
};
pub use types::{SqlType, TypeCode};
pub use values::Value;
