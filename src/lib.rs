//! # astsql
//!
//! Dialect-aware SQL translator: renders a portable statement tree into
//! parameterized SQL for one target database, together with the ordered
//! parameter binders and the set of tables the statement touches.
//!
//! ## Quick Example
//!
//! ```
//! use astsql::prelude::*;
//! use astsql::ast::builders::{col, param, select, table};
//!
//! let query = select(vec![col("p", "id"), col("p", "name")])
//!     .from(table("person", "p"))
//!     .filter(Predicate::equal(col("p", "id"), param("id")))
//!     .build();
//!
//! let out = query.to_sql_with_dialect(Dialect::Postgres).unwrap();
//! assert_eq!(out.sql, "SELECT p.id, p.name FROM person AS p WHERE p.id=$1");
//! assert_eq!(out.binders, vec![Binder::named("id")]);
//! ```
//!
//! Constructs a dialect cannot express natively are emulated where the
//! result is equivalent: `FULL JOIN` becomes a set operation over one-sided
//! joins, `NULLS FIRST/LAST` becomes a rank key, and optional-row upserts
//! become `MERGE`, `ON CONFLICT`, `ON DUPLICATE KEY` or a statement sequence.

pub mod ast;
pub mod config;
pub mod error;
pub mod transpiler;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::Settings;
    pub use crate::error::*;
    pub use crate::transpiler::{
        CompiledStatement, Dialect, DialectDescriptor, LiteralRendering, MutationOperation, ToSql,
        TranslateOptions, translate, translate_upsert,
    };
}
