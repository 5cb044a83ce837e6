//! SQL translator for the statement tree.
//!
//! Renders statements into dialect-specific SQL text together with the
//! ordered parameter binders and the set of tables the statement touches.

pub mod alias;
pub mod case;
pub mod clause;
pub mod conditions;
pub mod correlation;
pub mod dialect;
pub mod dml;
pub mod expressions;
pub mod from_index;
pub mod full_join;
pub mod selection;
pub mod sql;
pub mod translator;

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ast::*;
use crate::error::TranslateResult;
pub use dialect::{Dialect, DialectDescriptor};
pub use dml::MutationOperation;
pub use translator::SqlTranslator;

/// Output of one translation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledStatement {
    pub sql: String,
    /// One binder per parameter marker, in text order.
    pub binders: Vec<Binder>,
    pub affected_tables: BTreeSet<String>,
}

/// How literal values in the statement tree are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralRendering {
    /// Inline, formatted by the dialect.
    #[default]
    AsLiteral,
    /// Always bound as parameters.
    AsParam,
    /// Bound as parameters, except in the select list.
    AsParamOutsideSelect,
}

/// Session-level rendering options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateOptions {
    #[serde(default)]
    pub literal_rendering: LiteralRendering,
}

/// Trait for converting statement nodes to SQL.
pub trait ToSql {
    /// Compile against the ANSI dialect with default options.
    fn to_sql(&self) -> TranslateResult<CompiledStatement> {
        self.to_sql_with_dialect(Dialect::default())
    }

    /// Compile against one of the built-in dialects with default options.
    fn to_sql_with_dialect(&self, dialect: Dialect) -> TranslateResult<CompiledStatement> {
        self.compile(&dialect.descriptor(), TranslateOptions::default())
    }

    fn compile(&self, dialect: &DialectDescriptor, options: TranslateOptions) -> TranslateResult<CompiledStatement>;
}

impl ToSql for Statement {
    fn compile(&self, dialect: &DialectDescriptor, options: TranslateOptions) -> TranslateResult<CompiledStatement> {
        translate(self, dialect, options)
    }
}

impl ToSql for QueryPart {
    fn compile(&self, dialect: &DialectDescriptor, options: TranslateOptions) -> TranslateResult<CompiledStatement> {
        translate(&Statement::Select(self.clone()), dialect, options)
    }
}

/// Translate one statement with a fresh translator.
pub fn translate(
    statement: &Statement,
    dialect: &DialectDescriptor,
    options: TranslateOptions,
) -> TranslateResult<CompiledStatement> {
    SqlTranslator::new(dialect, options).translate(statement)
}

/// Render the insert-or-update of an optional table row.
pub fn translate_upsert(
    update: &OptionalTableUpdate,
    dialect: &DialectDescriptor,
    options: TranslateOptions,
) -> TranslateResult<MutationOperation> {
    dml::render_upsert(update, dialect, options)
}
