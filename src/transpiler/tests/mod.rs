//! Translator test modules.
//!
//! Tests are organized by category:
//! - `core`: SELECT shapes, joins, predicates, DML on the ANSI dialect
//! - `dialects`: dialect-specific spelling and capability fallbacks
//! - `full_join`: FULL JOIN emulation
//! - `upsert`: MERGE / ON CONFLICT / update-or-insert synthesis

mod dialects;
mod full_join;
mod upsert;

use crate::ast::builders::*;
use crate::ast::*;

/// `SELECT p.id FROM person AS p`
fn person_ids() -> QueryBuilder {
    select(vec![col("p", "id")]).from(table("person", "p"))
}

fn owner_of(alias: &str) -> Predicate {
    Predicate::equal(col(alias, "owner_id"), col("p", "id"))
}
