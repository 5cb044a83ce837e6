//! INSERT statements.

use crate::ast::{InsertSource, InsertStatement};
use crate::error::{TranslateError, TranslateResult};
use crate::transpiler::clause::Clause;
use crate::transpiler::translator::SqlTranslator;

/// `INSERT INTO t (a, b) VALUES (..), (..)` or `INSERT INTO t (a, b) SELECT ..`.
pub(crate) fn render_insert(t: &mut SqlTranslator<'_>, insert: &InsertStatement) -> TranslateResult<()> {
    let table = insert
        .target
        .table_name()
        .ok_or_else(|| TranslateError::structural("insert target must be a named table"))?;
    t.add_affected_table(table);

    t.push("INSERT INTO ");
    t.push(table);
    if !insert.columns.is_empty() {
        t.push(" (");
        t.push(&insert.columns.join(", "));
        t.push(")");
    }

    match &insert.source {
        InsertSource::Values(rows) => {
            if rows.is_empty() {
                return Err(TranslateError::structural("insert without rows"));
            }
            if let Some(row) = rows
                .iter()
                .find(|row| !insert.columns.is_empty() && row.len() != insert.columns.len())
            {
                return Err(TranslateError::structural(format!(
                    "insert row has {} values for {} columns",
                    row.len(),
                    insert.columns.len()
                )));
            }
            if rows.len() > 1 && !t.dialect.supports_values_list {
                t.push(" ");
                t.with_clause(Clause::Insert, |t| t.render_rows_as_selects(rows, &[]))
            } else {
                t.push(" VALUES ");
                t.with_clause(Clause::Values, |t| t.render_value_rows(rows))
            }
        }
        InsertSource::Query(query) => {
            t.push(" ");
            t.with_clause(Clause::Insert, |t| t.render_query_part(query))
        }
    }
}
