//! DELETE statements.

use crate::ast::{DeleteStatement, Statement};
use crate::error::TranslateResult;
use crate::transpiler::clause::Clause;
use crate::transpiler::translator::SqlTranslator;

pub(crate) fn render_delete(
    t: &mut SqlTranslator<'_>,
    delete: &DeleteStatement,
    statement: &Statement,
) -> TranslateResult<()> {
    let alias = t.prepare_mutation_target(&delete.target, statement)?;

    t.with_clause(Clause::Delete, |t| {
        t.push("DELETE FROM ");
        t.push(delete.target.table_name().unwrap_or_default());
        if let Some(alias) = alias {
            let dialect = t.dialect;
            t.push(&dialect.table_alias_separator);
            t.push(&alias);
        }
        Ok(())
    })?;

    if let Some(restriction) = delete.restriction.as_ref().filter(|p| !p.is_empty()) {
        t.push(" WHERE ");
        t.with_clause(Clause::Where, |t| t.render_predicate(restriction))?;
    }
    Ok(())
}
