//! UPDATE statements.

use crate::ast::{Assignment, Statement, UpdateStatement};
use crate::error::{TranslateError, TranslateResult};
use crate::transpiler::clause::Clause;
use crate::transpiler::translator::SqlTranslator;

pub(crate) fn render_update(
    t: &mut SqlTranslator<'_>,
    update: &UpdateStatement,
    statement: &Statement,
) -> TranslateResult<()> {
    if update.assignments.is_empty() {
        return Err(TranslateError::structural("update without assignments"));
    }
    let alias = t.prepare_mutation_target(&update.target, statement)?;

    t.push("UPDATE ");
    t.push(update.target.table_name().unwrap_or_default());
    if let Some(alias) = alias {
        let dialect = t.dialect;
        t.push(&dialect.table_alias_separator);
        t.push(&alias);
    }

    t.push(" SET ");
    t.with_clause(Clause::Set, |t| {
        for (i, assignment) in update.assignments.iter().enumerate() {
            if i > 0 {
                t.push(", ");
            }
            t.render_assignment(assignment)?;
        }
        Ok(())
    })?;

    if let Some(restriction) = update.restriction.as_ref().filter(|p| !p.is_empty()) {
        t.push(" WHERE ");
        t.with_clause(Clause::Where, |t| t.render_predicate(restriction))?;
    }
    Ok(())
}

impl SqlTranslator<'_> {
    /// `x=?` or `(x, y)=(?, ?)`; target columns are never qualified.
    pub(crate) fn render_assignment(&mut self, assignment: &Assignment) -> TranslateResult<()> {
        if self.current_clause() != Some(Clause::Set) {
            return Err(TranslateError::structural(format!(
                "assignment outside SET (in {:?})",
                self.current_clause()
            )));
        }
        let names: Vec<&str> = assignment.columns.iter().map(|c| c.column.as_str()).collect();
        match names.as_slice() {
            [] => return Err(TranslateError::structural("assignment without target columns")),
            [single] => self.push(single),
            many => {
                self.push("(");
                self.push(&many.join(", "));
                self.push(")");
            }
        }
        self.push("=");
        self.render_expr(&assignment.value)
    }
}
