//! SELECT statements.

use crate::ast::QueryPart;
use crate::error::TranslateResult;
use crate::transpiler::translator::SqlTranslator;

/// A top-level query renders without surrounding parentheses.
pub(crate) fn render_select(t: &mut SqlTranslator<'_>, query: &QueryPart) -> TranslateResult<()> {
    t.render_query_part(query)
}
