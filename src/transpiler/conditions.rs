//! Predicate rendering.

use super::dialect::BooleanStyle;
use super::translator::SqlTranslator;
use crate::ast::*;
use crate::error::TranslateResult;

impl SqlTranslator<'_> {
    pub(crate) fn render_predicate(&mut self, predicate: &Predicate) -> TranslateResult<()> {
        match predicate {
            Predicate::Comparison { left, op, right } => {
                self.render_expr(left)?;
                self.push(op.sql());
                self.render_expr(right)
            }
            Predicate::Junction { nature, predicates } => {
                let members: Vec<&Predicate> = predicates.iter().filter(|p| !p.is_empty()).collect();
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        self.push(nature.keyword());
                    }
                    let wrap = matches!(member, Predicate::Junction { nature: inner, .. } if inner != nature);
                    if wrap {
                        self.push("(");
                    }
                    self.render_predicate(member)?;
                    if wrap {
                        self.push(")");
                    }
                }
                Ok(())
            }
            Predicate::Negated(inner) => {
                self.push("NOT (");
                self.render_predicate(inner)?;
                self.push(")");
                Ok(())
            }
            Predicate::Grouped(inner) => {
                self.push("(");
                self.render_predicate(inner)?;
                self.push(")");
                Ok(())
            }
            Predicate::Nullness { expr, negated } => {
                let keyword = if *negated { " IS NOT NULL" } else { " IS NULL" };
                if let Expr::Tuple(items) = expr {
                    // Row values compare element-wise.
                    self.push("(");
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            self.push(" AND ");
                        }
                        self.render_expr(item)?;
                        self.push(keyword);
                    }
                    self.push(")");
                    return Ok(());
                }
                self.render_expr(expr)?;
                self.push(keyword);
                Ok(())
            }
            Predicate::Between {
                expr,
                low,
                high,
                negated,
            } => {
                self.render_expr(expr)?;
                self.push(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                self.render_expr(low)?;
                self.push(" AND ");
                self.render_expr(high)
            }
            Predicate::InList {
                expr,
                list,
                negated,
            } => {
                self.render_expr(expr)?;
                self.push(if *negated { " NOT IN (" } else { " IN (" });
                if list.is_empty() {
                    self.push("NULL");
                } else {
                    self.render_expr_list(list)?;
                }
                self.push(")");
                Ok(())
            }
            Predicate::InSubquery {
                expr,
                query,
                negated,
            } => {
                self.render_expr(expr)?;
                self.push(if *negated { " NOT IN " } else { " IN " });
                self.render_nested_query(query)
            }
            Predicate::Exists { query, negated } => {
                self.push(if *negated { "NOT EXISTS " } else { "EXISTS " });
                self.render_nested_query(query)
            }
            Predicate::Like {
                expr,
                pattern,
                escape,
                negated,
                ignore_case,
            } => {
                if *ignore_case {
                    self.push("LOWER(");
                    self.render_expr(expr)?;
                    self.push(")");
                } else {
                    self.render_expr(expr)?;
                }
                self.push(if *negated { " NOT LIKE " } else { " LIKE " });
                if *ignore_case {
                    self.push("LOWER(");
                    self.render_expr(pattern)?;
                    self.push(")");
                } else {
                    self.render_expr(pattern)?;
                }
                if let Some(escape) = escape {
                    self.push(" ESCAPE ");
                    self.render_expr(escape)?;
                }
                Ok(())
            }
            Predicate::BooleanExpr(expr) => {
                self.render_expr(expr)?;
                if self.dialect.boolean_style == BooleanStyle::Numeric {
                    self.push("=1");
                }
                Ok(())
            }
        }
    }

    /// Subquery operand of `IN` / `EXISTS`, always parenthesized.
    pub(crate) fn render_nested_query(&mut self, query: &QueryPart) -> TranslateResult<()> {
        self.query_depth += 1;
        let result = self.render_query_part(query);
        self.query_depth -= 1;
        result
    }
}
