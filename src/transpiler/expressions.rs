//! Expression rendering.

use super::LiteralRendering;
use super::clause::Clause;
use super::translator::SqlTranslator;
use crate::ast::*;
use crate::error::{TranslateError, TranslateResult};

impl SqlTranslator<'_> {
    pub(crate) fn render_expr(&mut self, expr: &Expr) -> TranslateResult<()> {
        match expr {
            Expr::Column(column) => self.render_column(column),
            Expr::Literal { value, sql_type } => {
                self.render_literal(value, *sql_type);
                Ok(())
            }
            Expr::Parameter(binder) => {
                self.render_parameter(binder.clone());
                Ok(())
            }
            Expr::Tuple(items) => {
                let wrap = self.current_clause().is_none_or(|c| c.wraps_tuples());
                if wrap {
                    self.push("(");
                }
                self.render_expr_list(items)?;
                if wrap {
                    self.push(")");
                }
                Ok(())
            }
            Expr::Binary { left, op, right } => {
                self.render_operand(left)?;
                self.push(&op.to_string());
                self.render_operand(right)
            }
            Expr::Unary { op, operand } => {
                self.push(match op {
                    UnaryOp::Plus => "+",
                    UnaryOp::Minus => "-",
                });
                self.render_operand(operand)
            }
            Expr::CaseSearched { whens, otherwise } => {
                self.render_searched_case(whens, otherwise.as_deref())
            }
            Expr::CaseSimple {
                fixture,
                whens,
                otherwise,
            } => self.render_simple_case(fixture, whens, otherwise.as_deref()),
            Expr::Function {
                name,
                args,
                distinct,
            } => {
                self.push(name);
                if args.is_empty() && !distinct {
                    return Ok(());
                }
                self.push("(");
                if *distinct {
                    self.push("DISTINCT ");
                }
                self.render_expr_list(args)?;
                self.push(")");
                Ok(())
            }
            Expr::CountStar { distinct } => {
                if *distinct {
                    return Err(TranslateError::unsupported("count(distinct *)"));
                }
                self.push("COUNT(*)");
                Ok(())
            }
            Expr::Cast { expr, target } => {
                self.push("CAST(");
                self.render_expr(expr)?;
                self.push(" AS ");
                let type_name = self.dialect.cast_type_name(target);
                self.push(&type_name);
                self.push(")");
                Ok(())
            }
            Expr::Subquery(query) => self.render_nested_query(query),
            Expr::SelectionRef(position) => match self.current_clause() {
                Some(Clause::OrderBy | Clause::GroupBy) => {
                    self.push(&position.to_string());
                    Ok(())
                }
                clause => Err(TranslateError::structural(format!(
                    "selection reference {} outside ORDER BY / GROUP BY (in {:?})",
                    position, clause
                ))),
            },
        }
    }

    /// Comma separated list.
    pub(crate) fn render_expr_list(&mut self, exprs: &[Expr]) -> TranslateResult<()> {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.render_expr(expr)?;
        }
        Ok(())
    }

    fn render_operand(&mut self, expr: &Expr) -> TranslateResult<()> {
        if matches!(expr, Expr::Binary { .. }) {
            self.push("(");
            self.render_expr(expr)?;
            self.push(")");
            Ok(())
        } else {
            self.render_expr(expr)
        }
    }

    fn render_column(&mut self, column: &ColumnReference) -> TranslateResult<()> {
        if column.formula {
            self.push(&column.column);
            return Ok(());
        }
        let qualifier = match &column.qualifier {
            Some(qualifier) => self.resolve_qualifier(qualifier)?,
            None => None,
        };
        if let Some(qualifier) = qualifier {
            self.push(&qualifier);
            self.push(".");
        }
        self.push(&column.column);
        Ok(())
    }

    fn render_literal(&mut self, value: &Value, sql_type: Option<SqlType>) {
        let bind = match self.options.literal_rendering {
            LiteralRendering::AsLiteral => false,
            LiteralRendering::AsParam => true,
            LiteralRendering::AsParamOutsideSelect => self.current_clause() != Some(Clause::Select),
        };
        if bind && !value.is_null() {
            self.render_parameter(Binder::Literal {
                value: value.clone(),
                sql_type: sql_type.or_else(|| value.sql_type()),
            });
        } else {
            let literal = self.dialect.format_literal(value);
            self.push(&literal);
        }
    }

    fn render_parameter(&mut self, binder: Binder) {
        let cast = self.current_clause() == Some(Clause::Select)
            && self.dialect.requires_parameter_cast_in_select;
        match binder.sql_type().copied().filter(|_| cast) {
            Some(sql_type) => {
                self.push("CAST(");
                self.add_binder(binder);
                self.push(" AS ");
                let type_name = self.dialect.cast_type_name(&sql_type);
                self.push(&type_name);
                self.push(")");
            }
            None => self.add_binder(binder),
        }
    }
}
