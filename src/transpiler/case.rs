//! CASE expression strategies: ANSI `CASE`, Oracle `DECODE`, MySQL nested `IF`.

use super::dialect::CaseStrategy;
use super::translator::SqlTranslator;
use crate::ast::*;
use crate::error::TranslateResult;

impl SqlTranslator<'_> {
    pub(crate) fn render_searched_case(
        &mut self,
        whens: &[(Predicate, Expr)],
        otherwise: Option<&Expr>,
    ) -> TranslateResult<()> {
        match self.dialect.case_strategy {
            CaseStrategy::Ansi => self.render_ansi_searched_case(whens, otherwise),
            CaseStrategy::Decode => match decode_fixture(whens) {
                Some(fixture) => {
                    let arms: Vec<(Option<&Expr>, &Expr)> = whens
                        .iter()
                        .map(|(p, r)| (decode_search_value(p), r))
                        .collect();
                    self.render_decode(fixture, &arms, otherwise)
                }
                None => self.render_ansi_searched_case(whens, otherwise),
            },
            CaseStrategy::If => self.render_if_chain(whens, otherwise),
        }
    }

    pub(crate) fn render_simple_case(
        &mut self,
        fixture: &Expr,
        whens: &[(Expr, Expr)],
        otherwise: Option<&Expr>,
    ) -> TranslateResult<()> {
        match self.dialect.case_strategy {
            CaseStrategy::Ansi => self.render_ansi_simple_case(fixture, whens, otherwise),
            CaseStrategy::Decode if whens.iter().all(|(value, _)| is_decode_search_value(value)) => {
                let arms: Vec<(Option<&Expr>, &Expr)> = whens.iter().map(|(v, r)| (Some(v), r)).collect();
                self.render_decode(fixture, &arms, otherwise)
            }
            CaseStrategy::Decode => self.render_ansi_simple_case(fixture, whens, otherwise),
            CaseStrategy::If => {
                let searched: Vec<(Predicate, Expr)> = whens
                    .iter()
                    .map(|(value, result)| (Predicate::equal(fixture.clone(), value.clone()), result.clone()))
                    .collect();
                self.render_if_chain(&searched, otherwise)
            }
        }
    }

    fn render_ansi_simple_case(
        &mut self,
        fixture: &Expr,
        whens: &[(Expr, Expr)],
        otherwise: Option<&Expr>,
    ) -> TranslateResult<()> {
        self.push("CASE ");
        self.render_expr(fixture)?;
        for (value, result) in whens {
            self.push(" WHEN ");
            self.render_expr(value)?;
            self.push(" THEN ");
            self.render_expr(result)?;
        }
        self.render_case_else(otherwise)
    }

    fn render_ansi_searched_case(
        &mut self,
        whens: &[(Predicate, Expr)],
        otherwise: Option<&Expr>,
    ) -> TranslateResult<()> {
        self.push("CASE");
        for (predicate, result) in whens {
            self.push(" WHEN ");
            self.render_predicate(predicate)?;
            self.push(" THEN ");
            self.render_expr(result)?;
        }
        self.render_case_else(otherwise)
    }

    fn render_case_else(&mut self, otherwise: Option<&Expr>) -> TranslateResult<()> {
        if let Some(otherwise) = otherwise {
            self.push(" ELSE ");
            self.render_expr(otherwise)?;
        }
        self.push(" END");
        Ok(())
    }

    /// `DECODE(f, v1, r1, .., else)`; a `None` search value matches null.
    fn render_decode(
        &mut self,
        fixture: &Expr,
        arms: &[(Option<&Expr>, &Expr)],
        otherwise: Option<&Expr>,
    ) -> TranslateResult<()> {
        self.push("DECODE(");
        self.render_expr(fixture)?;
        for (value, result) in arms {
            self.push(", ");
            match value {
                Some(value) => self.render_expr(value)?,
                None => self.push("NULL"),
            }
            self.push(", ");
            self.render_expr(result)?;
        }
        if let Some(otherwise) = otherwise {
            self.push(", ");
            self.render_expr(otherwise)?;
        }
        self.push(")");
        Ok(())
    }

    /// `IF(p1, r1, IF(p2, r2, else))`
    fn render_if_chain(&mut self, whens: &[(Predicate, Expr)], otherwise: Option<&Expr>) -> TranslateResult<()> {
        let Some(((predicate, result), rest)) = whens.split_first() else {
            return match otherwise {
                Some(otherwise) => self.render_expr(otherwise),
                None => {
                    self.push("NULL");
                    Ok(())
                }
            };
        };
        self.push("IF(");
        self.render_predicate(predicate)?;
        self.push(", ");
        self.render_expr(result)?;
        self.push(", ");
        self.render_if_chain(rest, otherwise)?;
        self.push(")");
        Ok(())
    }
}

/// The shared operand when every branch tests it with `IS NULL` or `=` against
/// a non-null literal.
fn decode_fixture(whens: &[(Predicate, Expr)]) -> Option<&Expr> {
    let mut fixture: Option<&Expr> = None;
    for (predicate, _) in whens {
        let operand = match predicate {
            Predicate::Nullness { expr, negated: false } => expr,
            Predicate::Comparison {
                left,
                op: ComparisonOp::Eq,
                right,
            } if is_decode_search_value(right) => left,
            _ => return None,
        };
        match fixture {
            None => fixture = Some(operand),
            Some(existing) if existing == operand => {}
            Some(_) => return None,
        }
    }
    fixture
}

/// `DECODE` matches null against null, `=` never does; only non-null
/// literals compare the same both ways.
fn is_decode_search_value(expr: &Expr) -> bool {
    matches!(expr, Expr::Literal { value, .. } if !value.is_null())
}

fn decode_search_value(predicate: &Predicate) -> Option<&Expr> {
    match predicate {
        Predicate::Comparison { right, .. } => Some(right),
        _ => None,
    }
}
