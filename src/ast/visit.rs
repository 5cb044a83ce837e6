//! Read-only and mutable traversal of the statement tree.
//!
//! Each `visit_*` method defaults to the matching `walk_*` function, so an
//! implementation overrides only the nodes it cares about and calls back into
//! `walk_*` to keep descending. Read-only visitors stop early by returning
//! [`ControlFlow::Break`].

use std::ops::ControlFlow;

use super::expr::{ColumnReference, Expr};
use super::from::{FromClause, TableGroup, TableReference, TableSource};
use super::predicate::Predicate;
use super::query::{QueryGroup, QueryPart, QuerySpec};
use super::statement::{InsertSource, Statement};

pub trait Visit<'ast> {
    type Break;

    fn visit_statement(&mut self, stmt: &'ast Statement) -> ControlFlow<Self::Break> {
        walk_statement(self, stmt)
    }

    fn visit_query_part(&mut self, part: &'ast QueryPart) -> ControlFlow<Self::Break> {
        walk_query_part(self, part)
    }

    fn visit_query_spec(&mut self, spec: &'ast QuerySpec) -> ControlFlow<Self::Break> {
        walk_query_spec(self, spec)
    }

    fn visit_table_group(&mut self, group: &'ast TableGroup) -> ControlFlow<Self::Break> {
        walk_table_group(self, group)
    }

    fn visit_table_reference(&mut self, reference: &'ast TableReference) -> ControlFlow<Self::Break> {
        walk_table_reference(self, reference)
    }

    fn visit_predicate(&mut self, predicate: &'ast Predicate) -> ControlFlow<Self::Break> {
        walk_predicate(self, predicate)
    }

    fn visit_expr(&mut self, expr: &'ast Expr) -> ControlFlow<Self::Break> {
        walk_expr(self, expr)
    }

    fn visit_column(&mut self, _column: &'ast ColumnReference) -> ControlFlow<Self::Break> {
        ControlFlow::Continue(())
    }
}

pub fn walk_statement<'ast, V: Visit<'ast> + ?Sized>(
    v: &mut V,
    stmt: &'ast Statement,
) -> ControlFlow<V::Break> {
    match stmt {
        Statement::Select(part) => v.visit_query_part(part),
        Statement::Insert(insert) => {
            v.visit_table_reference(&insert.target)?;
            match &insert.source {
                InsertSource::Values(rows) => {
                    for expr in rows.iter().flatten() {
                        v.visit_expr(expr)?;
                    }
                    ControlFlow::Continue(())
                }
                InsertSource::Query(part) => v.visit_query_part(part),
            }
        }
        Statement::Update(update) => {
            v.visit_table_reference(&update.target)?;
            for assignment in &update.assignments {
                for column in &assignment.columns {
                    v.visit_column(column)?;
                }
                v.visit_expr(&assignment.value)?;
            }
            if let Some(restriction) = &update.restriction {
                v.visit_predicate(restriction)?;
            }
            ControlFlow::Continue(())
        }
        Statement::Delete(delete) => {
            v.visit_table_reference(&delete.target)?;
            if let Some(restriction) = &delete.restriction {
                v.visit_predicate(restriction)?;
            }
            ControlFlow::Continue(())
        }
    }
}

pub fn walk_query_part<'ast, V: Visit<'ast> + ?Sized>(
    v: &mut V,
    part: &'ast QueryPart,
) -> ControlFlow<V::Break> {
    match part {
        QueryPart::Spec(spec) => v.visit_query_spec(spec),
        QueryPart::Group(group) => walk_query_group(v, group),
    }
}

pub fn walk_query_group<'ast, V: Visit<'ast> + ?Sized>(
    v: &mut V,
    group: &'ast QueryGroup,
) -> ControlFlow<V::Break> {
    for part in &group.parts {
        v.visit_query_part(part)?;
    }
    for sort in &group.sort {
        v.visit_expr(&sort.expr)?;
    }
    walk_opt_expr(v, group.offset.as_ref())?;
    walk_opt_expr(v, group.fetch.as_ref())
}

pub fn walk_query_spec<'ast, V: Visit<'ast> + ?Sized>(
    v: &mut V,
    spec: &'ast QuerySpec,
) -> ControlFlow<V::Break> {
    for selection in &spec.select.selections {
        v.visit_expr(&selection.expr)?;
    }
    walk_from_clause(v, &spec.from)?;
    if let Some(restriction) = &spec.restriction {
        v.visit_predicate(restriction)?;
    }
    for expr in &spec.group_by {
        v.visit_expr(expr)?;
    }
    if let Some(having) = &spec.having {
        v.visit_predicate(having)?;
    }
    for sort in &spec.sort {
        v.visit_expr(&sort.expr)?;
    }
    walk_opt_expr(v, spec.offset.as_ref())?;
    walk_opt_expr(v, spec.fetch.as_ref())
}

pub fn walk_from_clause<'ast, V: Visit<'ast> + ?Sized>(
    v: &mut V,
    from: &'ast FromClause,
) -> ControlFlow<V::Break> {
    for root in &from.roots {
        v.visit_table_group(root)?;
    }
    ControlFlow::Continue(())
}

pub fn walk_table_group<'ast, V: Visit<'ast> + ?Sized>(
    v: &mut V,
    group: &'ast TableGroup,
) -> ControlFlow<V::Break> {
    v.visit_table_reference(&group.primary)?;
    for join in &group.reference_joins {
        v.visit_table_reference(&join.reference)?;
        if let Some(predicate) = &join.predicate {
            v.visit_predicate(predicate)?;
        }
    }
    for join in group.nested_joins.iter().chain(&group.joins) {
        v.visit_table_group(&join.group)?;
        if let Some(predicate) = &join.predicate {
            v.visit_predicate(predicate)?;
        }
    }
    ControlFlow::Continue(())
}

pub fn walk_table_reference<'ast, V: Visit<'ast> + ?Sized>(
    v: &mut V,
    reference: &'ast TableReference,
) -> ControlFlow<V::Break> {
    match &reference.source {
        TableSource::Named { .. } => ControlFlow::Continue(()),
        TableSource::Query { query, .. } => v.visit_query_part(query),
        TableSource::Function { args, .. } => {
            for arg in args {
                v.visit_expr(arg)?;
            }
            ControlFlow::Continue(())
        }
        TableSource::Values { rows, .. } => {
            for expr in rows.iter().flatten() {
                v.visit_expr(expr)?;
            }
            ControlFlow::Continue(())
        }
    }
}

pub fn walk_predicate<'ast, V: Visit<'ast> + ?Sized>(
    v: &mut V,
    predicate: &'ast Predicate,
) -> ControlFlow<V::Break> {
    match predicate {
        Predicate::Comparison { left, right, .. } => {
            v.visit_expr(left)?;
            v.visit_expr(right)
        }
        Predicate::Junction { predicates, .. } => {
            for p in predicates {
                v.visit_predicate(p)?;
            }
            ControlFlow::Continue(())
        }
        Predicate::Negated(inner) | Predicate::Grouped(inner) => v.visit_predicate(inner),
        Predicate::Nullness { expr, .. } | Predicate::BooleanExpr(expr) => v.visit_expr(expr),
        Predicate::Between {
            expr, low, high, ..
        } => {
            v.visit_expr(expr)?;
            v.visit_expr(low)?;
            v.visit_expr(high)
        }
        Predicate::InList { expr, list, .. } => {
            v.visit_expr(expr)?;
            for item in list {
                v.visit_expr(item)?;
            }
            ControlFlow::Continue(())
        }
        Predicate::InSubquery { expr, query, .. } => {
            v.visit_expr(expr)?;
            v.visit_query_part(query)
        }
        Predicate::Exists { query, .. } => v.visit_query_part(query),
        Predicate::Like {
            expr,
            pattern,
            escape,
            ..
        } => {
            v.visit_expr(expr)?;
            v.visit_expr(pattern)?;
            walk_opt_expr(v, escape.as_ref())
        }
    }
}

pub fn walk_expr<'ast, V: Visit<'ast> + ?Sized>(
    v: &mut V,
    expr: &'ast Expr,
) -> ControlFlow<V::Break> {
    match expr {
        Expr::Column(column) => v.visit_column(column),
        Expr::Literal { .. }
        | Expr::Parameter(_)
        | Expr::CountStar { .. }
        | Expr::SelectionRef(_) => ControlFlow::Continue(()),
        Expr::Tuple(items) | Expr::Function { args: items, .. } => {
            for item in items {
                v.visit_expr(item)?;
            }
            ControlFlow::Continue(())
        }
        Expr::Binary { left, right, .. } => {
            v.visit_expr(left)?;
            v.visit_expr(right)
        }
        Expr::Unary { operand, .. } => v.visit_expr(operand),
        Expr::CaseSearched { whens, otherwise } => {
            for (when, then) in whens {
                v.visit_predicate(when)?;
                v.visit_expr(then)?;
            }
            walk_opt_expr(v, otherwise.as_deref())
        }
        Expr::CaseSimple {
            fixture,
            whens,
            otherwise,
        } => {
            v.visit_expr(fixture)?;
            for (when, then) in whens {
                v.visit_expr(when)?;
                v.visit_expr(then)?;
            }
            walk_opt_expr(v, otherwise.as_deref())
        }
        Expr::Cast { expr, .. } => v.visit_expr(expr),
        Expr::Subquery(query) => v.visit_query_part(query),
    }
}

fn walk_opt_expr<'ast, V: Visit<'ast> + ?Sized>(
    v: &mut V,
    expr: Option<&'ast Expr>,
) -> ControlFlow<V::Break> {
    match expr {
        Some(expr) => v.visit_expr(expr),
        None => ControlFlow::Continue(()),
    }
}

/// A node that can be handed to a [`Visit`] implementation.
pub trait Visitable {
    fn accept<'ast, V: Visit<'ast> + ?Sized>(&'ast self, v: &mut V) -> ControlFlow<V::Break>;

    /// Number of query specifications that enclose this node's own level:
    /// 1 for queries, 0 for mutations and loose predicates.
    fn query_level(&self) -> usize {
        0
    }
}

impl Visitable for Statement {
    fn accept<'ast, V: Visit<'ast> + ?Sized>(&'ast self, v: &mut V) -> ControlFlow<V::Break> {
        v.visit_statement(self)
    }

    fn query_level(&self) -> usize {
        match self {
            Statement::Select(_) => 1,
            _ => 0,
        }
    }
}

impl Visitable for QueryPart {
    fn accept<'ast, V: Visit<'ast> + ?Sized>(&'ast self, v: &mut V) -> ControlFlow<V::Break> {
        v.visit_query_part(self)
    }

    fn query_level(&self) -> usize {
        1
    }
}

impl Visitable for QuerySpec {
    fn accept<'ast, V: Visit<'ast> + ?Sized>(&'ast self, v: &mut V) -> ControlFlow<V::Break> {
        v.visit_query_spec(self)
    }

    fn query_level(&self) -> usize {
        1
    }
}

impl Visitable for Predicate {
    fn accept<'ast, V: Visit<'ast> + ?Sized>(&'ast self, v: &mut V) -> ControlFlow<V::Break> {
        v.visit_predicate(self)
    }
}

impl Visitable for Expr {
    fn accept<'ast, V: Visit<'ast> + ?Sized>(&'ast self, v: &mut V) -> ControlFlow<V::Break> {
        v.visit_expr(self)
    }
}

/// Mutable traversal, used for rewrites that fill in missing information.
pub trait VisitMut {
    fn visit_statement_mut(&mut self, stmt: &mut Statement) {
        walk_statement_mut(self, stmt)
    }

    fn visit_query_part_mut(&mut self, part: &mut QueryPart) {
        walk_query_part_mut(self, part)
    }

    fn visit_table_group_mut(&mut self, group: &mut TableGroup) {
        walk_table_group_mut(self, group)
    }

    fn visit_table_reference_mut(&mut self, reference: &mut TableReference) {
        walk_table_reference_mut(self, reference)
    }

    fn visit_predicate_mut(&mut self, predicate: &mut Predicate) {
        walk_predicate_mut(self, predicate)
    }

    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        walk_expr_mut(self, expr)
    }
}

pub fn walk_statement_mut<V: VisitMut + ?Sized>(v: &mut V, stmt: &mut Statement) {
    match stmt {
        Statement::Select(part) => v.visit_query_part_mut(part),
        Statement::Insert(insert) => {
            v.visit_table_reference_mut(&mut insert.target);
            match &mut insert.source {
                InsertSource::Values(rows) => rows
                    .iter_mut()
                    .flatten()
                    .for_each(|expr| v.visit_expr_mut(expr)),
                InsertSource::Query(part) => v.visit_query_part_mut(part),
            }
        }
        Statement::Update(update) => {
            v.visit_table_reference_mut(&mut update.target);
            for assignment in &mut update.assignments {
                v.visit_expr_mut(&mut assignment.value);
            }
            if let Some(restriction) = &mut update.restriction {
                v.visit_predicate_mut(restriction);
            }
        }
        Statement::Delete(delete) => {
            v.visit_table_reference_mut(&mut delete.target);
            if let Some(restriction) = &mut delete.restriction {
                v.visit_predicate_mut(restriction);
            }
        }
    }
}

pub fn walk_query_part_mut<V: VisitMut + ?Sized>(v: &mut V, part: &mut QueryPart) {
    match part {
        QueryPart::Spec(spec) => {
            // From clause first: aliases must exist before the select list
            // that refers to them.
            for root in &mut spec.from.roots {
                v.visit_table_group_mut(root);
            }
            for selection in &mut spec.select.selections {
                v.visit_expr_mut(&mut selection.expr);
            }
            if let Some(restriction) = &mut spec.restriction {
                v.visit_predicate_mut(restriction);
            }
            for expr in &mut spec.group_by {
                v.visit_expr_mut(expr);
            }
            if let Some(having) = &mut spec.having {
                v.visit_predicate_mut(having);
            }
            for sort in &mut spec.sort {
                v.visit_expr_mut(&mut sort.expr);
            }
        }
        QueryPart::Group(group) => {
            for part in &mut group.parts {
                v.visit_query_part_mut(part);
            }
            for sort in &mut group.sort {
                v.visit_expr_mut(&mut sort.expr);
            }
        }
    }
}

pub fn walk_table_group_mut<V: VisitMut + ?Sized>(v: &mut V, group: &mut TableGroup) {
    v.visit_table_reference_mut(&mut group.primary);
    for join in &mut group.reference_joins {
        v.visit_table_reference_mut(&mut join.reference);
        if let Some(predicate) = &mut join.predicate {
            v.visit_predicate_mut(predicate);
        }
    }
    for join in group.nested_joins.iter_mut().chain(group.joins.iter_mut()) {
        v.visit_table_group_mut(&mut join.group);
        if let Some(predicate) = &mut join.predicate {
            v.visit_predicate_mut(predicate);
        }
    }
}

pub fn walk_table_reference_mut<V: VisitMut + ?Sized>(v: &mut V, reference: &mut TableReference) {
    match &mut reference.source {
        TableSource::Named { .. } => {}
        TableSource::Query { query, .. } => v.visit_query_part_mut(query),
        TableSource::Function { args, .. } => args.iter_mut().for_each(|a| v.visit_expr_mut(a)),
        TableSource::Values { rows, .. } => rows
            .iter_mut()
            .flatten()
            .for_each(|expr| v.visit_expr_mut(expr)),
    }
}

pub fn walk_predicate_mut<V: VisitMut + ?Sized>(v: &mut V, predicate: &mut Predicate) {
    match predicate {
        Predicate::Comparison { left, right, .. } => {
            v.visit_expr_mut(left);
            v.visit_expr_mut(right);
        }
        Predicate::Junction { predicates, .. } => {
            predicates.iter_mut().for_each(|p| v.visit_predicate_mut(p))
        }
        Predicate::Negated(inner) | Predicate::Grouped(inner) => v.visit_predicate_mut(inner),
        Predicate::Nullness { expr, .. } | Predicate::BooleanExpr(expr) => v.visit_expr_mut(expr),
        Predicate::Between {
            expr, low, high, ..
        } => {
            v.visit_expr_mut(expr);
            v.visit_expr_mut(low);
            v.visit_expr_mut(high);
        }
        Predicate::InList { expr, list, .. } => {
            v.visit_expr_mut(expr);
            list.iter_mut().for_each(|item| v.visit_expr_mut(item));
        }
        Predicate::InSubquery { expr, query, .. } => {
            v.visit_expr_mut(expr);
            v.visit_query_part_mut(query);
        }
        Predicate::Exists { query, .. } => v.visit_query_part_mut(query),
        Predicate::Like {
            expr,
            pattern,
            escape,
            ..
        } => {
            v.visit_expr_mut(expr);
            v.visit_expr_mut(pattern);
            if let Some(escape) = escape {
                v.visit_expr_mut(escape);
            }
        }
    }
}

pub fn walk_expr_mut<V: VisitMut + ?Sized>(v: &mut V, expr: &mut Expr) {
    match expr {
        Expr::Column(_)
        | Expr::Literal { .. }
        | Expr::Parameter(_)
        | Expr::CountStar { .. }
        | Expr::SelectionRef(_) => {}
        Expr::Tuple(items) | Expr::Function { args: items, .. } => {
            items.iter_mut().for_each(|item| v.visit_expr_mut(item))
        }
        Expr::Binary { left, right, .. } => {
            v.visit_expr_mut(left);
            v.visit_expr_mut(right);
        }
        Expr::Unary { operand, .. } => v.visit_expr_mut(operand),
        Expr::CaseSearched { whens, otherwise } => {
            for (when, then) in whens {
                v.visit_predicate_mut(when);
                v.visit_expr_mut(then);
            }
            if let Some(otherwise) = otherwise {
                v.visit_expr_mut(otherwise);
            }
        }
        Expr::CaseSimple {
            fixture,
            whens,
            otherwise,
        } => {
            v.visit_expr_mut(fixture);
            for (when, then) in whens {
                v.visit_expr_mut(when);
                v.visit_expr_mut(then);
            }
            if let Some(otherwise) = otherwise {
                v.visit_expr_mut(otherwise);
            }
        }
        Expr::Cast { expr, .. } => v.visit_expr_mut(expr),
        Expr::Subquery(query) => v.visit_query_part_mut(query),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::*;

    struct ColumnCounter(usize);

    impl<'ast> Visit<'ast> for ColumnCounter {
        type Break = ();

        fn visit_column(&mut self, _column: &'ast ColumnReference) -> ControlFlow<()> {
            self.0 += 1;
            ControlFlow::Continue(())
        }
    }

    #[test]
    fn test_walk_reaches_subqueries() {
        let inner = select(vec![Expr::literal(1)])
            .from(table("b", "b1_0"))
            .filter(Predicate::equal(col("b1_0", "x"), col("a1_0", "y")))
            .build();
        let outer = select(vec![col("a1_0", "id")])
            .from(table("a", "a1_0"))
            .filter(Predicate::exists(inner))
            .build();

        let mut counter = ColumnCounter(0);
        let _ = counter.visit_query_part(&outer);
        assert_eq!(counter.0, 3);
    }
}
