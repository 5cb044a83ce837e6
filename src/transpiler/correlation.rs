//! Read-only checks for subqueries that reference enclosing aliases.
//!
//! Columns qualified by a navigable path count as references to the alias of
//! the innermost enclosing table group registered for that path.

use std::ops::ControlFlow;

use crate::ast::visit::{self, Visit, Visitable};
use crate::ast::{ColumnReference, FromClause, NavigablePath, QuerySpec, Qualifier, Statement, TableGroup};

/// Aliases and table groups one query level introduces.
#[derive(Default)]
struct Scope<'ast> {
    aliases: Vec<&'ast str>,
    groups: Vec<&'ast TableGroup>,
}

impl<'ast> Scope<'ast> {
    fn of(from: &'ast FromClause) -> Self {
        fn walk<'ast>(group: &'ast TableGroup, scope: &mut Scope<'ast>) {
            scope.aliases.extend(group.aliases());
            scope.groups.push(group);
            for join in group.nested_joins.iter().chain(&group.joins) {
                walk(&join.group, scope);
            }
        }
        let mut scope = Scope::default();
        for root in &from.roots {
            walk(root, &mut scope);
        }
        scope
    }

    fn group_at(&self, path: &NavigablePath) -> Option<&'ast TableGroup> {
        self.groups
            .iter()
            .copied()
            .find(|group| group.navigable_path.as_ref() == Some(path))
    }

    fn introduces(&self, qualifier: &Qualifier) -> bool {
        match qualifier {
            Qualifier::Alias(alias) => self.aliases.contains(&alias.as_str()),
            Qualifier::Path { path, .. } => self.group_at(path).is_some(),
        }
    }
}

/// Alias a path-qualified column renders with, `None` when the group or
/// the named table has no alias.
fn path_alias<'ast>(group: &'ast TableGroup, table: Option<&str>) -> Option<&'ast str> {
    match table {
        None => group.alias(),
        Some(table) => std::iter::once(&group.primary)
            .chain(group.reference_joins.iter().map(|j| &j.reference))
            .find(|r| r.table_name() == Some(table))
            .and_then(|r| r.alias()),
    }
}

struct CorrelationVisitor<'a, 'ast> {
    alias: &'a str,
    base: usize,
    scopes: Vec<Scope<'ast>>,
}

impl CorrelationVisitor<'_, '_> {
    fn references_alias(&self, column: &ColumnReference) -> bool {
        match &column.qualifier {
            Some(Qualifier::Alias(alias)) => alias == self.alias,
            Some(Qualifier::Path { path, table }) => self
                .scopes
                .iter()
                .rev()
                .find_map(|scope| scope.group_at(path))
                .and_then(|group| path_alias(group, table.as_deref()))
                == Some(self.alias),
            None => false,
        }
    }
}

impl<'ast> Visit<'ast> for CorrelationVisitor<'_, 'ast> {
    type Break = ();

    fn visit_query_spec(&mut self, spec: &'ast QuerySpec) -> ControlFlow<()> {
        self.scopes.push(Scope::of(&spec.from));
        visit::walk_query_spec(self, spec)?;
        self.scopes.pop();
        ControlFlow::Continue(())
    }

    fn visit_column(&mut self, column: &'ast ColumnReference) -> ControlFlow<()> {
        if self.scopes.len() > self.base && self.references_alias(column) {
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }
}

/// Whether a query nested inside `node` references `alias`.
///
/// References at `node`'s own level do not count. Traversal stops at the
/// first correlated reference.
///
/// # Panics
///
/// Panics when `alias` is empty.
pub fn is_correlated<N: Visitable + ?Sized>(node: &N, alias: &str) -> bool {
    assert!(!alias.is_empty(), "correlation check requires a target alias");
    let mut visitor = CorrelationVisitor {
        alias,
        base: node.query_level(),
        scopes: Vec::new(),
    };
    node.accept(&mut visitor).is_break()
}

struct NestedCorrelationVisitor<'ast> {
    /// Query levels, outermost first.
    scopes: Vec<Scope<'ast>>,
}

impl NestedCorrelationVisitor<'_> {
    /// 1-based level of the innermost scope introducing `qualifier`.
    fn introduced_at(&self, qualifier: &Qualifier) -> Option<usize> {
        self.scopes
            .iter()
            .rposition(|scope| scope.introduces(qualifier))
            .map(|index| index + 1)
    }
}

impl<'ast> Visit<'ast> for NestedCorrelationVisitor<'ast> {
    type Break = ();

    fn visit_statement(&mut self, stmt: &'ast Statement) -> ControlFlow<()> {
        let target = stmt.target().and_then(|t| t.alias());
        if let Some(alias) = target {
            self.scopes.push(Scope {
                aliases: vec![alias],
                groups: Vec::new(),
            });
        }
        visit::walk_statement(self, stmt)?;
        if target.is_some() {
            self.scopes.pop();
        }
        ControlFlow::Continue(())
    }

    fn visit_query_spec(&mut self, spec: &'ast QuerySpec) -> ControlFlow<()> {
        self.scopes.push(Scope::of(&spec.from));
        visit::walk_query_spec(self, spec)?;
        self.scopes.pop();
        ControlFlow::Continue(())
    }

    fn visit_column(&mut self, column: &'ast ColumnReference) -> ControlFlow<()> {
        let Some(qualifier) = &column.qualifier else {
            return ControlFlow::Continue(());
        };
        match self.introduced_at(qualifier) {
            Some(level) if self.scopes.len() > level + 1 => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    }
}

/// Whether any alias or navigable path is referenced more than one query
/// level below the level that introduces it.
pub fn has_nested_correlation<N: Visitable + ?Sized>(node: &N) -> bool {
    let mut visitor = NestedCorrelationVisitor { scopes: Vec::new() };
    node.accept(&mut visitor).is_break()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::*;
    use crate::ast::{Expr, Predicate, QueryPart};

    fn exists_query(inner_right: Expr) -> QueryPart {
        let inner = select(vec![Expr::literal(1)])
            .from(table("B", "b"))
            .filter(Predicate::equal(col("b", "x"), inner_right))
            .build();
        select(vec![col("a", "id")])
            .from(table("A", "a"))
            .filter(Predicate::exists(inner))
            .build()
    }

    #[test]
    fn test_correlated_subquery() {
        assert!(is_correlated(&exists_query(col("a", "y")), "a"));
    }

    #[test]
    fn test_literal_is_not_correlated() {
        assert!(!is_correlated(&exists_query(Expr::literal(5)), "a"));
    }

    #[test]
    fn test_own_level_reference_is_not_correlation() {
        let query = select(vec![col("a", "id")])
            .from(table("A", "a"))
            .filter(Predicate::equal(col("a", "y"), Expr::literal(1)))
            .build();
        assert!(!is_correlated(&query, "a"));
    }

    #[test]
    fn test_predicate_root_counts_any_subquery() {
        let restriction = Predicate::exists(
            select(vec![Expr::literal(1)])
                .from(table("B", "b"))
                .filter(Predicate::equal(col("b", "x"), col("t", "y")))
                .build(),
        );
        assert!(is_correlated(&restriction, "t"));
        assert!(!is_correlated(&restriction, "b"));
    }

    #[test]
    #[should_panic(expected = "target alias")]
    fn test_empty_alias_is_rejected() {
        is_correlated(&exists_query(col("a", "y")), "");
    }

    #[test]
    fn test_nested_correlation() {
        let innermost = select(vec![Expr::literal(1)])
            .from(table("C", "c"))
            .filter(Predicate::equal(col("c", "z"), col("a", "id")))
            .build();
        let middle = select(vec![Expr::literal(1)])
            .from(table("B", "b"))
            .filter(Predicate::exists(innermost))
            .build();
        let outer = select(vec![col("a", "id")])
            .from(table("A", "a"))
            .filter(Predicate::exists(middle))
            .build();
        assert!(has_nested_correlation(&outer));
        assert!(!has_nested_correlation(&exists_query(col("a", "y"))));
    }

    /// A(at `Person`) -> EXISTS(B -> EXISTS(C where c.x = {Person}.id)).
    fn path_correlated_query() -> QueryPart {
        let person = NavigablePath::new("Person");
        let innermost = select(vec![Expr::literal(1)])
            .from(table("C", "c"))
            .filter(Predicate::equal(
                col("c", "x"),
                Expr::Column(ColumnReference::at_path(person.clone(), "id")),
            ))
            .build();
        let middle = select(vec![Expr::literal(1)])
            .from(table("B", "b"))
            .filter(Predicate::exists(innermost))
            .build();
        select(vec![col("a", "id")])
            .from(table("A", "a").at_path(person))
            .filter(Predicate::exists(middle))
            .build()
    }

    #[test]
    fn test_path_qualified_nested_correlation() {
        let query = path_correlated_query();
        assert!(has_nested_correlation(&query));
        assert!(is_correlated(&query, "a"));
        assert!(!is_correlated(&query, "b"));
    }

    #[test]
    fn test_path_qualified_reference_at_own_level() {
        let person = NavigablePath::new("Person");
        let query = select(vec![Expr::Column(ColumnReference::at_path(person.clone(), "id"))])
            .from(table("A", "a").at_path(person))
            .build();
        assert!(!has_nested_correlation(&query));
        assert!(!is_correlated(&query, "a"));
    }
}
