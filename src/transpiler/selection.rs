//! Deduplication of select-list items.

use std::collections::HashMap;

use crate::ast::{ColumnKey, Expr, SelectClause, SqlSelection};

/// Assigns each distinct selected value one stable, 1-based position.
///
/// Column references are identified by their `(qualifier, column)` key; any
/// other expression by structural equality.
#[derive(Debug, Default, Clone)]
pub struct SelectionResolver {
    selections: Vec<SqlSelection>,
    columns: HashMap<ColumnKey, usize>,
    expressions: HashMap<String, Expr>,
}

impl SelectionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver pre-populated with an existing select list, positions kept.
    pub fn from_select(select: &SelectClause) -> Self {
        let mut resolver = Self::new();
        for selection in &select.selections {
            if let Expr::Column(column) = &selection.expr {
                resolver
                    .columns
                    .entry(column.key())
                    .or_insert(selection.position);
            }
            resolver.selections.push(selection.clone());
        }
        resolver
    }

    /// Position of `expr`, adding it to the select list when new.
    pub fn resolve_selection(&mut self, expr: Expr) -> usize {
        if let Some(position) = self.position_of(&expr) {
            return position;
        }
        let position = self.selections.len() + 1;
        if let Expr::Column(column) = &expr {
            self.columns.insert(column.key(), position);
        }
        self.selections.push(SqlSelection {
            position,
            expr,
            alias: None,
        });
        position
    }

    pub fn position_of(&self, expr: &Expr) -> Option<usize> {
        match expr {
            Expr::Column(column) => self.columns.get(&column.key()).copied(),
            _ => self
                .selections
                .iter()
                .find(|s| &s.expr == expr)
                .map(|s| s.position),
        }
    }

    pub fn selection(&self, position: usize) -> Option<&SqlSelection> {
        position
            .checked_sub(1)
            .and_then(|index| self.selections.get(index))
    }

    /// Expression cached under `key`, built by `create` on first use.
    pub fn resolve_expression(&mut self, key: impl Into<String>, create: impl FnOnce() -> Expr) -> &Expr {
        self.expressions.entry(key.into()).or_insert_with(create)
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn into_select_clause(self, distinct: bool) -> SelectClause {
        SelectClause {
            distinct,
            selections: self.selections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::col;

    #[test]
    fn test_same_column_resolves_once() {
        let mut resolver = SelectionResolver::new();
        let first = resolver.resolve_selection(col("p_0", "name"));
        let second = resolver.resolve_selection(col("p_0", "name"));
        assert_eq!(first, second);
        assert_eq!(resolver.len(), 1);
    }

    #[test]
    fn test_qualifier_distinguishes_columns() {
        let mut resolver = SelectionResolver::new();
        let first = resolver.resolve_selection(col("p_0", "name"));
        let second = resolver.resolve_selection(col("p_1", "name"));
        assert_eq!((first, second), (1, 2));
    }

    #[test]
    fn test_type_annotation_does_not_split_a_column() {
        use crate::ast::{ColumnReference, SqlType};
        let mut resolver = SelectionResolver::new();
        let plain = resolver.resolve_selection(col("p_0", "age"));
        let typed = resolver.resolve_selection(Expr::Column(
            ColumnReference::new("p_0", "age").typed(SqlType::integer()),
        ));
        assert_eq!(plain, typed);
    }

    #[test]
    fn test_from_select_keeps_positions() {
        let select = SelectClause::new(vec![col("a", "x"), col("a", "y")]);
        let mut resolver = SelectionResolver::from_select(&select);
        assert_eq!(resolver.position_of(&col("a", "y")), Some(2));
        assert_eq!(resolver.resolve_selection(col("b", "z")), 3);
        assert_eq!(resolver.selection(3).map(|s| &s.expr), Some(&col("b", "z")));
        assert!(resolver.selection(0).is_none());
    }

    #[test]
    fn test_expression_cache() {
        let mut resolver = SelectionResolver::new();
        let mut calls = 0;
        resolver.resolve_expression("rank", || {
            calls += 1;
            Expr::literal(1)
        });
        resolver.resolve_expression("rank", || {
            calls += 1;
            Expr::literal(2)
        });
        assert_eq!(calls, 1);
        assert_eq!(resolver.resolve_expression("rank", || Expr::literal(3)), &Expr::literal(1));
    }
}
