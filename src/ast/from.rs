use serde::{Deserialize, Serialize};

use super::expr::Expr;
use super::path::NavigablePath;
use super::predicate::Predicate;
use super::query::QueryPart;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    pub fn sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => " INNER JOIN ",
            JoinKind::Left => " LEFT JOIN ",
            JoinKind::Right => " RIGHT JOIN ",
            JoinKind::Full => " FULL JOIN ",
            JoinKind::Cross => " CROSS JOIN ",
        }
    }

    /// Outer joins change cardinality when pulled into another scope.
    pub fn is_outer(&self) -> bool {
        matches!(self, JoinKind::Left | JoinKind::Right | JoinKind::Full)
    }
}

/// What a table reference reads from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableSource {
    Named {
        table: String,
    },
    /// Derived table backed by a subquery.
    Query {
        query: Box<QueryPart>,
        #[serde(default)]
        column_names: Vec<String>,
    },
    /// Table-valued function.
    Function {
        name: String,
        #[serde(default)]
        args: Vec<Expr>,
        #[serde(default)]
        column_names: Vec<String>,
    },
    /// Inline `VALUES` list.
    Values {
        rows: Vec<Vec<Expr>>,
        #[serde(default)]
        column_names: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableReference {
    pub source: TableSource,
    /// SQL alias; allocated during translation when absent.
    #[serde(default)]
    pub identification_variable: Option<String>,
}

impl TableReference {
    pub fn named(table: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            source: TableSource::Named {
                table: table.into(),
            },
            identification_variable: Some(alias.into()),
        }
    }

    pub fn unaliased(table: impl Into<String>) -> Self {
        Self {
            source: TableSource::Named {
                table: table.into(),
            },
            identification_variable: None,
        }
    }

    pub fn table_name(&self) -> Option<&str> {
        match &self.source {
            TableSource::Named { table } => Some(table),
            _ => None,
        }
    }

    pub fn alias(&self) -> Option<&str> {
        self.identification_variable.as_deref()
    }
}

/// Secondary table of one group, e.g. a joined-inheritance subclass table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableReferenceJoin {
    pub kind: JoinKind,
    pub reference: TableReference,
    #[serde(default)]
    pub predicate: Option<Predicate>,
}

/// A relation in the from clause together with everything joined to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableGroup {
    #[serde(default)]
    pub navigable_path: Option<NavigablePath>,
    /// Entity or attribute name the alias stem is derived from.
    #[serde(default)]
    pub source_name: Option<String>,
    pub primary: TableReference,
    #[serde(default)]
    pub reference_joins: Vec<TableReferenceJoin>,
    /// Joins rendered inside this group's parentheses.
    #[serde(default)]
    pub nested_joins: Vec<TableGroupJoin>,
    #[serde(default)]
    pub joins: Vec<TableGroupJoin>,
    /// Virtual groups only host joins; they are never rendered themselves.
    #[serde(default, rename = "virtual")]
    pub virtual_group: bool,
}

impl TableGroup {
    pub fn new(primary: TableReference) -> Self {
        Self {
            navigable_path: None,
            source_name: None,
            primary,
            reference_joins: Vec::new(),
            nested_joins: Vec::new(),
            joins: Vec::new(),
            virtual_group: false,
        }
    }

    pub fn at_path(mut self, path: NavigablePath) -> Self {
        self.navigable_path = Some(path);
        self
    }

    pub fn join(mut self, join: TableGroupJoin) -> Self {
        self.joins.push(join);
        self
    }

    /// Alias of the primary table reference.
    pub fn alias(&self) -> Option<&str> {
        self.primary.alias()
    }

    /// Aliases of every table reference owned by this group.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        std::iter::once(&self.primary)
            .chain(self.reference_joins.iter().map(|j| &j.reference))
            .filter_map(TableReference::alias)
    }

    pub fn has_nested_content(&self) -> bool {
        !self.reference_joins.is_empty() || !self.nested_joins.is_empty()
    }

    /// Name used to derive an alias stem.
    pub fn stem_source(&self) -> String {
        if let Some(name) = &self.source_name {
            return name.clone();
        }
        if let Some(path) = &self.navigable_path {
            return path.local_name().to_string();
        }
        match &self.primary.source {
            TableSource::Named { table } => table.clone(),
            TableSource::Function { name, .. } => name.clone(),
            TableSource::Query { .. } => "derived".to_string(),
            TableSource::Values { .. } => "values".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableGroupJoin {
    pub kind: JoinKind,
    pub group: TableGroup,
    #[serde(default)]
    pub predicate: Option<Predicate>,
    #[serde(default)]
    pub lateral: bool,
}

impl TableGroupJoin {
    pub fn new(kind: JoinKind, group: TableGroup, predicate: Option<Predicate>) -> Self {
        Self {
            kind,
            group,
            predicate,
            lateral: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FromClause {
    pub roots: Vec<TableGroup>,
}

impl FromClause {
    pub fn new(roots: Vec<TableGroup>) -> Self {
        Self { roots }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Visit every join of this from clause depth-first, in rendering order.
    pub fn for_each_join<'a>(&'a self, f: &mut impl FnMut(&'a TableGroupJoin)) {
        fn walk<'a>(group: &'a TableGroup, f: &mut impl FnMut(&'a TableGroupJoin)) {
            for join in group.nested_joins.iter().chain(&group.joins) {
                f(join);
                walk(&join.group, f);
            }
        }
        for root in &self.roots {
            walk(root, f);
        }
    }

    /// Mutable counterpart of [`FromClause::for_each_join`].
    pub fn for_each_join_mut(&mut self, f: &mut impl FnMut(&mut TableGroupJoin)) {
        fn walk(group: &mut TableGroup, f: &mut impl FnMut(&mut TableGroupJoin)) {
            for join in group.nested_joins.iter_mut().chain(group.joins.iter_mut()) {
                f(join);
                walk(&mut join.group, f);
            }
        }
        for root in &mut self.roots {
            walk(root, f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_order_is_depth_first() {
        let c = TableGroup::new(TableReference::named("c", "c1_0"));
        let b = TableGroup::new(TableReference::named("b", "b1_0"))
            .join(TableGroupJoin::new(JoinKind::Left, c, None));
        let d = TableGroup::new(TableReference::named("d", "d1_0"));
        let a = TableGroup::new(TableReference::named("a", "a1_0"))
            .join(TableGroupJoin::new(JoinKind::Inner, b, None))
            .join(TableGroupJoin::new(JoinKind::Full, d, None));
        let from = FromClause::new(vec![a]);

        let mut seen = Vec::new();
        from.for_each_join(&mut |j| seen.push(j.group.alias().unwrap_or_default().to_string()));
        assert_eq!(seen, vec!["b1_0", "c1_0", "d1_0"]);
    }

    #[test]
    fn test_stem_source_prefers_source_name() {
        let mut group = TableGroup::new(TableReference::unaliased("t_person"));
        assert_eq!(group.stem_source(), "t_person");
        group.source_name = Some("com.acme.Person".into());
        assert_eq!(group.stem_source(), "com.acme.Person");
    }
}
