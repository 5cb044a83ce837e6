//! Deterministic short aliases for table references.

use std::borrow::Cow;
use std::collections::HashMap;
use std::ops::ControlFlow;

use tracing::trace;

use crate::ast::visit::{self, Visit, VisitMut};
use crate::ast::{Statement, TableGroup, TableReference};

/// Derive an alias stem from an entity, attribute or table name.
///
/// The trailing segment of a dotted name is used (after any `$` nesting
/// marker); the stem is its first letter followed by every upper-case letter
/// that starts an upper-case run, lower-cased. `"com.acme.OrderLine"` gives
/// `"ol"`, `"t_person"` gives `"t"`.
pub fn create_stem(name: &str) -> String {
    let simple = name.rsplit('.').next().unwrap_or(name);
    let simple = simple.rsplit('$').next().unwrap_or(simple);

    let mut stem = String::new();
    let mut previous_upper = false;
    for c in simple.chars() {
        if !c.is_alphabetic() {
            previous_upper = false;
            continue;
        }
        if stem.is_empty() || (c.is_uppercase() && !previous_upper) {
            stem.extend(c.to_lowercase());
        }
        previous_upper = c.is_uppercase();
    }

    if stem.is_empty() {
        "z".to_string()
    } else {
        stem
    }
}

/// Hands out `{stem}_{n}` aliases with a per-stem counter.
#[derive(Debug, Default, Clone)]
pub struct AliasAllocator {
    next: HashMap<String, usize>,
}

impl AliasAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocator that never hands out any of `existing` or a lower suffix.
    pub fn seeded<'a>(existing: impl IntoIterator<Item = &'a str>) -> Self {
        let mut allocator = Self::new();
        for alias in existing {
            allocator.seed(alias);
        }
        allocator
    }

    /// Account for an alias that is already in use.
    pub fn seed(&mut self, alias: &str) {
        let Some((stem, suffix)) = alias.rsplit_once('_') else {
            return;
        };
        let Ok(n) = suffix.parse::<usize>() else {
            return;
        };
        let next = self.next.entry(stem.to_string()).or_insert(0);
        *next = (*next).max(n + 1);
    }

    pub fn allocate(&mut self, stem: &str) -> String {
        let next = self.next.entry(stem.to_string()).or_insert(0);
        let alias = format!("{}_{}", stem, next);
        *next += 1;
        trace!(%alias, "allocated table alias");
        alias
    }

    /// Allocate from the stem of `name`.
    pub fn allocate_for(&mut self, name: &str) -> String {
        self.allocate(&create_stem(name))
    }
}

struct AliasCollector<'ast> {
    aliases: Vec<&'ast str>,
    missing: bool,
}

impl<'ast> Visit<'ast> for AliasCollector<'ast> {
    type Break = ();

    fn visit_table_group(&mut self, group: &'ast TableGroup) -> ControlFlow<()> {
        if group.primary.identification_variable.is_none() {
            self.missing = true;
        }
        if group
            .reference_joins
            .iter()
            .any(|j| j.reference.identification_variable.is_none())
        {
            self.missing = true;
        }
        visit::walk_table_group(self, group)
    }

    fn visit_table_reference(&mut self, reference: &'ast TableReference) -> ControlFlow<()> {
        if let Some(alias) = reference.alias() {
            self.aliases.push(alias);
        }
        visit::walk_table_reference(self, reference)
    }
}

struct AliasAssigner<'a> {
    allocator: &'a mut AliasAllocator,
}

impl VisitMut for AliasAssigner<'_> {
    fn visit_table_group_mut(&mut self, group: &mut TableGroup) {
        if group.primary.identification_variable.is_none() {
            let alias = self.allocator.allocate_for(&group.stem_source());
            group.primary.identification_variable = Some(alias);
        }
        for join in &mut group.reference_joins {
            if join.reference.identification_variable.is_none() {
                let name = join.reference.table_name().unwrap_or("z").to_string();
                join.reference.identification_variable = Some(self.allocator.allocate_for(&name));
            }
        }
        visit::walk_table_group_mut(self, group);
    }
}

/// Give every table group of `statement` an alias.
///
/// Returns the statement unchanged when nothing is missing, together with an
/// allocator seeded from every alias present.
pub fn assign_aliases(statement: &Statement) -> (Cow<'_, Statement>, AliasAllocator) {
    let mut collector = AliasCollector {
        aliases: Vec::new(),
        missing: false,
    };
    let _ = collector.visit_statement(statement);
    let mut allocator = AliasAllocator::seeded(collector.aliases);

    if !collector.missing {
        return (Cow::Borrowed(statement), allocator);
    }

    let mut owned = statement.clone();
    AliasAssigner {
        allocator: &mut allocator,
    }
    .visit_statement_mut(&mut owned);
    (Cow::Owned(owned), allocator)
}
