//! Scoped lookup from navigable paths to the table groups that satisfy them.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::debug;

use crate::ast::{JoinKind, NavigablePath};

/// Implemented by what a [`FromClauseIndex`] stores.
pub trait IndexedGroup {
    /// Join kind the group was attached with; `None` for from-clause roots.
    fn join_kind(&self) -> Option<JoinKind>;
}

/// One from-clause scope, chained to the scope of the enclosing query.
#[derive(Debug)]
pub struct FromClauseIndex<G> {
    entries: HashMap<NavigablePath, G>,
    parent: Option<Box<FromClauseIndex<G>>>,
}

impl<G> Default for FromClauseIndex<G> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            parent: None,
        }
    }
}

impl<G> FromClauseIndex<G> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a nested scope whose misses fall through to `parent`.
    pub fn with_parent(parent: FromClauseIndex<G>) -> Self {
        Self {
            entries: HashMap::new(),
            parent: Some(Box::new(parent)),
        }
    }

    /// Close this scope and return the enclosing one.
    pub fn into_parent(self) -> Option<FromClauseIndex<G>> {
        self.parent.map(|parent| *parent)
    }

    /// Number of enclosing scopes.
    pub fn depth(&self) -> usize {
        self.parent.as_ref().map_or(0, |p| p.depth() + 1)
    }

    /// Register `group` for `path` in this scope, replacing any earlier group.
    pub fn register(&mut self, path: NavigablePath, group: G) -> Option<G> {
        let previous = self.entries.insert(path.clone(), group);
        if previous.is_some() {
            debug!(%path, depth = self.depth(), "table group registration replaced");
        }
        previous
    }

    pub fn find_local(&self, path: &NavigablePath) -> Option<&G> {
        self.entries.get(path)
    }

    /// Look `path` up here, then in each enclosing scope.
    pub fn find(&self, path: &NavigablePath) -> Option<&G> {
        self.entries
            .get(path)
            .or_else(|| self.parent.as_ref().and_then(|p| p.find(path)))
    }
}

impl<G: IndexedGroup> FromClauseIndex<G> {
    /// Find the group for `path`, creating and registering one locally on a miss.
    ///
    /// A group that only exists in an enclosing scope is reused unless it was
    /// outer joined there: pulling such a group inward would change the
    /// cardinality of this scope.
    ///
    /// For code that builds statement trees and decides which joins a path
    /// needs; the translator itself only registers and looks up the groups a
    /// tree already carries.
    pub fn find_or_create<E>(
        &mut self,
        path: &NavigablePath,
        create: impl FnOnce() -> Result<G, E>,
    ) -> Result<&G, E> {
        match self.entries.entry(path.clone()) {
            Entry::Occupied(entry) => Ok(&*entry.into_mut()),
            Entry::Vacant(slot) => {
                if let Some(outer) = self.parent.as_deref().and_then(|p| p.find(path)) {
                    match outer.join_kind() {
                        Some(kind) if kind.is_outer() => {
                            debug!(%path, ?kind, "not reusing outer joined group from enclosing scope");
                        }
                        _ => return Ok(outer),
                    }
                }
                Ok(&*slot.insert(create()?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Group(&'static str, Option<JoinKind>);

    impl IndexedGroup for Group {
        fn join_kind(&self) -> Option<JoinKind> {
            self.1
        }
    }

    fn path(s: &str) -> NavigablePath {
        let mut parts = s.split('.');
        let root = NavigablePath::new(parts.next().unwrap());
        parts.fold(root, |p, step| p.append(step))
    }

    #[test]
    fn test_find_falls_through_to_parent() {
        let mut outer = FromClauseIndex::new();
        outer.register(path("Person"), Group("p_0", None));
        let inner: FromClauseIndex<Group> = FromClauseIndex::with_parent(outer);

        assert!(inner.find_local(&path("Person")).is_none());
        assert_eq!(inner.find(&path("Person")), Some(&Group("p_0", None)));
        assert_eq!(inner.depth(), 1);
    }

    #[test]
    fn test_register_overwrites() {
        let mut index = FromClauseIndex::new();
        assert!(index.register(path("Person"), Group("p_0", None)).is_none());
        let previous = index.register(path("Person"), Group("p_1", None));
        assert_eq!(previous, Some(Group("p_0", None)));
        assert_eq!(index.find(&path("Person")), Some(&Group("p_1", None)));
    }

    #[test]
    fn test_find_or_create_reuses_inner_joined_outer_group() {
        let mut outer = FromClauseIndex::new();
        outer.register(path("Person.address"), Group("a_0", Some(JoinKind::Inner)));
        let mut inner = FromClauseIndex::with_parent(outer);

        let found = inner
            .find_or_create(&path("Person.address"), || Ok::<_, ()>(Group("a_1", None)))
            .unwrap();
        assert_eq!(found, &Group("a_0", Some(JoinKind::Inner)));
        assert!(inner.find_local(&path("Person.address")).is_none());
    }

    #[test]
    fn test_find_or_create_does_not_pull_outer_joined_group() {
        let mut outer = FromClauseIndex::new();
        outer.register(path("Person.address"), Group("a_0", Some(JoinKind::Left)));
        let mut inner = FromClauseIndex::with_parent(outer);

        let found = inner
            .find_or_create(&path("Person.address"), || Ok::<_, ()>(Group("a_1", None)))
            .unwrap();
        assert_eq!(found, &Group("a_1", None));
        assert_eq!(inner.find_local(&path("Person.address")), Some(&Group("a_1", None)));

        let parent = inner.into_parent().unwrap();
        assert_eq!(parent.find(&path("Person.address")), Some(&Group("a_0", Some(JoinKind::Left))));
    }
}
