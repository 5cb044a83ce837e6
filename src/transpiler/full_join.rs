//! FULL JOIN emulation for dialects without native support.
//!
//! A query with `n` full joins is rewritten into a set operation over copies
//! of itself in which each full join is resolved to a one-sided join:
//!
//! - one full join and `EXCEPT ALL` available:
//!   `(left UNION ALL right) EXCEPT ALL inner`
//! - otherwise: `2^n` branches combined with `UNION ALL`, each carrying
//!   nullness predicates on the join keys so no row is produced twice.
//!
//! Sorting, offset and fetch move to the combining group and refer to the
//! branches' select list by position.

use std::collections::HashSet;

use tracing::debug;

use super::dialect::DialectDescriptor;
use super::selection::SelectionResolver;
use super::translator::null_rank;
use crate::ast::*;
use crate::error::{TranslateError, TranslateResult};

/// Whether `spec`'s own from clause has a full join the dialect cannot render.
///
/// Joins inside subqueries are not considered; those specs are checked when
/// they are rendered.
pub fn needs_emulation(spec: &QuerySpec, dialect: &DialectDescriptor) -> bool {
    !dialect.supports_full_join && count_full_joins(&spec.from) > 0
}

pub fn emulate(spec: &QuerySpec, dialect: &DialectDescriptor) -> TranslateResult<QueryGroup> {
    let count = count_full_joins(&spec.from);
    let (base, sort) = split_sort(spec, dialect)?;

    let group = if count == 1 && dialect.supports_except_all && !spec.select.distinct {
        debug!(dialect = %dialect.name, "emulating full join with EXCEPT ALL");
        let left = resolve_joins(&base, &[JoinKind::Left]);
        let right = resolve_joins(&base, &[JoinKind::Right]);
        let inner = resolve_joins(&base, &[JoinKind::Inner]);
        QueryGroup {
            operator: SetOperator::ExceptAll,
            parts: vec![
                QueryPart::Group(QueryGroup {
                    operator: SetOperator::UnionAll,
                    parts: vec![left.into(), right.into()],
                    sort: Vec::new(),
                    offset: None,
                    fetch: None,
                }),
                inner.into(),
            ],
            sort,
            offset: spec.offset.clone(),
            fetch: spec.fetch.clone(),
        }
    } else {
        let keys = join_keys(&base)?;
        let branch_count = 1usize
            .checked_shl(count as u32)
            .ok_or_else(|| TranslateError::infeasible(format!("{} full joins", count)))?;
        debug!(dialect = %dialect.name, full_joins = count, branches = branch_count, "emulating full joins with UNION branches");

        let mut parts = Vec::with_capacity(branch_count);
        for branch in 0..branch_count {
            // First join is the most significant bit, so all-LEFT comes first.
            let kinds: Vec<JoinKind> = (0..count)
                .map(|i| {
                    if branch & (1 << (count - 1 - i)) != 0 {
                        JoinKind::Right
                    } else {
                        JoinKind::Left
                    }
                })
                .collect();
            let mut part = resolve_joins(&base, &kinds);
            for predicate in branch_predicates(&kinds, &keys) {
                part.restriction = Some(Predicate::combine(part.restriction.take(), predicate));
            }
            parts.push(part.into());
        }

        QueryGroup {
            operator: if spec.select.distinct {
                SetOperator::Union
            } else {
                SetOperator::UnionAll
            },
            parts,
            sort,
            offset: spec.offset.clone(),
            fetch: spec.fetch.clone(),
        }
    };
    Ok(group)
}

fn count_full_joins(from: &FromClause) -> usize {
    let mut count = 0;
    from.for_each_join(&mut |join| {
        if join.kind == JoinKind::Full {
            count += 1;
        }
    });
    count
}

/// Copy of `spec` with its full joins replaced, in rendering order, by `kinds`.
fn resolve_joins(spec: &QuerySpec, kinds: &[JoinKind]) -> QuerySpec {
    let mut copy = spec.clone();
    let mut next = kinds.iter();
    copy.from.for_each_join_mut(&mut |join| {
        if join.kind == JoinKind::Full {
            if let Some(kind) = next.next() {
                join.kind = *kind;
            }
        }
    });
    copy
}

/// Restrictions that keep branch `kinds` disjoint from every other branch.
///
/// A right-resolved join only contributes rows without a left match. A join
/// resolved left before a later right-resolved one must have matched on the
/// right, otherwise the all-left branch already produced that row.
fn branch_predicates(kinds: &[JoinKind], keys: &[(Expr, Expr)]) -> Vec<Predicate> {
    let mut predicates = Vec::new();
    for (i, kind) in kinds.iter().enumerate() {
        if *kind != JoinKind::Right {
            continue;
        }
        predicates.push(Predicate::is_null(keys[i].0.clone()));
        for (j, earlier) in kinds[..i].iter().enumerate() {
            if *earlier == JoinKind::Left {
                let not_null = Predicate::is_not_null(keys[j].1.clone());
                if !predicates.contains(&not_null) {
                    predicates.push(not_null);
                }
            }
        }
    }
    predicates
}

/// Strip sort, offset and fetch from `spec` and express the sort by select
/// positions, adding selections (and null ranks) the outer sort needs.
fn split_sort(spec: &QuerySpec, dialect: &DialectDescriptor) -> TranslateResult<(QuerySpec, Vec<SortSpecification>)> {
    let mut base = spec.clone();
    base.sort.clear();
    base.offset = None;
    base.fetch = None;
    if spec.sort.is_empty() {
        return Ok((base, Vec::new()));
    }

    let fixed_select = spec.select.distinct || !spec.group_by.is_empty() || spec.having.is_some();
    let mut resolver = SelectionResolver::from_select(&spec.select);
    let mut sort = Vec::with_capacity(spec.sort.len());

    for item in &spec.sort {
        let position = match &item.expr {
            Expr::SelectionRef(position) => {
                if resolver.selection(*position).is_none() {
                    return Err(TranslateError::infeasible(format!(
                        "sort references selection {} of {}",
                        position,
                        resolver.len()
                    )));
                }
                *position
            }
            expr => match resolver.position_of(expr) {
                Some(position) => position,
                None if fixed_select => {
                    return Err(TranslateError::infeasible(
                        "sort expression missing from the select list of a distinct or grouped query",
                    ));
                }
                None => resolver.resolve_selection(expr.clone()),
            },
        };

        let emulated_nulls = item.nulls.filter(|_| !dialect.supports_null_ordering);
        if let Some(nulls) = emulated_nulls {
            if spec.select.distinct {
                return Err(TranslateError::infeasible(
                    "null precedence on a distinct query without native null ordering",
                ));
            }
            let sorted = resolver
                .selection(position)
                .map(|s| s.expr.clone())
                .ok_or_else(|| TranslateError::infeasible(format!("no selection at {}", position)))?;
            let key = format!("null_rank_{}_{:?}", position, nulls);
            let rank = resolver.resolve_expression(key, || null_rank(&sorted, nulls)).clone();
            let rank_position = resolver.resolve_selection(rank);
            sort.push(SortSpecification::asc(Expr::SelectionRef(rank_position)));
        }

        sort.push(SortSpecification {
            expr: Expr::SelectionRef(position),
            collation: item.collation.clone(),
            order: item.order,
            nulls: if emulated_nulls.is_some() { None } else { item.nulls },
        });
    }

    base.select = resolver.into_select_clause(spec.select.distinct);
    Ok((base, sort))
}

/// `(left key, right key)` of every full join, in rendering order.
fn join_keys(spec: &QuerySpec) -> TranslateResult<Vec<(Expr, Expr)>> {
    let mut keys = Vec::new();
    let mut missing = None;
    spec.from.for_each_join(&mut |join| {
        if join.kind != JoinKind::Full {
            return;
        }
        let owners = GroupOwners::of(&join.group);
        match join.predicate.as_ref().and_then(|p| find_key(p, &owners)) {
            Some(key) => keys.push(key),
            None => {
                missing.get_or_insert_with(|| join.group.stem_source());
            }
        }
    });
    match missing {
        Some(group) => Err(TranslateError::infeasible(format!(
            "full join to {} has no column equality to key branches on",
            group
        ))),
        None => Ok(keys),
    }
}

/// Aliases and paths owned by a joined group and everything joined below it.
struct GroupOwners<'a> {
    aliases: HashSet<&'a str>,
    paths: HashSet<&'a NavigablePath>,
}

impl<'a> GroupOwners<'a> {
    fn of(group: &'a TableGroup) -> Self {
        let mut owners = GroupOwners {
            aliases: HashSet::new(),
            paths: HashSet::new(),
        };
        owners.collect(group);
        owners
    }

    fn collect(&mut self, group: &'a TableGroup) {
        self.aliases.extend(group.aliases());
        if let Some(path) = &group.navigable_path {
            self.paths.insert(path);
        }
        for join in group.nested_joins.iter().chain(&group.joins) {
            self.collect(&join.group);
        }
    }

    fn owns(&self, column: &ColumnReference) -> bool {
        match &column.qualifier {
            Some(Qualifier::Alias(alias)) => self.aliases.contains(alias.as_str()),
            Some(Qualifier::Path { path, .. }) => self.paths.contains(path),
            None => false,
        }
    }
}

fn find_key(predicate: &Predicate, owners: &GroupOwners<'_>) -> Option<(Expr, Expr)> {
    match predicate {
        Predicate::Comparison {
            left: Expr::Column(left),
            op: ComparisonOp::Eq,
            right: Expr::Column(right),
        } => match (owners.owns(left), owners.owns(right)) {
            (false, true) => Some((Expr::Column(left.clone()), Expr::Column(right.clone()))),
            (true, false) => Some((Expr::Column(right.clone()), Expr::Column(left.clone()))),
            _ => None,
        },
        Predicate::Junction {
            nature: JunctionNature::Conjunction,
            predicates,
        } => predicates.iter().find_map(|p| find_key(p, owners)),
        Predicate::Grouped(inner) => find_key(inner, owners),
        _ => None,
    }
}
