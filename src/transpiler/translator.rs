//! The statement walker: owns the output buffer, binders, affected tables and
//! clause stack for exactly one statement.

use std::collections::BTreeSet;

use tracing::debug;

use super::alias;
use super::clause::Clause;
use super::correlation;
use super::dialect::{DialectDescriptor, LimitStyle};
use super::from_index::{FromClauseIndex, IndexedGroup};
use super::full_join;
use super::{CompiledStatement, TranslateOptions, dml};
use crate::ast::*;
use crate::error::{TranslateError, TranslateResult};

/// What a navigable path resolves to while its from clause is in scope.
#[derive(Debug, Clone)]
pub(crate) struct GroupBinding {
    pub alias: String,
    /// `(table name, alias)` for every table reference of the group.
    pub tables: Vec<(String, String)>,
    pub join_kind: Option<JoinKind>,
}

impl IndexedGroup for GroupBinding {
    fn join_kind(&self) -> Option<JoinKind> {
        self.join_kind
    }
}

/// Rewrite of column qualifiers that name a DML target the dialect cannot alias.
#[derive(Debug, Clone)]
pub(crate) struct TargetQualifierRewrite {
    pub alias: String,
    /// Table name to qualify with instead, or `None` to drop the qualifier.
    pub replacement: Option<String>,
}

/// Single-use translator; [`SqlTranslator::translate`] consumes it.
pub struct SqlTranslator<'d> {
    pub(crate) dialect: &'d DialectDescriptor,
    pub(crate) options: TranslateOptions,
    pub(crate) sql: String,
    pub(crate) binders: Vec<Binder>,
    pub(crate) affected_tables: BTreeSet<String>,
    pub(crate) clause_stack: Vec<Clause>,
    pub(crate) query_depth: usize,
    pub(crate) index: FromClauseIndex<GroupBinding>,
    pub(crate) target_rewrite: Option<TargetQualifierRewrite>,
    /// Column names a derived table imposes on the next query spec rendered.
    pub(crate) pending_column_aliases: Option<Vec<String>>,
}

impl<'d> SqlTranslator<'d> {
    pub fn new(dialect: &'d DialectDescriptor, options: TranslateOptions) -> Self {
        Self {
            dialect,
            options,
            sql: String::new(),
            binders: Vec::new(),
            affected_tables: BTreeSet::new(),
            clause_stack: Vec::new(),
            query_depth: 0,
            index: FromClauseIndex::new(),
            target_rewrite: None,
            pending_column_aliases: None,
        }
    }

    /// Render `statement` into SQL text, binders and affected tables.
    pub fn translate(mut self, statement: &Statement) -> TranslateResult<CompiledStatement> {
        let (statement, _) = alias::assign_aliases(statement);

        if !self.dialect.supports_nested_correlation
            && correlation::has_nested_correlation(statement.as_ref())
        {
            return Err(TranslateError::unsupported(format!(
                "{} does not support correlation more than one query level deep",
                self.dialect.name
            )));
        }

        match statement.as_ref() {
            Statement::Select(part) => dml::select::render_select(&mut self, part)?,
            Statement::Insert(insert) => dml::insert::render_insert(&mut self, insert)?,
            Statement::Update(update) => dml::update::render_update(&mut self, update, statement.as_ref())?,
            Statement::Delete(delete) => dml::delete::render_delete(&mut self, delete, statement.as_ref())?,
        }

        Ok(self.finish())
    }

    pub(crate) fn finish(self) -> CompiledStatement {
        CompiledStatement {
            sql: self.sql,
            binders: self.binders,
            affected_tables: self.affected_tables,
        }
    }

    pub(crate) fn push(&mut self, fragment: &str) {
        self.sql.push_str(fragment);
    }

    pub(crate) fn current_clause(&self) -> Option<Clause> {
        self.clause_stack.last().copied()
    }

    /// Run `f` with `clause` on top of the clause stack.
    pub(crate) fn with_clause<R>(
        &mut self,
        clause: Clause,
        f: impl FnOnce(&mut Self) -> TranslateResult<R>,
    ) -> TranslateResult<R> {
        self.clause_stack.push(clause);
        let result = f(self);
        self.clause_stack.pop();
        result
    }

    /// Append a parameter marker and record its binder.
    pub(crate) fn add_binder(&mut self, binder: Binder) {
        self.binders.push(binder);
        let marker = self.dialect.marker(self.binders.len());
        self.push(&marker);
    }

    pub(crate) fn add_affected_table(&mut self, table: &str) {
        self.affected_tables.insert(table.to_string());
    }

    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    // Query parts

    /// Render a query part; anything below the statement root is parenthesized.
    pub(crate) fn render_query_part(&mut self, part: &QueryPart) -> TranslateResult<()> {
        let nested = self.query_depth > 0;
        match part {
            QueryPart::Spec(spec) => self.render_query_spec(spec, nested),
            QueryPart::Group(group) => self.render_query_group(group, nested),
        }
    }

    pub(crate) fn render_query_spec(&mut self, spec: &QuerySpec, nested: bool) -> TranslateResult<()> {
        if full_join::needs_emulation(spec, self.dialect) {
            let emulated = full_join::emulate(spec, self.dialect)?;
            return self.render_query_group(&emulated, nested);
        }

        let column_aliases = self.pending_column_aliases.take();
        if nested {
            self.push("(");
        }
        self.query_depth += 1;
        self.index = FromClauseIndex::with_parent(std::mem::take(&mut self.index));

        self.register_from_clause(&spec.from);
        self.render_select_clause(&spec.select, column_aliases.as_deref())?;
        self.render_from_clause(&spec.from)?;

        if let Some(restriction) = spec.restriction.as_ref().filter(|p| !p.is_empty()) {
            self.push(" WHERE ");
            self.with_clause(Clause::Where, |t| t.render_predicate(restriction))?;
        }
        if !spec.group_by.is_empty() {
            self.push(" GROUP BY ");
            self.with_clause(Clause::GroupBy, |t| t.render_expr_list(&spec.group_by))?;
        }
        if let Some(having) = spec.having.as_ref().filter(|p| !p.is_empty()) {
            self.push(" HAVING ");
            self.with_clause(Clause::Having, |t| t.render_predicate(having))?;
        }
        self.render_sort_specifications(&spec.sort, Some(&spec.select))?;
        self.render_offset_fetch(spec.offset.as_ref(), spec.fetch.as_ref(), !spec.sort.is_empty())?;

        self.index = std::mem::take(&mut self.index).into_parent().unwrap_or_default();
        self.query_depth -= 1;
        if nested {
            self.push(")");
        }
        Ok(())
    }

    pub(crate) fn render_query_group(&mut self, group: &QueryGroup, nested: bool) -> TranslateResult<()> {
        if matches!(group.operator, SetOperator::ExceptAll | SetOperator::IntersectAll)
            && !self.dialect.supports_except_all
        {
            return Err(TranslateError::unsupported(format!(
                "{} does not support{}",
                self.dialect.name,
                group.operator.sql().trim_end()
            )));
        }
        if group.parts.is_empty() {
            return Err(TranslateError::structural("query group without query parts"));
        }

        if nested {
            self.push("(");
        }
        self.query_depth += 1;
        for (i, part) in group.parts.iter().enumerate() {
            if i > 0 {
                self.push(group.operator.sql());
            }
            // Plain members stay bare so the group reads `SELECT .. UNION SELECT ..`.
            match part {
                QueryPart::Spec(spec) => self.render_query_spec(spec, spec.has_sort_or_limit())?,
                QueryPart::Group(inner) => self.render_query_group(inner, true)?,
            }
        }
        self.render_sort_specifications(&group.sort, None)?;
        self.render_offset_fetch(group.offset.as_ref(), group.fetch.as_ref(), !group.sort.is_empty())?;
        self.query_depth -= 1;
        if nested {
            self.push(")");
        }
        Ok(())
    }

    fn render_select_clause(
        &mut self,
        select: &SelectClause,
        column_aliases: Option<&[String]>,
    ) -> TranslateResult<()> {
        if select.selections.is_empty() {
            return Err(TranslateError::structural("query specification without selections"));
        }
        self.with_clause(Clause::Select, |t| {
            t.push("SELECT ");
            if select.distinct {
                t.push("DISTINCT ");
            }
            for (i, selection) in select.selections.iter().enumerate() {
                if i > 0 {
                    t.push(", ");
                }
                t.render_expr(&selection.expr)?;
                let alias = column_aliases
                    .and_then(|names| names.get(i))
                    .or(selection.alias.as_ref());
                if let Some(alias) = alias {
                    t.push(" AS ");
                    t.push(alias);
                }
            }
            Ok(())
        })
    }

    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    // ORDER BY / OFFSET / FETCH

    /// `select` is the select clause positional sort keys refer to; `None`
    /// for a query group, whose positions name result columns only.
    fn render_sort_specifications(
        &mut self,
        sorts: &[SortSpecification],
        select: Option<&SelectClause>,
    ) -> TranslateResult<()> {
        if sorts.is_empty() {
            return Ok(());
        }
        self.push(" ORDER BY ");
        self.with_clause(Clause::OrderBy, |t| {
            for (i, sort) in sorts.iter().enumerate() {
                if i > 0 {
                    t.push(", ");
                }
                t.render_sort_specification(sort, select)?;
            }
            Ok(())
        })
    }

    fn render_sort_specification(
        &mut self,
        sort: &SortSpecification,
        select: Option<&SelectClause>,
    ) -> TranslateResult<()> {
        let emulate_nulls = sort.nulls.filter(|_| !self.dialect.supports_null_ordering);
        if let Some(nulls) = emulate_nulls {
            // The rank key needs the expression behind a select position.
            let ranked = match (&sort.expr, select) {
                (Expr::SelectionRef(position), Some(select)) => position
                    .checked_sub(1)
                    .and_then(|i| select.selections.get(i))
                    .map(|selection| &selection.expr)
                    .ok_or_else(|| {
                        TranslateError::structural(format!(
                            "sort position {} is outside the select list",
                            position
                        ))
                    })?,
                (Expr::SelectionRef(_), None) => {
                    return Err(TranslateError::unsupported(format!(
                        "{} cannot order a set operation by position with explicit null precedence",
                        self.dialect.name
                    )));
                }
                (expr, _) => expr,
            };
            self.render_expr(&null_rank(ranked, nulls))?;
            self.push(" ASC, ");
        }

        self.render_expr(&sort.expr)?;
        if let Some(collation) = &sort.collation {
            self.push(" COLLATE ");
            self.push(collation);
        }
        self.push(match sort.order {
            SortOrder::Ascending => " ASC",
            SortOrder::Descending => " DESC",
        });
        if emulate_nulls.is_none() {
            match sort.nulls {
                Some(NullPrecedence::First) => self.push(" NULLS FIRST"),
                Some(NullPrecedence::Last) => self.push(" NULLS LAST"),
                None => {}
            }
        }
        Ok(())
    }

    /// `sorted` tells whether an `ORDER BY` was already rendered.
    fn render_offset_fetch(
        &mut self,
        offset: Option<&Expr>,
        fetch: Option<&Expr>,
        sorted: bool,
    ) -> TranslateResult<()> {
        let dialect = self.dialect;
        match dialect.limit_style {
            LimitStyle::OffsetFetch => {
                let strict = dialect.offset_fetch_requires_order && (offset.is_some() || fetch.is_some());
                if strict && !sorted {
                    self.push(" ORDER BY (SELECT 0)");
                }
                if let Some(offset) = offset {
                    self.push(" OFFSET ");
                    self.with_clause(Clause::Offset, |t| t.render_expr(offset))?;
                    self.push(" ROWS");
                } else if strict {
                    self.push(" OFFSET 0 ROWS");
                }
                if let Some(fetch) = fetch {
                    self.push(" FETCH FIRST ");
                    self.with_clause(Clause::Fetch, |t| t.render_expr(fetch))?;
                    self.push(" ROWS ONLY");
                }
            }
            LimitStyle::LimitOffset => {
                if let Some(fetch) = fetch {
                    self.push(" LIMIT ");
                    self.with_clause(Clause::Fetch, |t| t.render_expr(fetch))?;
                } else if let (Some(_), Some(unbounded)) = (offset, &dialect.unbounded_limit) {
                    self.push(" LIMIT ");
                    self.push(unbounded);
                }
                if let Some(offset) = offset {
                    self.push(" OFFSET ");
                    self.with_clause(Clause::Offset, |t| t.render_expr(offset))?;
                }
            }
        }
        Ok(())
    }

    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    // FROM clause

    fn register_from_clause(&mut self, from: &FromClause) {
        for root in &from.roots {
            self.register_table_group(root, None);
        }
    }

    fn register_table_group(&mut self, group: &TableGroup, join_kind: Option<JoinKind>) {
        if let Some(path) = &group.navigable_path {
            let tables = std::iter::once(&group.primary)
                .chain(group.reference_joins.iter().map(|j| &j.reference))
                .filter_map(|r| Some((r.table_name()?.to_string(), r.alias()?.to_string())))
                .collect();
            let binding = GroupBinding {
                alias: group.alias().unwrap_or_default().to_string(),
                tables,
                join_kind,
            };
            self.index.register(path.clone(), binding);
        }
        for join in group.nested_joins.iter().chain(&group.joins) {
            // Anything below an outer join is itself optional.
            let effective = match join_kind {
                Some(kind) if kind.is_outer() => kind,
                _ => join.kind,
            };
            self.register_table_group(&join.group, Some(effective));
        }
    }

    fn render_from_clause(&mut self, from: &FromClause) -> TranslateResult<()> {
        if from.is_empty() {
            let dialect = self.dialect;
            if let Some(dual) = &dialect.dual_table {
                self.push(" FROM ");
                self.push(dual);
            }
            return Ok(());
        }
        self.push(" FROM ");
        self.with_clause(Clause::From, |t| {
            for (i, root) in from.roots.iter().enumerate() {
                if i > 0 {
                    t.push(", ");
                }
                if root.virtual_group {
                    return Err(TranslateError::structural(
                        "virtual table group cannot be a from clause root",
                    ));
                }
                t.render_table_group_content(root)?;
                t.render_table_group_joins(&root.joins)?;
            }
            Ok(())
        })
    }

    /// Primary table, secondary tables and nested joins of one group.
    fn render_table_group_content(&mut self, group: &TableGroup) -> TranslateResult<()> {
        self.render_table_reference(&group.primary)?;
        for join in &group.reference_joins {
            self.push(join.kind.sql());
            self.render_table_reference(&join.reference)?;
            self.render_join_predicate(join.kind, join.predicate.as_ref())?;
        }
        self.render_table_group_joins(&group.nested_joins)
    }

    fn render_table_group_joins(&mut self, joins: &[TableGroupJoin]) -> TranslateResult<()> {
        for join in joins {
            self.render_table_group_join(join)?;
        }
        Ok(())
    }

    fn render_table_group_join(&mut self, join: &TableGroupJoin) -> TranslateResult<()> {
        let group = &join.group;
        if group.virtual_group {
            if join.predicate.is_some() {
                return Err(TranslateError::structural(
                    "virtual table group joined with a predicate",
                ));
            }
            self.render_table_group_joins(&group.nested_joins)?;
            return self.render_table_group_joins(&group.joins);
        }

        let kind = match (join.kind, &join.predicate) {
            (JoinKind::Inner, None) => JoinKind::Cross,
            (kind, _) => kind,
        };
        self.push(kind.sql());
        if join.lateral {
            if !self.dialect.supports_lateral {
                return Err(TranslateError::unsupported(format!(
                    "{} does not support lateral joins",
                    self.dialect.name
                )));
            }
            self.push("LATERAL ");
        }
        if group.has_nested_content() {
            self.push("(");
            self.render_table_group_content(group)?;
            self.push(")");
        } else {
            self.render_table_group_content(group)?;
        }
        self.render_join_predicate(kind, join.predicate.as_ref())?;
        self.render_table_group_joins(&group.joins)
    }

    fn render_join_predicate(&mut self, kind: JoinKind, predicate: Option<&Predicate>) -> TranslateResult<()> {
        match (kind, predicate) {
            (JoinKind::Cross, Some(_)) => Err(TranslateError::structural("cross join with a join predicate")),
            (JoinKind::Cross, None) => Ok(()),
            (_, Some(predicate)) if !predicate.is_empty() => {
                self.push(" ON ");
                self.with_clause(Clause::Where, |t| t.render_predicate(predicate))
            }
            _ => {
                self.push(" ON 1=1");
                Ok(())
            }
        }
    }

    fn render_table_reference(&mut self, reference: &TableReference) -> TranslateResult<()> {
        match &reference.source {
            TableSource::Named { table } => {
                self.add_affected_table(table);
                self.push(table);
                self.render_table_alias(reference)
            }
            TableSource::Query { query, column_names } => {
                let list = !column_names.is_empty() && self.dialect.supports_derived_column_list;
                if !column_names.is_empty() && !list {
                    self.pending_column_aliases = Some(column_names.clone());
                }
                self.render_query_part(query)?;
                self.pending_column_aliases = None;
                self.render_table_alias(reference)?;
                if list {
                    self.render_column_list(column_names);
                }
                Ok(())
            }
            TableSource::Function {
                name,
                args,
                column_names,
            } => {
                if !column_names.is_empty() && !self.dialect.supports_derived_column_list {
                    return Err(TranslateError::unsupported(format!(
                        "{} cannot name the columns of table function {}",
                        self.dialect.name, name
                    )));
                }
                self.push(name);
                self.push("(");
                self.render_expr_list(args)?;
                self.push(")");
                self.render_table_alias(reference)?;
                if !column_names.is_empty() {
                    self.render_column_list(column_names);
                }
                Ok(())
            }
            TableSource::Values { rows, column_names } => {
                if self.dialect.supports_values_list && self.dialect.supports_derived_column_list {
                    self.push("(VALUES ");
                    self.with_clause(Clause::Values, |t| t.render_value_rows(rows))?;
                    self.push(")");
                    self.render_table_alias(reference)?;
                    if !column_names.is_empty() {
                        self.render_column_list(column_names);
                    }
                } else {
                    self.push("(");
                    self.render_rows_as_selects(rows, column_names)?;
                    self.push(")");
                    self.render_table_alias(reference)?;
                }
                Ok(())
            }
        }
    }

    fn render_table_alias(&mut self, reference: &TableReference) -> TranslateResult<()> {
        if let Some(alias) = reference.alias() {
            let dialect = self.dialect;
            self.push(&dialect.table_alias_separator);
            self.push(alias);
        }
        Ok(())
    }

    fn render_column_list(&mut self, names: &[String]) {
        self.push(" (");
        self.push(&names.join(", "));
        self.push(")");
    }

    /// `(a, b), (c, d)`
    pub(crate) fn render_value_rows(&mut self, rows: &[Vec<Expr>]) -> TranslateResult<()> {
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push("(");
            self.render_expr_list(row)?;
            self.push(")");
        }
        Ok(())
    }

    /// `SELECT a c1, b c2 FROM dual UNION ALL SELECT ...` for dialects
    /// without a usable values list.
    pub(crate) fn render_rows_as_selects(
        &mut self,
        rows: &[Vec<Expr>],
        column_names: &[String],
    ) -> TranslateResult<()> {
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                self.push(SetOperator::UnionAll.sql());
            }
            self.with_clause(Clause::Select, |t| {
                t.push("SELECT ");
                for (j, expr) in row.iter().enumerate() {
                    if j > 0 {
                        t.push(", ");
                    }
                    t.render_expr(expr)?;
                    if let Some(name) = column_names.get(j) {
                        t.push(" ");
                        t.push(name);
                    }
                }
                Ok(())
            })?;
            let dialect = self.dialect;
            if let Some(dual) = &dialect.dual_table {
                self.push(" FROM ");
                self.push(dual);
            }
        }
        Ok(())
    }

    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    // Qualifiers

    /// SQL qualifier for a column, `None` when it should be rendered bare.
    pub(crate) fn resolve_qualifier(&self, qualifier: &Qualifier) -> TranslateResult<Option<String>> {
        let alias = match qualifier {
            Qualifier::Alias(alias) => alias.clone(),
            Qualifier::Path { path, table } => {
                let binding = self.index.find(path).ok_or_else(|| {
                    TranslateError::structural(format!("no table group registered for path {}", path))
                })?;
                match table {
                    None => binding.alias.clone(),
                    Some(table) => binding
                        .tables
                        .iter()
                        .find(|(name, _)| name == table)
                        .map(|(_, alias)| alias.clone())
                        .ok_or_else(|| {
                            TranslateError::structural(format!(
                                "table group for path {} has no table {}",
                                path, table
                            ))
                        })?,
                }
            }
        };

        match &self.target_rewrite {
            Some(rewrite) if rewrite.alias == alias => Ok(rewrite.replacement.clone()),
            _ => Ok(Some(alias)),
        }
    }

    /// Decide how a DML target alias is handled and return the alias to render.
    pub(crate) fn prepare_mutation_target(
        &mut self,
        target: &TableReference,
        statement: &Statement,
    ) -> TranslateResult<Option<String>> {
        let table = target
            .table_name()
            .ok_or_else(|| TranslateError::structural("mutation target must be a named table"))?;
        self.add_affected_table(table);

        let Some(alias) = target.alias() else {
            return Ok(None);
        };
        if self.dialect.supports_dml_target_alias {
            return Ok(Some(alias.to_string()));
        }

        let replacement = correlation::is_correlated(statement, alias).then(|| table.to_string());
        debug!(alias, ?replacement, "dialect cannot alias the mutation target");
        self.target_rewrite = Some(TargetQualifierRewrite {
            alias: alias.to_string(),
            replacement,
        });
        Ok(None)
    }
}

/// `CASE WHEN expr IS NULL THEN r ELSE 1 - r END`, ordering nulls as requested
/// when sorted ascending.
pub(crate) fn null_rank(expr: &Expr, nulls: NullPrecedence) -> Expr {
    let (null_value, other) = match nulls {
        NullPrecedence::First => (0, 1),
        NullPrecedence::Last => (1, 0),
    };
    Expr::CaseSearched {
        whens: vec![(Predicate::is_null(expr.clone()), Expr::literal(null_value))],
        otherwise: Some(Box::new(Expr::literal(other))),
    }
}
