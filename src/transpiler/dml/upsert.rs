//! Insert-or-update of an optional table row.
//!
//! Rendered as `MERGE`, `INSERT .. ON CONFLICT`, `INSERT .. ON DUPLICATE KEY
//! UPDATE`, or a plain update/insert/delete sequence when the dialect has no
//! form that can express the request.

use serde::Serialize;
use tracing::debug;

use crate::ast::*;
use crate::error::{TranslateError, TranslateResult};
use crate::transpiler::clause::Clause;
use crate::transpiler::dialect::{DialectDescriptor, MergeLockStyle, UpsertStyle};
use crate::transpiler::translator::SqlTranslator;
use crate::transpiler::{CompiledStatement, TranslateOptions};

use super::insert::render_insert;

/// Alias of the merge target.
const TARGET: &str = "t";
/// Alias of the merge source row.
const SOURCE: &str = "s";

/// What the caller executes to apply an [`OptionalTableUpdate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MutationOperation {
    /// A single `MERGE` statement.
    Merge(CompiledStatement),
    /// A single `INSERT` with a conflict clause.
    Upsert(CompiledStatement),
    /// Run `update`; when it touches no row run `insert`. For optional
    /// tables, run `delete` instead of both once every value is null.
    UpdateOrInsert {
        update: CompiledStatement,
        insert: CompiledStatement,
        delete: Option<CompiledStatement>,
    },
}

impl MutationOperation {
    pub fn statements(&self) -> Vec<&CompiledStatement> {
        match self {
            MutationOperation::Merge(stmt) | MutationOperation::Upsert(stmt) => vec![stmt],
            MutationOperation::UpdateOrInsert {
                update,
                insert,
                delete,
            } => {
                let mut all = vec![update, insert];
                all.extend(delete.as_ref());
                all
            }
        }
    }
}

pub fn render_upsert(
    update: &OptionalTableUpdate,
    dialect: &DialectDescriptor,
    options: TranslateOptions,
) -> TranslateResult<MutationOperation> {
    if update.key_bindings.is_empty() {
        return Err(TranslateError::structural(format!(
            "optional table update of {} without key columns",
            update.table
        )));
    }

    match dialect.upsert_style {
        UpsertStyle::Merge => render_merge(update, dialect, options).map(MutationOperation::Merge),
        UpsertStyle::OnConflict if !update.optional => {
            render_on_conflict(update, dialect, options).map(MutationOperation::Upsert)
        }
        UpsertStyle::OnDuplicateKey if !update.optional && update.optimistic_lock_bindings.is_empty() => {
            render_on_duplicate_key(update, dialect, options).map(MutationOperation::Upsert)
        }
        style => {
            debug!(table = %update.table, ?style, optional = update.optional, "upsert falls back to update-or-insert");
            render_update_or_insert(update, dialect, options)
        }
    }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// MERGE

fn render_merge(
    update: &OptionalTableUpdate,
    dialect: &DialectDescriptor,
    options: TranslateOptions,
) -> TranslateResult<CompiledStatement> {
    let mut t = SqlTranslator::new(dialect, options);
    t.add_affected_table(&update.table);
    let separator = dialect.table_alias_separator.as_str();
    let bindings: Vec<&ColumnValueBinding> = update.key_bindings.iter().chain(&update.value_bindings).collect();
    let names: Vec<String> = bindings.iter().map(|b| b.column.clone()).collect();

    t.with_clause(Clause::Merge, |t| {
        t.push("MERGE INTO ");
        t.push(&update.table);
        t.push(separator);
        t.push(TARGET);

        t.push(" USING (");
        let column_list = render_merge_source(t, &bindings, &names)?;
        t.push(")");
        t.push(separator);
        t.push(SOURCE);
        if column_list {
            t.push(" (");
            t.push(&names.join(", "));
            t.push(")");
        }

        t.push(" ON (");
        render_condition(t, &key_equalities(update))?;
        t.push(")");

        match dialect.merge_lock_style {
            MergeLockStyle::MatchedAnd => {
                render_when_not_matched(t, update, &names, true)?;
                if update.optional && !update.value_bindings.is_empty() {
                    t.push(" WHEN MATCHED AND ");
                    let mut conditions = vec![all_values_null(update)];
                    conditions.extend(lock_predicate(update, TARGET));
                    render_condition(t, &conditions)?;
                    t.push(" THEN DELETE");
                }
                if !update.value_bindings.is_empty() {
                    t.push(" WHEN MATCHED");
                    if let Some(lock) = lock_predicate(update, TARGET) {
                        t.push(" AND ");
                        render_condition(t, &[lock])?;
                    }
                    t.push(" THEN UPDATE SET ");
                    render_source_assignments(t, update)?;
                }
            }
            MergeLockStyle::UpdateWhere => {
                if !update.value_bindings.is_empty() {
                    t.push(" WHEN MATCHED THEN UPDATE SET ");
                    render_source_assignments(t, update)?;
                    if let Some(lock) = lock_predicate(update, TARGET) {
                        t.push(" WHERE ");
                        render_condition(t, &[lock])?;
                    }
                    if update.optional {
                        t.push(" DELETE WHERE ");
                        render_condition(t, &[all_values_null(update)])?;
                    }
                }
                render_when_not_matched(t, update, &names, false)?;
            }
        }

        if dialect.merge_requires_terminator {
            t.push(";");
        }
        Ok(())
    })?;
    Ok(t.finish())
}

/// Render the source row; returns whether a column list must follow the alias.
fn render_merge_source(
    t: &mut SqlTranslator<'_>,
    bindings: &[&ColumnValueBinding],
    names: &[String],
) -> TranslateResult<bool> {
    let dialect = t.dialect;
    let row: Vec<Expr> = bindings
        .iter()
        .map(|b| match b.value.sql_type() {
            Some(target) if dialect.requires_typed_values_parameters && matches!(b.value, Expr::Parameter(_)) => {
                Expr::Cast {
                    expr: Box::new(b.value.clone()),
                    target,
                }
            }
            _ => b.value.clone(),
        })
        .collect();

    if dialect.supports_values_list && dialect.supports_derived_column_list {
        t.push("VALUES (");
        t.with_clause(Clause::Values, |t| t.render_expr_list(&row))?;
        t.push(")");
        Ok(true)
    } else {
        t.render_rows_as_selects(std::slice::from_ref(&row), names)?;
        Ok(false)
    }
}

/// `WHEN NOT MATCHED [AND cond] THEN INSERT (..) VALUES (s.a, ..) [WHERE cond]`
fn render_when_not_matched(
    t: &mut SqlTranslator<'_>,
    update: &OptionalTableUpdate,
    names: &[String],
    condition_in_when: bool,
) -> TranslateResult<()> {
    let condition = (update.optional && !update.value_bindings.is_empty()).then(|| any_value_present(update));

    t.push(" WHEN NOT MATCHED");
    if let (true, Some(condition)) = (condition_in_when, &condition) {
        t.push(" AND ");
        render_condition(t, std::slice::from_ref(condition))?;
    }
    t.push(" THEN INSERT (");
    t.push(&names.join(", "));
    t.push(") VALUES (");
    let source: Vec<Expr> = names.iter().map(|name| Expr::column(SOURCE, name.as_str())).collect();
    t.with_clause(Clause::Values, |t| t.render_expr_list(&source))?;
    t.push(")");
    if let (false, Some(condition)) = (condition_in_when, &condition) {
        t.push(" WHERE ");
        render_condition(t, std::slice::from_ref(condition))?;
    }
    Ok(())
}

/// `x=s.x, y=s.y`
fn render_source_assignments(t: &mut SqlTranslator<'_>, update: &OptionalTableUpdate) -> TranslateResult<()> {
    let assignments: Vec<Assignment> = update
        .value_bindings
        .iter()
        .map(|b| {
            Assignment::new(
                ColumnReference::unqualified(b.column.as_str()),
                Expr::column(SOURCE, b.column.as_str()),
            )
        })
        .collect();
    render_assignments(t, &assignments)
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// INSERT with conflict clause

fn render_on_conflict(
    update: &OptionalTableUpdate,
    dialect: &DialectDescriptor,
    options: TranslateOptions,
) -> TranslateResult<CompiledStatement> {
    let mut t = SqlTranslator::new(dialect, options);
    render_insert(&mut t, &insert_statement(update))?;

    let keys: Vec<&str> = update.key_bindings.iter().map(|b| b.column.as_str()).collect();
    t.push(" ON CONFLICT (");
    t.push(&keys.join(", "));
    t.push(")");
    if update.value_bindings.is_empty() {
        t.push(" DO NOTHING");
        return Ok(t.finish());
    }

    t.push(" DO UPDATE SET ");
    let assignments: Vec<Assignment> = update
        .value_bindings
        .iter()
        .map(|b| {
            Assignment::new(
                ColumnReference::unqualified(b.column.as_str()),
                Expr::column("excluded", b.column.as_str()),
            )
        })
        .collect();
    render_assignments(&mut t, &assignments)?;
    if let Some(lock) = lock_predicate(update, &update.table) {
        t.push(" WHERE ");
        render_condition(&mut t, &[lock])?;
    }
    Ok(t.finish())
}

fn render_on_duplicate_key(
    update: &OptionalTableUpdate,
    dialect: &DialectDescriptor,
    options: TranslateOptions,
) -> TranslateResult<CompiledStatement> {
    let mut t = SqlTranslator::new(dialect, options);
    render_insert(&mut t, &insert_statement(update))?;

    t.push(" ON DUPLICATE KEY UPDATE ");
    // Without value columns a no-op assignment keeps the statement valid.
    let updated = if update.value_bindings.is_empty() {
        &update.key_bindings[..1]
    } else {
        &update.value_bindings[..]
    };
    let assignments: Vec<Assignment> = updated
        .iter()
        .map(|b| {
            Assignment::new(
                ColumnReference::unqualified(b.column.as_str()),
                Expr::function("VALUES", vec![ColumnReference::unqualified(b.column.as_str()).into()]),
            )
        })
        .collect();
    render_assignments(&mut t, &assignments)?;
    Ok(t.finish())
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Update-or-insert sequence

fn render_update_or_insert(
    update: &OptionalTableUpdate,
    dialect: &DialectDescriptor,
    options: TranslateOptions,
) -> TranslateResult<MutationOperation> {
    if update.value_bindings.is_empty() {
        return Err(TranslateError::unsupported(format!(
            "{} has no insert-if-missing form for {} without value columns",
            dialect.name, update.table
        )));
    }

    let target = TableReference::unaliased(update.table.as_str());
    let conditions: Vec<Predicate> = update
        .key_bindings
        .iter()
        .chain(&update.optimistic_lock_bindings)
        .map(|b| Predicate::equal(ColumnReference::unqualified(b.column.as_str()), b.value.clone()))
        .collect();
    let restriction = Predicate::and(conditions);

    let update_statement = Statement::Update(UpdateStatement {
        target: target.clone(),
        assignments: update
            .value_bindings
            .iter()
            .map(|b| Assignment::new(ColumnReference::unqualified(b.column.as_str()), b.value.clone()))
            .collect(),
        restriction: restriction.clone(),
    });
    let delete_statement = update.optional.then(|| {
        Statement::Delete(DeleteStatement {
            target,
            restriction,
        })
    });

    Ok(MutationOperation::UpdateOrInsert {
        update: SqlTranslator::new(dialect, options).translate(&update_statement)?,
        insert: SqlTranslator::new(dialect, options).translate(&Statement::Insert(insert_statement(update)))?,
        delete: delete_statement
            .map(|stmt| SqlTranslator::new(dialect, options).translate(&stmt))
            .transpose()?,
    })
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Shared pieces

fn insert_statement(update: &OptionalTableUpdate) -> InsertStatement {
    let bindings = update.key_bindings.iter().chain(&update.value_bindings);
    InsertStatement {
        target: TableReference::unaliased(update.table.as_str()),
        columns: bindings.clone().map(|b| b.column.clone()).collect(),
        source: InsertSource::Values(vec![bindings.map(|b| b.value.clone()).collect()]),
    }
}

/// `t.k=s.k` for every key column.
fn key_equalities(update: &OptionalTableUpdate) -> Vec<Predicate> {
    update
        .key_bindings
        .iter()
        .map(|b| Predicate::equal(Expr::column(TARGET, b.column.as_str()), Expr::column(SOURCE, b.column.as_str())))
        .collect()
}

fn all_values_null(update: &OptionalTableUpdate) -> Predicate {
    Predicate::Junction {
        nature: JunctionNature::Conjunction,
        predicates: update
            .value_bindings
            .iter()
            .map(|b| Predicate::is_null(Expr::column(SOURCE, b.column.as_str())))
            .collect(),
    }
}

fn any_value_present(update: &OptionalTableUpdate) -> Predicate {
    Predicate::Junction {
        nature: JunctionNature::Disjunction,
        predicates: update
            .value_bindings
            .iter()
            .map(|b| Predicate::is_not_null(Expr::column(SOURCE, b.column.as_str())))
            .collect(),
    }
}

/// `q.v=? AND ..` over the optimistic lock columns.
fn lock_predicate(update: &OptionalTableUpdate, qualifier: &str) -> Option<Predicate> {
    Predicate::and(
        update
            .optimistic_lock_bindings
            .iter()
            .map(|b| Predicate::equal(Expr::column(qualifier, b.column.as_str()), b.value.clone()))
            .collect(),
    )
}

/// Conjunction of `conditions`, rendered as a WHERE-clause predicate.
fn render_condition(t: &mut SqlTranslator<'_>, conditions: &[Predicate]) -> TranslateResult<()> {
    let conjunction = Predicate::Junction {
        nature: JunctionNature::Conjunction,
        predicates: conditions.to_vec(),
    };
    t.with_clause(Clause::Where, |t| t.render_predicate(&conjunction))
}

fn render_assignments(t: &mut SqlTranslator<'_>, assignments: &[Assignment]) -> TranslateResult<()> {
    t.with_clause(Clause::Set, |t| {
        for (i, assignment) in assignments.iter().enumerate() {
            if i > 0 {
                t.push(", ");
            }
            t.render_assignment(assignment)?;
        }
        Ok(())
    })
}
