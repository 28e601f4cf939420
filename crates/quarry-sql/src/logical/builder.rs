//! Logical plan builder.
//!
//! Converts resolved statements into logical plans. One construction rule
//! per statement kind:
//!
//! ```text
//! SELECT   Project <- [Predicate <-] TableGet | Join(Join(t1, t2), t3) ...
//! UPDATE   Update  <- [Predicate <-] TableGet(for write)
//! DELETE   Delete  <- [Predicate <-] TableGet(for write)
//! INSERT   Insert
//! EXPLAIN  Explain <- plan of the wrapped statement
//! ```

use std::sync::Arc;

use tracing::{debug, warn};

use quarry_common::error::{QuarryError, QuarryResult};

use super::operator::*;
use super::plan::LogicalPlan;
use crate::expr::Expression;
use crate::stmt::{
    DeleteStmt, ExplainStmt, Field, FilterObj, FilterStmt, InsertStmt, SelectStmt, Stmt,
    UpdateStmt,
};
use crate::storage::Table;

/// Builds the conjunction for a filter.
///
/// Returns `None` for an empty filter. Otherwise the result is one AND with
/// one comparison per filter unit, in filter order.
pub fn build_predicate(filter: &FilterStmt) -> Option<Expression> {
    if filter.is_empty() {
        return None;
    }

    let comparisons = filter
        .units()
        .iter()
        .map(|unit| {
            Expression::comparison(
                unit.comp(),
                filter_obj_expr(unit.left()),
                filter_obj_expr(unit.right()),
            )
        })
        .collect();
    Some(Expression::and(comparisons))
}

fn filter_obj_expr(obj: &FilterObj) -> Expression {
    match obj {
        FilterObj::Attr(field) => Expression::Field(field.clone()),
        FilterObj::Value(value) => Expression::Value(value.clone()),
    }
}

/// Turns statements into logical plans.
#[derive(Debug, Default, Clone)]
pub struct LogicalPlanBuilder;

impl LogicalPlanBuilder {
    /// Creates a builder.
    pub fn new() -> Self {
        Self
    }

    /// Builds the logical plan for `stmt`.
    ///
    /// Statement kinds without a plan shape yield `Unimplemented`. That
    /// outcome is expected by callers probing support and is not logged.
    pub fn build(&self, stmt: &Stmt) -> QuarryResult<LogicalPlan> {
        let root = self.build_operator(stmt)?;
        debug!(kind = %stmt.kind(), root = root.name(), "built logical plan");
        Ok(LogicalPlan::new(root))
    }

    fn build_operator(&self, stmt: &Stmt) -> QuarryResult<LogicalOperator> {
        match stmt {
            Stmt::Select(select) => self.build_select(select),
            Stmt::Insert(insert) => Ok(self.build_insert(insert)),
            Stmt::Update(update) => Ok(self.build_update(update)),
            Stmt::Delete(delete) => Ok(self.build_delete(delete)),
            Stmt::Explain(explain) => self.build_explain(explain),
            Stmt::CreateTable(_) | Stmt::DropTable(_) => Err(QuarryError::unimplemented(
                format!("logical plan for {}", stmt.kind()),
            )),
        }
    }

    fn build_select(&self, select: &SelectStmt) -> QuarryResult<LogicalOperator> {
        let predicate = build_predicate(select.filter());

        let mut plan: Option<LogicalOperator> = None;
        for table in select.tables() {
            let fields = scan_fields(table, select.query_fields(), predicate.as_ref());
            let scan = LogicalOperator::TableGet(TableGetOperator::new(
                Arc::clone(table),
                fields,
                true,
            ));
            plan = Some(match plan {
                None => scan,
                Some(left) => LogicalOperator::Join(JoinOperator {
                    left: Box::new(left),
                    right: Box::new(scan),
                }),
            });
        }

        let Some(mut input) = plan else {
            warn!("select without tables");
            return Err(QuarryError::invalid_argument("select needs at least one table"));
        };

        if let Some(expression) = predicate {
            input = LogicalOperator::Predicate(PredicateOperator {
                input: Box::new(input),
                expression,
            });
        }

        Ok(LogicalOperator::Project(ProjectOperator {
            input: Box::new(input),
            fields: select.query_fields().to_vec(),
        }))
    }

    fn build_insert(&self, insert: &InsertStmt) -> LogicalOperator {
        LogicalOperator::Insert(InsertOperator {
            table: Arc::clone(insert.table()),
            values: insert.values().to_vec(),
        })
    }

    fn build_update(&self, update: &UpdateStmt) -> LogicalOperator {
        let input = Box::new(self.build_write_scan(update.table(), update.filter()));
        LogicalOperator::Update(UpdateOperator {
            input,
            table: Arc::clone(update.table()),
            assignments: update.assignments().to_vec(),
        })
    }

    fn build_delete(&self, delete: &DeleteStmt) -> LogicalOperator {
        let input = Box::new(self.build_write_scan(delete.table(), delete.filter()));
        LogicalOperator::Delete(DeleteOperator {
            input,
            table: Arc::clone(delete.table()),
        })
    }

    /// TableGet over the user fields, for write, under an optional Predicate.
    fn build_write_scan(&self, table: &Arc<Table>, filter: &FilterStmt) -> LogicalOperator {
        let fields = table
            .meta()
            .user_fields()
            .iter()
            .map(|meta| Field::new(Arc::clone(table), meta.clone()))
            .collect();
        let scan = LogicalOperator::TableGet(TableGetOperator::new(Arc::clone(table), fields, false));

        match build_predicate(filter) {
            Some(expression) => LogicalOperator::Predicate(PredicateOperator {
                input: Box::new(scan),
                expression,
            }),
            None => scan,
        }
    }

    fn build_explain(&self, explain: &ExplainStmt) -> QuarryResult<LogicalOperator> {
        let child = self.build_operator(explain.child()).map_err(|e| {
            warn!(error = %e, "failed to build plan for explained statement");
            e
        })?;
        Ok(LogicalOperator::Explain(ExplainOperator {
            input: Box::new(child),
        }))
    }
}

/// Fields of `table` referenced by the select list or the predicate.
fn scan_fields(
    table: &Arc<Table>,
    query_fields: &[Field],
    predicate: Option<&Expression>,
) -> Vec<Field> {
    let mut fields: Vec<Field> = Vec::new();
    let mut push = |field: &Field| {
        if field.table_name() == table.name() && !fields.contains(field) {
            fields.push(field.clone());
        }
    };

    for field in query_fields {
        push(field);
    }
    if let Some(predicate) = predicate {
        for conjunct in predicate.conjuncts() {
            if let Expression::Comparison { left, right, .. } = conjunct {
                for side in [left.as_ref(), right.as_ref()] {
                    if let Expression::Field(field) = side {
                        push(field);
                    }
                }
            }
        }
    }
    fields
}
