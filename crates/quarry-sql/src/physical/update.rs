use std::sync::Arc;

use tracing::{debug, warn};

use quarry_common::error::{QuarryError, QuarryResult};

use super::PhysicalOperator;
use crate::expr::{Tuple, TupleCellSpec};
use crate::stmt::Assignment;
use crate::storage::{Table, Value};
use crate::trx::ExecContext;

/// Rebuilds the full row of `table` for one updated tuple.
///
/// Walks every field in schema order. System fields and unassigned user
/// fields are copied from `tuple`; assigned user fields take the new value.
/// A field that cannot be found in `tuple` means the scan and the table
/// disagree, which is reported as a type mismatch.
pub fn reconcile_record(
    table: &Table,
    assignments: &[Assignment],
    tuple: &Tuple,
) -> QuarryResult<Vec<Value>> {
    let meta = table.meta();
    let sys_field_num = meta.sys_field_num();

    meta.field_metas()
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let assigned = (i >= sys_field_num)
                .then(|| assignments.iter().find(|a| a.field_name() == field.name()))
                .flatten();
            if let Some(assignment) = assigned {
                return Ok(assignment.value().clone());
            }

            tuple
                .find_cell(&TupleCellSpec::new(table.name(), field.name()))
                .cloned()
                .ok_or_else(|| {
                    warn!(table = table.name(), field = field.name(), "field missing from source tuple");
                    QuarryError::type_mismatch(
                        table.name(),
                        field.name(),
                        "field not found in source tuple",
                    )
                })
        })
        .collect()
}

/// Applies assignments to every tuple produced by the child.
///
/// The child is drained by the first `next` call, which then reports
/// end-of-stream. A failure stops the drain. Rows updated before the
/// failure stay updated.
#[derive(Debug)]
pub struct UpdatePhysicalOperator {
    child: Box<PhysicalOperator>,
    table: Arc<Table>,
    assignments: Vec<Assignment>,
    done: bool,
}

impl UpdatePhysicalOperator {
    /// Creates an update over `child`.
    pub fn new(child: PhysicalOperator, table: Arc<Table>, assignments: Vec<Assignment>) -> Self {
        Self {
            child: Box::new(child),
            table,
            assignments,
            done: false,
        }
    }

    /// Returns the target table.
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// Returns the assignments.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Returns the child.
    pub fn child(&self) -> &PhysicalOperator {
        &self.child
    }

    pub(crate) fn open(&mut self, ctx: &mut ExecContext<'_>) -> QuarryResult<()> {
        self.done = false;
        self.child.open(ctx)
    }

    pub(crate) fn next(&mut self, ctx: &mut ExecContext<'_>) -> QuarryResult<Option<Tuple>> {
        if self.done {
            return Ok(None);
        }
        self.done = true;

        let mut updated = 0usize;
        while let Some(tuple) = self.child.next(ctx)? {
            let Tuple::Row(row) = &tuple else {
                warn!(table = self.table.name(), "update input is not a stored row");
                return Err(QuarryError::internal("update input is not a stored row"));
            };

            let values = reconcile_record(&self.table, &self.assignments, &tuple)?;
            let mut new_record = self.table.make_record(&values).map_err(|e| {
                warn!(table = self.table.name(), error = %e, "failed to make record");
                e
            })?;
            ctx.trx()
                .update_record(&self.table, row.record(), &mut new_record)
                .map_err(|e| {
                    warn!(table = self.table.name(), rid = %row.record().rid(), error = %e, "failed to update record");
                    e
                })?;
            updated += 1;
        }

        debug!(table = self.table.name(), rows = updated, "update done");
        Ok(None)
    }

    pub(crate) fn close(&mut self, ctx: &mut ExecContext<'_>) -> QuarryResult<()> {
        self.child.close(ctx)
    }
}
