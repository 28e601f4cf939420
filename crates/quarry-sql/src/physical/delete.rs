use std::sync::Arc;

use tracing::{debug, warn};

use quarry_common::error::{QuarryError, QuarryResult};

use super::PhysicalOperator;
use crate::expr::Tuple;
use crate::storage::Table;
use crate::trx::ExecContext;

/// Deletes every tuple produced by the child.
///
/// Same draining and failure behavior as the update operator.
#[derive(Debug)]
pub struct DeletePhysicalOperator {
    child: Box<PhysicalOperator>,
    table: Arc<Table>,
    done: bool,
}

impl DeletePhysicalOperator {
    /// Creates a delete over `child`.
    pub fn new(child: PhysicalOperator, table: Arc<Table>) -> Self {
        Self {
            child: Box::new(child),
            table,
            done: false,
        }
    }

    /// Returns the target table.
    pub fn table(&self) -> &Arc<Table> {
        &self.table
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

        let mut deleted = 0usize;
        while let Some(tuple) = self.child.next(ctx)? {
            let Tuple::Row(row) = &tuple else {
                warn!(table = self.table.name(), "delete input is not a stored row");
                return Err(QuarryError::internal("delete input is not a stored row"));
            };
            ctx.trx()
                .delete_record(&self.table, row.record())
                .map_err(|e| {
                    warn!(table = self.table.name(), rid = %row.record().rid(), error = %e, "failed to delete record");
                    e
                })?;
            deleted += 1;
        }

        debug!(table = self.table.name(), rows = deleted, "delete done");
        Ok(None)
    }

    pub(crate) fn close(&mut self, ctx: &mut ExecContext<'_>) -> QuarryResult<()> {
        self.child.close(ctx)
    }
}
