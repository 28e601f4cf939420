use std::sync::Arc;

use tracing::{debug, warn};

use quarry_common::error::QuarryResult;

use crate::expr::Tuple;
use crate::storage::{Table, Value};
use crate::trx::ExecContext;

/// Inserts one row.
///
/// The row is written by the first `next` call. Every call, including the
/// first, then reports end-of-stream.
#[derive(Debug)]
pub struct InsertPhysicalOperator {
    table: Arc<Table>,
    values: Vec<Value>,
    done: bool,
}

impl InsertPhysicalOperator {
    /// Creates an insert of the user field `values` into `table`.
    pub fn new(table: Arc<Table>, values: Vec<Value>) -> Self {
        Self {
            table,
            values,
            done: false,
        }
    }

    /// Returns the target table.
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// Returns the inserted values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub(crate) fn open(&mut self, _ctx: &mut ExecContext<'_>) -> QuarryResult<()> {
        self.done = false;
        Ok(())
    }

    pub(crate) fn next(&mut self, ctx: &mut ExecContext<'_>) -> QuarryResult<Option<Tuple>> {
        if self.done {
            return Ok(None);
        }
        self.done = true;

        let meta = self.table.meta();
        let mut row: Vec<Value> = meta.field_metas()[..meta.sys_field_num()]
            .iter()
            .map(|field| field.attr_type().default_value())
            .collect();
        row.extend(self.values.iter().cloned());

        let mut record = self.table.make_record(&row).map_err(|e| {
            warn!(table = self.table.name(), error = %e, "failed to make record");
            e
        })?;
        ctx.trx().insert_record(&self.table, &mut record).map_err(|e| {
            warn!(table = self.table.name(), error = %e, "failed to insert record");
            e
        })?;

        debug!(table = self.table.name(), rid = %record.rid(), "insert done");
        Ok(None)
    }

    pub(crate) fn close(&mut self, _ctx: &mut ExecContext<'_>) -> QuarryResult<()> {
        Ok(())
    }
}
