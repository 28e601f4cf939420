use std::sync::Arc;

use tracing::debug;

use quarry_common::error::QuarryResult;
use quarry_common::types::RecordId;

use crate::expr::{Expression, RowTuple, Tuple};
use crate::storage::Table;
use crate::trx::ExecContext;

/// Sequential scan over a table.
///
/// The scan remembers the id of the last record it returned instead of
/// holding any lock, so the consumer may delete or replace that record
/// before asking for the next one.
#[derive(Debug)]
pub struct TableScanOperator {
    table: Arc<Table>,
    readonly: bool,
    predicates: Vec<Expression>,
    cursor: Option<RecordId>,
}

impl TableScanOperator {
    /// Creates a scan. `predicates` are evaluated against every row.
    pub fn new(table: Arc<Table>, readonly: bool, predicates: Vec<Expression>) -> Self {
        Self {
            table,
            readonly,
            predicates,
            cursor: None,
        }
    }

    /// Returns the scanned table.
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// Returns false if the scan feeds a mutation.
    pub fn readonly(&self) -> bool {
        self.readonly
    }

    /// Returns the pushed-down predicates.
    pub fn predicates(&self) -> &[Expression] {
        &self.predicates
    }

    pub(crate) fn open(&mut self, _ctx: &mut ExecContext<'_>) -> QuarryResult<()> {
        debug!(table = self.table.name(), readonly = self.readonly, "open table scan");
        self.cursor = None;
        Ok(())
    }

    pub(crate) fn next(&mut self, ctx: &mut ExecContext<'_>) -> QuarryResult<Option<Tuple>> {
        while let Some(record) = self.table.next_record(self.cursor) {
            self.cursor = Some(record.rid());

            if !ctx.trx().visit_record(&self.table, &record, self.readonly)? {
                continue;
            }

            let tuple = Tuple::Row(RowTuple::new(Arc::clone(&self.table), record)?);
            if self.filter(&tuple)? {
                return Ok(Some(tuple));
            }
        }
        Ok(None)
    }

    pub(crate) fn close(&mut self, _ctx: &mut ExecContext<'_>) -> QuarryResult<()> {
        debug!(table = self.table.name(), "close table scan");
        self.cursor = None;
        Ok(())
    }

    fn filter(&self, tuple: &Tuple) -> QuarryResult<bool> {
        for predicate in &self.predicates {
            if !predicate.get_value(tuple)?.is_truthy() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
