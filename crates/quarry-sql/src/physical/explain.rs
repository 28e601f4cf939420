use quarry_common::error::QuarryResult;

use super::PhysicalOperator;
use crate::expr::{Tuple, TupleCellSpec, ValueListTuple};
use crate::storage::Value;
use crate::trx::ExecContext;

/// Header of the single explain output column.
pub const EXPLAIN_COLUMN: &str = "Query Plan";

/// Describes the child plan as one single-cell tuple.
///
/// The child is never opened or run.
#[derive(Debug)]
pub struct ExplainPhysicalOperator {
    child: Box<PhysicalOperator>,
    emitted: bool,
}

impl ExplainPhysicalOperator {
    /// Creates an explain of `child`.
    pub fn new(child: PhysicalOperator) -> Self {
        Self {
            child: Box::new(child),
            emitted: false,
        }
    }

    /// Returns the explained plan.
    pub fn child(&self) -> &PhysicalOperator {
        &self.child
    }

    pub(crate) fn open(&mut self, _ctx: &mut ExecContext<'_>) -> QuarryResult<()> {
        self.emitted = false;
        Ok(())
    }

    pub(crate) fn next(&mut self, _ctx: &mut ExecContext<'_>) -> QuarryResult<Option<Tuple>> {
        if self.emitted {
            return Ok(None);
        }
        self.emitted = true;

        let plan = self.child.format_tree();
        Ok(Some(Tuple::ValueList(ValueListTuple::new(
            vec![TupleCellSpec::unqualified(EXPLAIN_COLUMN)],
            vec![Value::Chars(plan)],
        ))))
    }

    pub(crate) fn close(&mut self, _ctx: &mut ExecContext<'_>) -> QuarryResult<()> {
        Ok(())
    }
}
