use tracing::debug;

use quarry_common::error::QuarryResult;

use super::PhysicalOperator;
use crate::expr::{Expression, Tuple};
use crate::trx::ExecContext;

/// Passes through the child tuples for which the expression holds.
#[derive(Debug)]
pub struct PredicatePhysicalOperator {
    child: Box<PhysicalOperator>,
    expression: Expression,
}

impl PredicatePhysicalOperator {
    /// Creates a filter over `child`.
    pub fn new(child: PhysicalOperator, expression: Expression) -> Self {
        Self {
            child: Box::new(child),
            expression,
        }
    }

    /// Returns the filter expression.
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Returns the child.
    pub fn child(&self) -> &PhysicalOperator {
        &self.child
    }

    pub(crate) fn open(&mut self, ctx: &mut ExecContext<'_>) -> QuarryResult<()> {
        debug!(predicate = %self.expression, "open predicate");
        self.child.open(ctx)
    }

    pub(crate) fn next(&mut self, ctx: &mut ExecContext<'_>) -> QuarryResult<Option<Tuple>> {
        while let Some(tuple) = self.child.next(ctx)? {
            if self.expression.get_value(&tuple)?.is_truthy() {
                return Ok(Some(tuple));
            }
        }
        Ok(None)
    }

    pub(crate) fn close(&mut self, ctx: &mut ExecContext<'_>) -> QuarryResult<()> {
        self.child.close(ctx)
    }
}
