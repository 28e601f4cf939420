use tracing::debug;

use quarry_common::error::QuarryResult;

use super::PhysicalOperator;
use crate::expr::{JoinedTuple, Tuple};
use crate::trx::ExecContext;

/// Cartesian product of two inputs.
///
/// For every left tuple the right child is opened, drained and closed.
#[derive(Debug)]
pub struct NestedLoopJoinOperator {
    left: Box<PhysicalOperator>,
    right: Box<PhysicalOperator>,
    left_tuple: Option<Tuple>,
    right_open: bool,
}

impl NestedLoopJoinOperator {
    /// Creates a join.
    pub fn new(left: PhysicalOperator, right: PhysicalOperator) -> Self {
        Self {
            left: Box::new(left),
            right: Box::new(right),
            left_tuple: None,
            right_open: false,
        }
    }

    /// Returns the left child.
    pub fn left(&self) -> &PhysicalOperator {
        &self.left
    }

    /// Returns the right child.
    pub fn right(&self) -> &PhysicalOperator {
        &self.right
    }

    pub(crate) fn open(&mut self, ctx: &mut ExecContext<'_>) -> QuarryResult<()> {
        debug!("open nested loop join");
        self.left_tuple = None;
        self.right_open = false;
        self.left.open(ctx)
    }

    pub(crate) fn next(&mut self, ctx: &mut ExecContext<'_>) -> QuarryResult<Option<Tuple>> {
        loop {
            if self.left_tuple.is_none() {
                let Some(tuple) = self.left.next(ctx)? else {
                    return Ok(None);
                };
                self.rewind_right(ctx)?;
                self.left_tuple = Some(tuple);
            }

            let Some(right_tuple) = self.right.next(ctx)? else {
                self.left_tuple = None;
                continue;
            };
            if let Some(left_tuple) = &self.left_tuple {
                let joined = JoinedTuple::new(left_tuple.clone(), right_tuple);
                return Ok(Some(Tuple::Joined(joined)));
            }
        }
    }

    fn rewind_right(&mut self, ctx: &mut ExecContext<'_>) -> QuarryResult<()> {
        if self.right_open {
            self.right_open = false;
            self.right.close(ctx)?;
        }
        self.right.open(ctx)?;
        self.right_open = true;
        Ok(())
    }

    pub(crate) fn close(&mut self, ctx: &mut ExecContext<'_>) -> QuarryResult<()> {
        self.left_tuple = None;
        let left = self.left.close(ctx);
        let right = if self.right_open {
            self.right_open = false;
            self.right.close(ctx)
        } else {
            Ok(())
        };
        left.and(right)
    }
}
