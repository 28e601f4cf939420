use std::sync::Arc;

use quarry_common::error::QuarryResult;

use super::PhysicalOperator;
use crate::expr::{ProjectTuple, Tuple, TupleCellSpec};
use crate::trx::ExecContext;

/// Projects child tuples onto a list of cells.
#[derive(Debug)]
pub struct ProjectPhysicalOperator {
    child: Box<PhysicalOperator>,
    specs: Arc<[TupleCellSpec]>,
    qualified: bool,
}

impl ProjectPhysicalOperator {
    /// Creates a projection. With `qualified`, header names carry the
    /// table name.
    pub fn new(child: PhysicalOperator, specs: Vec<TupleCellSpec>, qualified: bool) -> Self {
        Self {
            child: Box::new(child),
            specs: specs.into(),
            qualified,
        }
    }

    /// Returns the projected cells.
    pub fn specs(&self) -> &[TupleCellSpec] {
        &self.specs
    }

    /// Returns the child.
    pub fn child(&self) -> &PhysicalOperator {
        &self.child
    }

    /// Returns the output column names.
    pub fn header(&self) -> Vec<String> {
        self.specs
            .iter()
            .map(|spec| {
                if self.qualified {
                    spec.to_string()
                } else {
                    spec.field_name().to_string()
                }
            })
            .collect()
    }

    pub(crate) fn open(&mut self, ctx: &mut ExecContext<'_>) -> QuarryResult<()> {
        self.child.open(ctx)
    }

    pub(crate) fn next(&mut self, ctx: &mut ExecContext<'_>) -> QuarryResult<Option<Tuple>> {
        Ok(self
            .child
            .next(ctx)?
            .map(|tuple| Tuple::Project(ProjectTuple::new(Arc::clone(&self.specs), tuple))))
    }

    pub(crate) fn close(&mut self, ctx: &mut ExecContext<'_>) -> QuarryResult<()> {
        self.child.close(ctx)
    }
}
