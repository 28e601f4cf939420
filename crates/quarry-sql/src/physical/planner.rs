//! Lowering of logical plans to physical operators.
//!
//! Every logical operator maps to exactly one physical operator. Children
//! are lowered first and attached in their original order, so the physical
//! tree has the same shape as the logical one.

use tracing::{debug, warn};

use quarry_common::error::{QuarryError, QuarryResult};

use super::delete::DeletePhysicalOperator;
use super::explain::ExplainPhysicalOperator;
use super::insert::InsertPhysicalOperator;
use super::join::NestedLoopJoinOperator;
use super::operator::PhysicalOperator;
use super::predicate::PredicatePhysicalOperator;
use super::project::ProjectPhysicalOperator;
use super::scan::TableScanOperator;
use super::update::UpdatePhysicalOperator;
use crate::expr::TupleCellSpec;
use crate::logical::{LogicalOperator, LogicalPlan};

/// Turns logical plans into executable operator trees.
#[derive(Debug, Default, Clone)]
pub struct PhysicalPlanGenerator;

impl PhysicalPlanGenerator {
    /// Creates a generator.
    pub fn new() -> Self {
        Self
    }

    /// Lowers `plan`. The logical tree is consumed.
    ///
    /// Any failure aborts the whole lowering.
    pub fn create(&self, plan: LogicalPlan) -> QuarryResult<PhysicalOperator> {
        let physical = self.create_operator(plan.into_root())?;
        debug!(root = physical.name(), "created physical plan");
        Ok(physical)
    }

    fn create_operator(&self, op: LogicalOperator) -> QuarryResult<PhysicalOperator> {
        Ok(match op {
            LogicalOperator::TableGet(scan) => PhysicalOperator::TableScan(
                TableScanOperator::new(scan.table, scan.readonly, scan.predicates),
            ),

            LogicalOperator::Predicate(pred) => {
                let child = self.create_operator(*pred.input)?;
                PhysicalOperator::Predicate(PredicatePhysicalOperator::new(child, pred.expression))
            }

            LogicalOperator::Project(project) => {
                let qualified = count_scans(&project.input) > 1;
                let child = self.create_operator(*project.input)?;
                let specs = project.fields.iter().map(TupleCellSpec::from).collect();
                PhysicalOperator::Project(ProjectPhysicalOperator::new(child, specs, qualified))
            }

            LogicalOperator::Join(join) => {
                let left = self.create_operator(*join.left)?;
                let right = self.create_operator(*join.right)?;
                PhysicalOperator::NestedLoopJoin(NestedLoopJoinOperator::new(left, right))
            }

            LogicalOperator::Insert(insert) => {
                PhysicalOperator::Insert(InsertPhysicalOperator::new(insert.table, insert.values))
            }

            LogicalOperator::Update(update) => {
                let child = self.create_operator(*update.input)?;
                PhysicalOperator::Update(UpdatePhysicalOperator::new(
                    child,
                    update.table,
                    update.assignments,
                ))
            }

            LogicalOperator::Delete(delete) => {
                let child = self.create_operator(*delete.input)?;
                PhysicalOperator::Delete(DeletePhysicalOperator::new(child, delete.table))
            }

            LogicalOperator::Explain(explain) => {
                if matches!(explain.input.as_ref(), LogicalOperator::Explain(_)) {
                    warn!("nested explain has no physical plan");
                    return Err(QuarryError::unimplemented("explain of an explain"));
                }
                let child = self.create_operator(*explain.input)?;
                PhysicalOperator::Explain(ExplainPhysicalOperator::new(child))
            }
        })
    }
}

fn count_scans(op: &LogicalOperator) -> usize {
    match op {
        LogicalOperator::TableGet(_) => 1,
        other => other.children().into_iter().map(count_scans).sum(),
    }
}
