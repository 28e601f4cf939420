//! Physical operators and plan generation.
//!
//! Unlike logical operators, which describe what to compute, physical
//! operators carry the state needed to compute it one tuple at a time.

mod delete;
mod explain;
mod insert;
mod join;
mod operator;
mod planner;
mod predicate;
mod project;
mod scan;
mod update;

pub use delete::DeletePhysicalOperator;
pub use explain::{ExplainPhysicalOperator, EXPLAIN_COLUMN};
pub use insert::InsertPhysicalOperator;
pub use join::NestedLoopJoinOperator;
pub use operator::PhysicalOperator;
pub use planner::PhysicalPlanGenerator;
pub use predicate::PredicatePhysicalOperator;
pub use project::ProjectPhysicalOperator;
pub use scan::TableScanOperator;
pub use update::{reconcile_record, UpdatePhysicalOperator};
