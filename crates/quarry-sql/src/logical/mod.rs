//! Logical query plan representation.
//!
//! Logical plans describe what relational operations a statement performs,
//! independent of how the physical operators carry them out.

mod builder;
mod operator;
mod plan;

pub use builder::{build_predicate, LogicalPlanBuilder};
pub use operator::*;
pub use plan::LogicalPlan;
