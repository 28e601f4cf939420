//! # quarry-sql
//!
//! Query planning and execution for Quarry.
//!
//! This crate implements:
//! - Statement resolution against an in-memory catalog
//! - Logical query planning
//! - Rule-based rewriting of logical plans
//! - Physical plan generation
//! - Pull-based execution under a caller-supplied transaction

#![warn(missing_docs)]
#![warn(clippy::all)]

/// In-memory tables, records and values
pub mod storage;

/// Transaction interface
pub mod trx;

/// Resolved statements and the parsed node layer
pub mod stmt;

/// Expressions and tuples
pub mod expr;

/// Logical plan representation
pub mod logical;

/// Logical plan rewriter
pub mod optimizer;

/// Physical operators and plan generation
pub mod physical;

/// Query execution
pub mod executor;
