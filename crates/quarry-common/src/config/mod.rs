//! Configuration for Quarry.
//!
//! This module provides configuration structures for the query pipeline.

mod query;

pub use query::{QueryConfig, RewriteConfig, StorageConfig};
