//! Error handling for Quarry.
//!
//! This module provides a unified error type and result alias used
//! across the planning and execution layers.

mod query;

pub use query::{ErrorCode, QuarryError};

/// Result type alias for Quarry operations.
pub type QuarryResult<T> = std::result::Result<T, QuarryError>;
