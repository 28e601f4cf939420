//! Query error types.
//!
//! End-of-stream is not represented here: executors signal it with
//! `Ok(None)` from `next`.

use std::fmt;
use thiserror::Error;

use crate::types::RecordId;

/// Error codes for categorizing errors.
///
/// These codes can be used for programmatic error handling and
/// are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General errors (0x0000 - 0x00FF)
    /// Internal error (bug).
    Internal = 0x0001,
    /// Statement or operator shape is not supported.
    Unimplemented = 0x0002,
    /// Invalid argument provided.
    InvalidArgument = 0x0003,
    /// Invalid configuration.
    InvalidConfig = 0x0004,

    // Schema errors (0x0100 - 0x01FF)
    /// Table does not exist.
    SchemaTableNotFound = 0x0100,
    /// Table already exists.
    SchemaTableExists = 0x0101,
    /// Field does not exist.
    SchemaFieldNotFound = 0x0102,
    /// Wrong number of values for a table.
    SchemaFieldMissing = 0x0103,
    /// Value type does not match the field type.
    SchemaFieldTypeMismatch = 0x0104,

    // Record errors (0x0200 - 0x02FF)
    /// Record not found.
    RecordNotFound = 0x0200,
    /// Record bytes could not be decoded.
    RecordCorrupted = 0x0201,

    // Planning errors (0x0300 - 0x03FF)
    /// Rewrite loop did not converge.
    RewriteDiverged = 0x0300,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "Schema",
            0x02 => "Record",
            0x03 => "Planning",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The main error type for Quarry.
///
/// # Example
///
/// ```rust
/// use quarry_common::error::{ErrorCode, QuarryError};
///
/// let err = QuarryError::SchemaFieldNotFound {
///     table: "t".to_string(),
///     field: "missing".to_string(),
/// };
/// assert_eq!(err.code(), ErrorCode::SchemaFieldNotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuarryError {
    // ==========================================================================
    // General Errors
    // ==========================================================================
    /// Internal error - this indicates a bug.
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },

    /// Statement or operator shape not supported.
    #[error("unimplemented: {what}")]
    Unimplemented {
        /// What was not supported.
        what: String,
    },

    /// Invalid argument provided.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Error message.
        message: String,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },

    // ==========================================================================
    // Schema Errors
    // ==========================================================================
    /// Table not found.
    #[error("table '{table}' not found")]
    SchemaTableNotFound {
        /// The missing table.
        table: String,
    },

    /// Table already exists.
    #[error("table '{table}' already exists")]
    SchemaTableExists {
        /// The duplicate table.
        table: String,
    },

    /// Field not found.
    #[error("field '{field}' not found in table '{table}'")]
    SchemaFieldNotFound {
        /// The table name.
        table: String,
        /// The missing field.
        field: String,
    },

    /// Wrong number of values.
    #[error("table '{table}' expects {expected} values, got {actual}")]
    SchemaFieldMissing {
        /// The table name.
        table: String,
        /// Expected value count.
        expected: usize,
        /// Actual value count.
        actual: usize,
    },

    /// Type mismatch.
    #[error("field type mismatch on '{table}.{field}': {message}")]
    SchemaFieldTypeMismatch {
        /// The table name.
        table: String,
        /// The offending field.
        field: String,
        /// Error message.
        message: String,
    },

    // ==========================================================================
    // Record Errors
    // ==========================================================================
    /// Record not found.
    #[error("record {rid} not found")]
    RecordNotFound {
        /// The missing record.
        rid: RecordId,
    },

    /// Record bytes are corrupted.
    #[error("record corrupted: {message}")]
    RecordCorrupted {
        /// Description of the corruption.
        message: String,
    },

    // ==========================================================================
    // Planning Errors
    // ==========================================================================
    /// Rewrite loop hit its iteration cap while rules were still firing.
    #[error("rewrite did not reach a fixpoint after {iterations} iterations")]
    RewriteDiverged {
        /// Number of passes performed.
        iterations: usize,
    },
}

impl QuarryError {
    /// Returns the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Internal { .. } => ErrorCode::Internal,
            Self::Unimplemented { .. } => ErrorCode::Unimplemented,
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            Self::SchemaTableNotFound { .. } => ErrorCode::SchemaTableNotFound,
            Self::SchemaTableExists { .. } => ErrorCode::SchemaTableExists,
            Self::SchemaFieldNotFound { .. } => ErrorCode::SchemaFieldNotFound,
            Self::SchemaFieldMissing { .. } => ErrorCode::SchemaFieldMissing,
            Self::SchemaFieldTypeMismatch { .. } => ErrorCode::SchemaFieldTypeMismatch,
            Self::RecordNotFound { .. } => ErrorCode::RecordNotFound,
            Self::RecordCorrupted { .. } => ErrorCode::RecordCorrupted,
            Self::RewriteDiverged { .. } => ErrorCode::RewriteDiverged,
        }
    }

    /// Returns true for the unsupported-shape miss.
    #[must_use]
    pub const fn is_unimplemented(&self) -> bool {
        matches!(self, Self::Unimplemented { .. })
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates an unimplemented error.
    #[must_use]
    pub fn unimplemented(what: impl Into<String>) -> Self {
        Self::Unimplemented { what: what.into() }
    }

    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a field-not-found error.
    #[must_use]
    pub fn field_not_found(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self::SchemaFieldNotFound {
            table: table.into(),
            field: field.into(),
        }
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(
        table: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::SchemaFieldTypeMismatch {
            table: table.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}
