//! # quarry-common
//!
//! Common types, errors, and configuration for Quarry.
//!
//! This crate provides the foundational pieces shared by the query
//! pipeline:
//!
//! - **Types**: Core identifiers (`RecordId`, `TableId`, `TrxId`)
//! - **Errors**: Unified error handling with `QuarryError`
//! - **Config**: Rewrite and storage configuration structures
//!
//! ## Example
//!
//! ```rust
//! use quarry_common::error::{QuarryError, QuarryResult};
//! use quarry_common::types::RecordId;
//!
//! fn lookup(rid: RecordId) -> QuarryResult<()> {
//!     Err(QuarryError::RecordNotFound { rid })
//! }
//!
//! assert!(lookup(RecordId::new(7)).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod types;

pub use error::{ErrorCode, QuarryError, QuarryResult};
pub use types::{RecordId, TableId, TrxId};
