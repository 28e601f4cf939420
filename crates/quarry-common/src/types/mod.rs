//! Type definitions for Quarry.
//!
//! This module contains the identifier types shared across crates.

mod ids;

pub use ids::{RecordId, TableId, TrxId};
