//! Transaction interface used by the physical operators.
//!
//! Operators never hold a transaction. The driver owns it and lends it to
//! every `open`/`next`/`close` call through an [`ExecContext`].

mod vacuous;

pub use vacuous::VacuousTrx;

use quarry_common::error::QuarryResult;
use quarry_common::types::TrxId;

use crate::storage::{Record, Table};

/// Row-level operations performed on behalf of one query.
///
/// Each call is atomic for a single row. Nothing here promises atomicity
/// across rows: a mutation operator that fails half way through leaves the
/// rows it already changed in place, and undoing them is `rollback`'s job.
pub trait Trx {
    /// Returns the transaction id.
    fn id(&self) -> TrxId;

    /// Stores a new record. The table assigns its record id.
    fn insert_record(&mut self, table: &Table, record: &mut Record) -> QuarryResult<()>;

    /// Removes a record.
    fn delete_record(&mut self, table: &Table, record: &Record) -> QuarryResult<()>;

    /// Replaces `old` with `new`, keeping the identity of `old`.
    fn update_record(&mut self, table: &Table, old: &Record, new: &mut Record)
        -> QuarryResult<()>;

    /// Decides whether a scanned record is visible to this transaction.
    ///
    /// `readonly` is false when the scan feeds a mutation.
    fn visit_record(&mut self, table: &Table, record: &Record, readonly: bool)
        -> QuarryResult<bool>;

    /// Commits the transaction.
    fn commit(&mut self) -> QuarryResult<()>;

    /// Rolls the transaction back.
    fn rollback(&mut self) -> QuarryResult<()>;
}

/// Execution context threaded through one run of a physical plan.
pub struct ExecContext<'a> {
    trx: &'a mut dyn Trx,
}

impl<'a> ExecContext<'a> {
    /// Creates a context lending `trx` for the duration of one run.
    pub fn new(trx: &'a mut dyn Trx) -> Self {
        Self { trx }
    }

    /// Returns the transaction.
    pub fn trx(&mut self) -> &mut dyn Trx {
        &mut *self.trx
    }

    /// Returns the transaction id.
    pub fn trx_id(&self) -> TrxId {
        self.trx.id()
    }
}

impl std::fmt::Debug for ExecContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecContext")
            .field("trx", &self.trx.id())
            .finish()
    }
}
