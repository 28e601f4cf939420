//! In-memory table storage.
//!
//! A `Table` keeps encoded records ordered by record id and hands out
//! cursor-style access through [`Table::next_record`].

use std::collections::BTreeMap;
use std::ops::Bound;

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};

use quarry_common::error::{QuarryError, QuarryResult};
use quarry_common::types::RecordId;

use super::meta::TableMeta;
use super::record::{decode_values, encode_values, Record};
use super::value::Value;

/// A table: metadata plus its records.
#[derive(Debug)]
pub struct Table {
    meta: TableMeta,
    rows: RwLock<BTreeMap<RecordId, Bytes>>,
    next_rid: Mutex<RecordId>,
}

impl Table {
    /// Creates an empty table.
    pub fn new(meta: TableMeta) -> Self {
        Self {
            meta,
            rows: RwLock::new(BTreeMap::new()),
            next_rid: Mutex::new(RecordId::FIRST),
        }
    }

    /// Returns the table metadata.
    pub fn meta(&self) -> &TableMeta {
        &self.meta
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        self.meta.name()
    }

    /// Returns the number of stored records.
    pub fn row_count(&self) -> usize {
        self.rows.read().len()
    }

    /// Returns true if the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    // =========================================================================
    // Record Construction
    // =========================================================================

    /// Materializes a full row into a record.
    ///
    /// `values` must cover every field, system fields first, in schema order.
    pub fn make_record(&self, values: &[Value]) -> QuarryResult<Record> {
        let data = encode_values(&self.meta, values)?;
        Ok(Record::new(data))
    }

    /// Decodes a record into its field values.
    pub fn record_values(&self, record: &Record) -> QuarryResult<Vec<Value>> {
        decode_values(&self.meta, record.data())
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Stores a record and assigns it a fresh record id.
    pub fn insert_record(&self, record: &mut Record) -> QuarryResult<()> {
        let rid = {
            let mut next = self.next_rid.lock();
            let rid = *next;
            *next = rid.next();
            rid
        };
        record.set_rid(rid);
        self.rows.write().insert(rid, record.data().clone());
        Ok(())
    }

    /// Removes the record with `rid`.
    pub fn delete_record(&self, rid: RecordId) -> QuarryResult<()> {
        self.rows
            .write()
            .remove(&rid)
            .map(|_| ())
            .ok_or(QuarryError::RecordNotFound { rid })
    }

    /// Replaces `old` in place with `new`.
    ///
    /// `new` takes over the record id of `old`.
    pub fn update_record(&self, old: &Record, new: &mut Record) -> QuarryResult<()> {
        let rid = old.rid();
        let mut rows = self.rows.write();
        let slot = rows
            .get_mut(&rid)
            .ok_or(QuarryError::RecordNotFound { rid })?;
        *slot = new.data().clone();
        new.set_rid(rid);
        Ok(())
    }

    /// Fetches the record with `rid`.
    pub fn get_record(&self, rid: RecordId) -> QuarryResult<Record> {
        self.rows
            .read()
            .get(&rid)
            .map(|data| Record::with_rid(rid, data.clone()))
            .ok_or(QuarryError::RecordNotFound { rid })
    }

    /// Returns the first record strictly after `after`, or the first record
    /// of the table when `after` is `None`.
    ///
    /// Records removed or replaced behind the cursor do not disturb it.
    pub fn next_record(&self, after: Option<RecordId>) -> Option<Record> {
        let lower = match after {
            Some(rid) => Bound::Excluded(rid),
            None => Bound::Unbounded,
        };
        self.rows
            .read()
            .range((lower, Bound::Unbounded))
            .next()
            .map(|(rid, data)| Record::with_rid(*rid, data.clone()))
    }
}
