//! A transaction without isolation or undo.

use tracing::debug;

use quarry_common::error::QuarryResult;
use quarry_common::types::TrxId;

use super::Trx;
use crate::storage::{Record, Table};

/// Applies every operation straight to the table.
///
/// Every record is visible, `commit` has nothing to flush and `rollback`
/// has nothing to undo.
#[derive(Debug, Clone)]
pub struct VacuousTrx {
    id: TrxId,
}

impl VacuousTrx {
    /// Creates a vacuous transaction.
    pub fn new(id: TrxId) -> Self {
        Self { id }
    }
}

impl Default for VacuousTrx {
    fn default() -> Self {
        Self::new(TrxId::new(1))
    }
}

impl Trx for VacuousTrx {
    fn id(&self) -> TrxId {
        self.id
    }

    fn insert_record(&mut self, table: &Table, record: &mut Record) -> QuarryResult<()> {
        table.insert_record(record)?;
        debug!(table = table.name(), rid = %record.rid(), "inserted record");
        Ok(())
    }

    fn delete_record(&mut self, table: &Table, record: &Record) -> QuarryResult<()> {
        table.delete_record(record.rid())?;
        debug!(table = table.name(), rid = %record.rid(), "deleted record");
        Ok(())
    }

    fn update_record(
        &mut self,
        table: &Table,
        old: &Record,
        new: &mut Record,
    ) -> QuarryResult<()> {
        table.update_record(old, new)?;
        debug!(table = table.name(), rid = %old.rid(), "updated record");
        Ok(())
    }

    fn visit_record(
        &mut self,
        _table: &Table,
        _record: &Record,
        _readonly: bool,
    ) -> QuarryResult<bool> {
        Ok(true)
    }

    fn commit(&mut self) -> QuarryResult<()> {
        debug!(trx = %self.id, "commit");
        Ok(())
    }

    fn rollback(&mut self) -> QuarryResult<()> {
        debug!(trx = %self.id, "rollback");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{AttrType, Db, FieldMeta, Value};

    #[test]
    fn test_vacuous_applies_directly() {
        let db = Db::default();
        let table = db
            .create_table("t", vec![FieldMeta::new("a", AttrType::Ints)])
            .unwrap();
        let mut trx = VacuousTrx::default();

        let mut record = table.make_record(&[Value::int(0), Value::int(1)]).unwrap();
        trx.insert_record(&table, &mut record).unwrap();
        assert_eq!(table.row_count(), 1);
        assert!(trx.visit_record(&table, &record, true).unwrap());

        let mut new = table.make_record(&[Value::int(0), Value::int(2)]).unwrap();
        trx.update_record(&table, &record, &mut new).unwrap();
        let stored = table.get_record(record.rid()).unwrap();
        assert_eq!(table.record_values(&stored).unwrap()[1], Value::int(2));

        trx.delete_record(&table, &new).unwrap();
        assert!(table.is_empty());

        trx.rollback().unwrap();
        assert!(table.is_empty());
    }
}
