//! The table catalog.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use quarry_common::config::StorageConfig;
use quarry_common::error::{QuarryError, QuarryResult};
use quarry_common::types::TableId;

use super::meta::{FieldMeta, TableMeta};
use super::table::Table;
use super::value::AttrType;

/// A database: named tables sharing one set of system fields.
#[derive(Debug)]
pub struct Db {
    name: String,
    tables: RwLock<HashMap<String, Arc<Table>>>,
    next_table_id: Mutex<TableId>,
    sys_fields: Vec<FieldMeta>,
}

impl Db {
    /// Creates an empty database.
    ///
    /// Every table created in it leads with the configured system fields.
    pub fn new(name: impl Into<String>, config: &StorageConfig) -> Self {
        let sys_fields = config
            .sys_fields
            .iter()
            .map(|name| FieldMeta::system(name.clone(), AttrType::Ints))
            .collect();
        Self {
            name: name.into(),
            tables: RwLock::new(HashMap::new()),
            next_table_id: Mutex::new(TableId::new(1)),
            sys_fields,
        }
    }

    /// Returns the database name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a table with the given user fields.
    pub fn create_table(
        &self,
        name: &str,
        user_fields: Vec<FieldMeta>,
    ) -> QuarryResult<Arc<Table>> {
        if user_fields.is_empty() {
            return Err(QuarryError::invalid_argument(format!(
                "table '{}' needs at least one field",
                name
            )));
        }
        for (i, field) in user_fields.iter().enumerate() {
            let clashes_sys = self.sys_fields.iter().any(|f| f.name() == field.name());
            let duplicate = user_fields[..i].iter().any(|f| f.name() == field.name());
            if clashes_sys || duplicate {
                return Err(QuarryError::invalid_argument(format!(
                    "duplicate field '{}' in table '{}'",
                    field.name(),
                    name
                )));
            }
        }

        let mut tables = self.tables.write();
        if tables.contains_key(name) {
            return Err(QuarryError::SchemaTableExists {
                table: name.to_string(),
            });
        }

        let table_id = {
            let mut next = self.next_table_id.lock();
            let id = *next;
            *next = id.next();
            id
        };

        let meta = TableMeta::new(table_id, name, self.sys_fields.clone(), user_fields);
        debug!(table = %meta, id = table_id.as_u32(), "created table");
        let table = Arc::new(Table::new(meta));
        tables.insert(name.to_string(), Arc::clone(&table));
        Ok(table)
    }

    /// Drops a table.
    pub fn drop_table(&self, name: &str) -> QuarryResult<()> {
        self.tables
            .write()
            .remove(name)
            .map(|_| debug!(table = name, "dropped table"))
            .ok_or_else(|| QuarryError::SchemaTableNotFound {
                table: name.to_string(),
            })
    }

    /// Looks up a table by name.
    pub fn find_table(&self, name: &str) -> Option<Arc<Table>> {
        self.tables.read().get(name).cloned()
    }

    /// Returns the names of all tables, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for Db {
    fn default() -> Self {
        Self::new("default", &StorageConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_find() {
        let db = Db::default();
        db.create_table("users", vec![FieldMeta::new("id", AttrType::Ints)])
            .unwrap();

        let table = db.find_table("users").unwrap();
        assert_eq!(table.meta().sys_field_num(), 1);
        assert_eq!(table.meta().field_num(), 2);
        assert!(table.meta().is_sys_field("__trx_id"));
        assert!(db.find_table("missing").is_none());
    }

    #[test]
    fn test_create_duplicate() {
        let db = Db::default();
        db.create_table("t", vec![FieldMeta::new("a", AttrType::Ints)])
            .unwrap();
        let err = db
            .create_table("t", vec![FieldMeta::new("a", AttrType::Ints)])
            .unwrap_err();
        assert!(matches!(err, QuarryError::SchemaTableExists { .. }));
    }

    #[test]
    fn test_create_rejects_sys_field_name() {
        let db = Db::default();
        let err = db
            .create_table("t", vec![FieldMeta::new("__trx_id", AttrType::Ints)])
            .unwrap_err();
        assert!(matches!(err, QuarryError::InvalidArgument { .. }));
    }

    #[test]
    fn test_drop_table() {
        let db = Db::default();
        db.create_table("t", vec![FieldMeta::new("a", AttrType::Ints)])
            .unwrap();
        db.drop_table("t").unwrap();
        assert!(db.find_table("t").is_none());
        assert!(matches!(
            db.drop_table("t"),
            Err(QuarryError::SchemaTableNotFound { .. })
        ));
    }

    #[test]
    fn test_table_ids_increase() {
        let db = Db::default();
        let a = db
            .create_table("a", vec![FieldMeta::new("x", AttrType::Ints)])
            .unwrap();
        let b = db
            .create_table("b", vec![FieldMeta::new("x", AttrType::Ints)])
            .unwrap();
        assert!(b.meta().table_id() > a.meta().table_id());
        assert_eq!(db.table_names(), vec!["a".to_string(), "b".to_string()]);
    }
}
