use std::fmt;
use std::sync::Arc;

use crate::storage::{AttrType, FieldMeta, Table};

/// A resolved column: a table together with one of its fields.
#[derive(Debug, Clone)]
pub struct Field {
    table: Arc<Table>,
    meta: FieldMeta,
}

impl Field {
    /// Creates a field.
    pub fn new(table: Arc<Table>, meta: FieldMeta) -> Self {
        Self { table, meta }
    }

    /// Returns the owning table.
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// Returns the table name.
    pub fn table_name(&self) -> &str {
        self.table.name()
    }

    /// Returns the field metadata.
    pub fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    /// Returns the field name.
    pub fn field_name(&self) -> &str {
        self.meta.name()
    }

    /// Returns the field type.
    pub fn attr_type(&self) -> AttrType {
        self.meta.attr_type()
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.table_name() == other.table_name() && self.field_name() == other.field_name()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table_name(), self.field_name())
    }
}
