//! Table and field metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

use quarry_common::types::TableId;

use super::value::AttrType;

/// Metadata for a single field (column).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    /// Field name.
    name: String,
    /// Field type.
    attr_type: AttrType,
    /// Whether the field is shown to users (false for system fields).
    visible: bool,
}

impl FieldMeta {
    /// Creates a user-visible field.
    pub fn new(name: impl Into<String>, attr_type: AttrType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            visible: true,
        }
    }

    /// Creates a hidden system field.
    pub fn system(name: impl Into<String>, attr_type: AttrType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            visible: false,
        }
    }

    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field type.
    pub fn attr_type(&self) -> AttrType {
        self.attr_type
    }

    /// Returns true for user-visible fields.
    pub fn visible(&self) -> bool {
        self.visible
    }
}

impl fmt::Display for FieldMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.attr_type)
    }
}

/// Metadata for a table.
///
/// Fields are stored in schema order. The first `sys_field_num` fields are
/// system fields which user statements can neither see nor assign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMeta {
    table_id: TableId,
    name: String,
    fields: Vec<FieldMeta>,
    sys_field_num: usize,
}

impl TableMeta {
    /// Creates table metadata from system fields followed by user fields.
    pub fn new(
        table_id: TableId,
        name: impl Into<String>,
        sys_fields: Vec<FieldMeta>,
        user_fields: Vec<FieldMeta>,
    ) -> Self {
        let sys_field_num = sys_fields.len();
        let mut fields = sys_fields;
        fields.extend(user_fields);
        Self {
            table_id,
            name: name.into(),
            fields,
            sys_field_num,
        }
    }

    /// Returns the table ID.
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the total number of fields, system fields included.
    pub fn field_num(&self) -> usize {
        self.fields.len()
    }

    /// Returns the number of leading system fields.
    pub fn sys_field_num(&self) -> usize {
        self.sys_field_num
    }

    /// Returns the field at `index`.
    pub fn field(&self, index: usize) -> Option<&FieldMeta> {
        self.fields.get(index)
    }

    /// Returns all fields in schema order.
    pub fn field_metas(&self) -> &[FieldMeta] {
        &self.fields
    }

    /// Returns the user fields in schema order.
    pub fn user_fields(&self) -> &[FieldMeta] {
        &self.fields[self.sys_field_num..]
    }

    /// Finds a field by name.
    pub fn find_field_by_name(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the schema index of the named field.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns true if the named field is a system field.
    pub fn is_sys_field(&self, name: &str) -> bool {
        self.field_index(name)
            .map_or(false, |i| i < self.sys_field_num)
    }
}

impl fmt::Display for TableMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<_> = self.user_fields().iter().map(|f| f.to_string()).collect();
        write!(f, "{}({})", self.name, fields.join(", "))
    }
}
