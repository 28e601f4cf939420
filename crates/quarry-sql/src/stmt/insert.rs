use std::sync::Arc;

use tracing::warn;

use quarry_common::error::{QuarryError, QuarryResult};

use super::node::InsertSqlNode;
use crate::storage::{Db, Table, Value};

/// A resolved INSERT of one row.
#[derive(Debug, Clone)]
pub struct InsertStmt {
    table: Arc<Table>,
    values: Vec<Value>,
}

impl InsertStmt {
    /// Resolves an INSERT node, checking arity and types against the user
    /// fields of the table.
    pub fn create(db: &Db, node: &InsertSqlNode) -> QuarryResult<Self> {
        let table = db.find_table(&node.relation_name).ok_or_else(|| {
            warn!(table = %node.relation_name, "no such table");
            QuarryError::SchemaTableNotFound {
                table: node.relation_name.clone(),
            }
        })?;

        let fields = table.meta().user_fields();
        if fields.len() != node.values.len() {
            warn!(
                table = table.name(),
                expected = fields.len(),
                actual = node.values.len(),
                "insert arity mismatch"
            );
            return Err(QuarryError::SchemaFieldMissing {
                table: table.name().to_string(),
                expected: fields.len(),
                actual: node.values.len(),
            });
        }

        for (field, value) in fields.iter().zip(&node.values) {
            if field.attr_type() != value.attr_type() {
                warn!(table = table.name(), field = field.name(), "insert type mismatch");
                return Err(QuarryError::type_mismatch(
                    table.name(),
                    field.name(),
                    format!(
                        "field type={}, value type={}",
                        field.attr_type(),
                        value.attr_type()
                    ),
                ));
            }
        }

        Ok(Self {
            table,
            values: node.values.clone(),
        })
    }

    /// Returns the target table.
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// Returns the user field values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}
