use std::fmt;
use std::sync::Arc;

use tracing::warn;

use quarry_common::error::{QuarryError, QuarryResult};

use super::filter::FilterStmt;
use super::node::UpdateSqlNode;
use crate::storage::{Db, Table, Value};

/// One `column = value` pair of an UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    field_name: String,
    value: Value,
}

impl Assignment {
    /// Creates an assignment.
    pub fn new(field_name: impl Into<String>, value: Value) -> Self {
        Self {
            field_name: field_name.into(),
            value,
        }
    }

    /// Returns the assigned column.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Returns the new value.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field_name, self.value)
    }
}

/// A resolved UPDATE.
#[derive(Debug, Clone)]
pub struct UpdateStmt {
    table: Arc<Table>,
    assignments: Vec<Assignment>,
    filter: FilterStmt,
}

impl UpdateStmt {
    /// Resolves an UPDATE node.
    ///
    /// Every assigned column must be a user field of the table and the
    /// value must have the field's type.
    pub fn create(db: &Db, node: &UpdateSqlNode) -> QuarryResult<Self> {
        let table = db.find_table(&node.relation_name).ok_or_else(|| {
            warn!(table = %node.relation_name, "no such table");
            QuarryError::SchemaTableNotFound {
                table: node.relation_name.clone(),
            }
        })?;

        if node.assignments.is_empty() {
            return Err(QuarryError::invalid_argument("update without assignments"));
        }

        let mut assignments = Vec::with_capacity(node.assignments.len());
        for assignment in &node.assignments {
            let name = assignment.attribute_name.as_str();
            let field = table
                .meta()
                .user_fields()
                .iter()
                .find(|f| f.name() == name)
                .ok_or_else(|| {
                    warn!(table = table.name(), field = name, "no such field");
                    QuarryError::field_not_found(table.name(), name)
                })?;

            if field.attr_type() != assignment.value.attr_type() {
                warn!(table = table.name(), field = name, "update type mismatch");
                return Err(QuarryError::type_mismatch(
                    table.name(),
                    name,
                    format!(
                        "field type={}, value type={}",
                        field.attr_type(),
                        assignment.value.attr_type()
                    ),
                ));
            }
            assignments.push(Assignment::new(name, assignment.value.clone()));
        }

        let filter = FilterStmt::create(std::slice::from_ref(&table), &node.conditions)?;

        Ok(Self {
            table,
            assignments,
            filter,
        })
    }

    /// Returns the target table.
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// Returns the assignments in source order.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Returns the filter.
    pub fn filter(&self) -> &FilterStmt {
        &self.filter
    }
}
