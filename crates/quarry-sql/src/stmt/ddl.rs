//! DDL statements. These bypass the planner and run as commands.

use quarry_common::error::{QuarryError, QuarryResult};

use super::node::{CreateTableSqlNode, DropTableSqlNode};
use crate::storage::FieldMeta;

/// A CREATE TABLE.
#[derive(Debug, Clone)]
pub struct CreateTableStmt {
    table_name: String,
    fields: Vec<FieldMeta>,
}

impl CreateTableStmt {
    /// Converts a CREATE TABLE node.
    pub fn create(node: &CreateTableSqlNode) -> QuarryResult<Self> {
        if node.attr_infos.is_empty() {
            return Err(QuarryError::invalid_argument(format!(
                "table '{}' needs at least one field",
                node.relation_name
            )));
        }
        let fields = node
            .attr_infos
            .iter()
            .map(|info| FieldMeta::new(info.name.clone(), info.attr_type))
            .collect();
        Ok(Self {
            table_name: node.relation_name.clone(),
            fields,
        })
    }

    /// Returns the table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the user fields.
    pub fn fields(&self) -> &[FieldMeta] {
        &self.fields
    }
}

/// A DROP TABLE.
#[derive(Debug, Clone)]
pub struct DropTableStmt {
    table_name: String,
}

impl DropTableStmt {
    /// Converts a DROP TABLE node.
    pub fn create(node: &DropTableSqlNode) -> Self {
        Self {
            table_name: node.relation_name.clone(),
        }
    }

    /// Returns the table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}
