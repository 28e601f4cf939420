use std::sync::Arc;

use tracing::warn;

use quarry_common::error::{QuarryError, QuarryResult};

use super::filter::FilterStmt;
use super::node::DeleteSqlNode;
use crate::storage::{Db, Table};

/// A resolved DELETE.
#[derive(Debug, Clone)]
pub struct DeleteStmt {
    table: Arc<Table>,
    filter: FilterStmt,
}

impl DeleteStmt {
    /// Resolves a DELETE node.
    pub fn create(db: &Db, node: &DeleteSqlNode) -> QuarryResult<Self> {
        let table = db.find_table(&node.relation_name).ok_or_else(|| {
            warn!(table = %node.relation_name, "no such table");
            QuarryError::SchemaTableNotFound {
                table: node.relation_name.clone(),
            }
        })?;
        let filter = FilterStmt::create(std::slice::from_ref(&table), &node.conditions)?;
        Ok(Self { table, filter })
    }

    /// Returns the target table.
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// Returns the filter.
    pub fn filter(&self) -> &FilterStmt {
        &self.filter
    }
}
