use std::sync::Arc;

use tracing::warn;

use quarry_common::error::{QuarryError, QuarryResult};

use super::field::Field;
use super::filter::{resolve_attr, FilterStmt};
use super::node::SelectSqlNode;
use crate::storage::{Db, Table};

/// A resolved SELECT.
#[derive(Debug, Clone)]
pub struct SelectStmt {
    tables: Vec<Arc<Table>>,
    query_fields: Vec<Field>,
    filter: FilterStmt,
}

impl SelectStmt {
    /// Resolves a SELECT node.
    ///
    /// `*` and `t.*` expand to user fields in FROM order. A table may
    /// appear only once in the FROM list, since cells are identified by
    /// table and field name.
    pub fn create(db: &Db, node: &SelectSqlNode) -> QuarryResult<Self> {
        if node.relations.is_empty() {
            warn!("select without tables");
            return Err(QuarryError::invalid_argument("select needs at least one table"));
        }
        for (i, name) in node.relations.iter().enumerate() {
            if node.relations[..i].contains(name) {
                warn!(table = %name, "table listed twice in from list");
                return Err(QuarryError::invalid_argument(format!(
                    "table '{}' appears more than once in the from list",
                    name
                )));
            }
        }

        let tables = node
            .relations
            .iter()
            .map(|name| {
                db.find_table(name).ok_or_else(|| {
                    warn!(table = %name, "no such table");
                    QuarryError::SchemaTableNotFound {
                        table: name.clone(),
                    }
                })
            })
            .collect::<QuarryResult<Vec<_>>>()?;

        let mut query_fields = Vec::new();
        for attr in &node.attributes {
            if attr.is_star() {
                let expand: Vec<&Arc<Table>> = match &attr.relation_name {
                    None => tables.iter().collect(),
                    Some(relation) => {
                        let table =
                            tables.iter().find(|t| t.name() == relation).ok_or_else(|| {
                                warn!(table = %relation, "no such table in from list");
                                QuarryError::SchemaTableNotFound {
                                    table: relation.clone(),
                                }
                            })?;
                        vec![table]
                    }
                };
                for table in expand {
                    query_fields.extend(
                        table
                            .meta()
                            .user_fields()
                            .iter()
                            .map(|meta| Field::new(Arc::clone(table), meta.clone())),
                    );
                }
            } else {
                query_fields.push(resolve_attr(&tables, attr)?);
            }
        }

        if query_fields.is_empty() {
            return Err(QuarryError::invalid_argument("select list is empty"));
        }

        let filter = FilterStmt::create(&tables, &node.conditions)?;

        Ok(Self {
            tables,
            query_fields,
            filter,
        })
    }

    /// Returns the tables in FROM order.
    pub fn tables(&self) -> &[Arc<Table>] {
        &self.tables
    }

    /// Returns the projected fields.
    pub fn query_fields(&self) -> &[Field] {
        &self.query_fields
    }

    /// Returns the filter.
    pub fn filter(&self) -> &FilterStmt {
        &self.filter
    }
}
