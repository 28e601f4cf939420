//! Statements that bypass the planner.

use tracing::{info, warn};

use quarry_common::error::{QuarryError, QuarryResult};

use super::SqlResult;
use crate::stmt::Stmt;
use crate::storage::Db;

/// Runs catalog statements directly against the database.
#[derive(Debug)]
pub struct CommandExecutor<'a> {
    db: &'a Db,
}

impl<'a> CommandExecutor<'a> {
    /// Creates an executor over `db`.
    pub fn new(db: &'a Db) -> Self {
        Self { db }
    }

    /// Runs `stmt`. Only DDL statements are accepted.
    pub fn execute(&self, stmt: &Stmt) -> QuarryResult<SqlResult> {
        match stmt {
            Stmt::CreateTable(create) => {
                let table = self
                    .db
                    .create_table(create.table_name(), create.fields().to_vec())?;
                info!(
                    table = table.name(),
                    table_id = %table.meta().table_id(),
                    fields = table.meta().field_num(),
                    "created table"
                );
            }
            Stmt::DropTable(drop) => {
                self.db.drop_table(drop.table_name())?;
                info!(table = drop.table_name(), "dropped table");
            }
            other => {
                warn!(kind = %other.kind(), "not a command statement");
                return Err(QuarryError::unimplemented(format!(
                    "{} as a command",
                    other.kind()
                )));
            }
        }
        Ok(SqlResult::empty())
    }
}
