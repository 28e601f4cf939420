//! Resolved statements.
//!
//! [`Stmt::create`] binds a [`SqlNode`] to the catalog: table and field
//! names are resolved and literal types are checked, so that the planner
//! only ever sees statements that make sense for the current schema.

mod ddl;
mod delete;
mod explain;
mod field;
mod filter;
mod insert;
mod node;
mod select;
mod update;

use std::fmt;

use quarry_common::error::QuarryResult;

use crate::storage::Db;

pub use ddl::{CreateTableStmt, DropTableStmt};
pub use delete::DeleteStmt;
pub use explain::ExplainStmt;
pub use field::Field;
pub use filter::{FilterObj, FilterStmt, FilterUnit};
pub use insert::InsertStmt;
pub use node::{
    AssignmentSqlNode, AttrInfoSqlNode, CompOp, ConditionOperand, ConditionSqlNode,
    CreateTableSqlNode, DeleteSqlNode, DropTableSqlNode, InsertSqlNode, RelAttrSqlNode,
    SelectSqlNode, SqlNode, UpdateSqlNode,
};
pub use select::SelectStmt;
pub use update::{Assignment, UpdateStmt};

/// Statement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StmtKind {
    /// SELECT.
    Select,
    /// INSERT.
    Insert,
    /// UPDATE.
    Update,
    /// DELETE.
    Delete,
    /// EXPLAIN.
    Explain,
    /// CREATE TABLE.
    CreateTable,
    /// DROP TABLE.
    DropTable,
}

impl fmt::Display for StmtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StmtKind::Select => "SELECT",
            StmtKind::Insert => "INSERT",
            StmtKind::Update => "UPDATE",
            StmtKind::Delete => "DELETE",
            StmtKind::Explain => "EXPLAIN",
            StmtKind::CreateTable => "CREATE TABLE",
            StmtKind::DropTable => "DROP TABLE",
        };
        write!(f, "{}", name)
    }
}

/// A resolved statement.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// SELECT.
    Select(SelectStmt),
    /// INSERT.
    Insert(InsertStmt),
    /// UPDATE.
    Update(UpdateStmt),
    /// DELETE.
    Delete(DeleteStmt),
    /// EXPLAIN.
    Explain(ExplainStmt),
    /// CREATE TABLE.
    CreateTable(CreateTableStmt),
    /// DROP TABLE.
    DropTable(DropTableStmt),
}

impl Stmt {
    /// Resolves a parsed node against `db`.
    pub fn create(db: &Db, node: &SqlNode) -> QuarryResult<Self> {
        Ok(match node {
            SqlNode::Select(select) => Stmt::Select(SelectStmt::create(db, select)?),
            SqlNode::Insert(insert) => Stmt::Insert(InsertStmt::create(db, insert)?),
            SqlNode::Update(update) => Stmt::Update(UpdateStmt::create(db, update)?),
            SqlNode::Delete(delete) => Stmt::Delete(DeleteStmt::create(db, delete)?),
            SqlNode::Explain(child) => Stmt::Explain(ExplainStmt::new(Stmt::create(db, child)?)),
            SqlNode::CreateTable(create) => Stmt::CreateTable(CreateTableStmt::create(create)?),
            SqlNode::DropTable(drop) => Stmt::DropTable(DropTableStmt::create(drop)),
        })
    }

    /// Returns the statement kind.
    pub fn kind(&self) -> StmtKind {
        match self {
            Stmt::Select(_) => StmtKind::Select,
            Stmt::Insert(_) => StmtKind::Insert,
            Stmt::Update(_) => StmtKind::Update,
            Stmt::Delete(_) => StmtKind::Delete,
            Stmt::Explain(_) => StmtKind::Explain,
            Stmt::CreateTable(_) => StmtKind::CreateTable,
            Stmt::DropTable(_) => StmtKind::DropTable,
        }
    }
}
