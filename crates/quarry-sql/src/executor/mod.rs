//! Statement execution.
//!
//! [`QueryEngine`] is the entry point: it resolves parsed statements, plans
//! them and pulls the resulting operator tree to completion.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use quarry_common::config::QueryConfig;
//! use quarry_sql::executor::QueryEngine;
//! use quarry_sql::stmt::{AttrInfoSqlNode, CreateTableSqlNode, SqlNode};
//! use quarry_sql::storage::{AttrType, Db};
//! use quarry_sql::trx::VacuousTrx;
//!
//! let engine = QueryEngine::new(Arc::new(Db::default()), QueryConfig::default()).unwrap();
//! let mut trx = VacuousTrx::default();
//! let create = SqlNode::CreateTable(CreateTableSqlNode {
//!     relation_name: "t".to_string(),
//!     attr_infos: vec![AttrInfoSqlNode {
//!         name: "id".to_string(),
//!         attr_type: AttrType::Ints,
//!     }],
//! });
//! engine.execute_sql_node(&create, &mut trx).unwrap();
//! assert!(engine.db().find_table("t").is_some());
//! ```

mod command;
mod engine;
mod result;

pub use command::CommandExecutor;
pub use engine::QueryEngine;
pub use result::SqlResult;
