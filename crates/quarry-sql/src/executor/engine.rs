//! Query engine.
//!
//! Drives a statement through the whole pipeline: logical plan building,
//! rewriting, optimization, physical lowering and finally execution of the
//! operator tree under a caller-supplied transaction.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use quarry_common::config::QueryConfig;
use quarry_common::error::QuarryResult;

use super::{CommandExecutor, SqlResult};
use crate::logical::LogicalPlanBuilder;
use crate::optimizer::{optimize, RewriteRule, Rewriter};
use crate::physical::{PhysicalOperator, PhysicalPlanGenerator};
use crate::stmt::{SqlNode, Stmt};
use crate::storage::Db;
use crate::trx::{ExecContext, Trx};

/// Plans and runs statements against one database.
#[derive(Debug)]
pub struct QueryEngine {
    db: Arc<Db>,
    config: QueryConfig,
    builder: LogicalPlanBuilder,
    rewriter: Rewriter,
    generator: PhysicalPlanGenerator,
}

impl QueryEngine {
    /// Creates an engine over `db`.
    ///
    /// Fails with `InvalidConfig` if `config` does not validate.
    pub fn new(db: Arc<Db>, config: QueryConfig) -> QuarryResult<Self> {
        config.validate().map_err(|e| {
            warn!(error = %e, "rejected query engine config");
            e
        })?;
        let rewriter = Rewriter::new(config.rewrite.clone());
        Ok(Self {
            db,
            config,
            builder: LogicalPlanBuilder::new(),
            rewriter,
            generator: PhysicalPlanGenerator::new(),
        })
    }

    /// Returns the database.
    pub fn db(&self) -> &Arc<Db> {
        &self.db
    }

    /// Returns the configuration.
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Adds a rewrite rule, applied after the configured ones.
    pub fn add_rewrite_rule(&mut self, rule: Box<dyn RewriteRule>) {
        self.rewriter.add_rule(rule);
    }

    /// Turns a resolved statement into an executable operator tree.
    ///
    /// Statements the planner does not handle yield `Unimplemented` without
    /// a warning. Every other failure is logged where it is detected.
    pub fn plan(&self, stmt: &Stmt) -> QuarryResult<PhysicalOperator> {
        let logical = self.builder.build(stmt).map_err(|e| {
            if !e.is_unimplemented() {
                warn!(kind = %stmt.kind(), error = %e, "failed to build logical plan");
            }
            e
        })?;
        debug!(kind = %stmt.kind(), "logical plan:\n{}", logical);

        let logical = self.rewriter.rewrite(logical)?;
        let logical = optimize(logical)?;
        self.generator.create(logical)
    }

    /// Plans and runs `stmt` under `trx`.
    ///
    /// The tree is opened once and pulled until end-of-stream. It is closed
    /// even when open or next fail; the first error wins.
    pub fn execute(&self, stmt: &Stmt, trx: &mut dyn Trx) -> QuarryResult<SqlResult> {
        let mut root = self.plan(stmt)?;
        self.run(&mut root, trx)
    }

    /// Resolves and runs a parsed statement.
    ///
    /// Statements the planner rejects as unimplemented fall back to the
    /// command executor, which handles DDL.
    pub fn execute_sql_node(&self, node: &SqlNode, trx: &mut dyn Trx) -> QuarryResult<SqlResult> {
        let stmt = Stmt::create(&self.db, node)?;
        match self.plan(&stmt) {
            Ok(mut root) => self.run(&mut root, trx),
            Err(e) if e.is_unimplemented() && is_command(&stmt) => {
                CommandExecutor::new(&self.db).execute(&stmt)
            }
            Err(e) => Err(e),
        }
    }

    /// Runs an already planned operator tree.
    pub fn run(&self, root: &mut PhysicalOperator, trx: &mut dyn Trx) -> QuarryResult<SqlResult> {
        let start = Instant::now();
        let header = root.header();
        let mut ctx = ExecContext::new(trx);
        debug!(trx = %ctx.trx_id(), root = root.name(), "executing plan");

        let outcome = root.open(&mut ctx).and_then(|()| {
            let mut rows = Vec::new();
            while let Some(tuple) = root.next(&mut ctx)? {
                rows.push(tuple.values());
            }
            Ok(rows)
        });
        let closed = root.close(&mut ctx);

        let rows = outcome.map_err(|e| {
            warn!(root = root.name(), error = %e, "execution failed");
            e
        })?;
        closed.map_err(|e| {
            warn!(root = root.name(), error = %e, "failed to close plan");
            e
        })?;

        let mut result = SqlResult::new(header, rows);
        result.execution_time_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        debug!(rows = result.row_count(), elapsed_us = result.execution_time_us, "execution done");
        Ok(result)
    }
}

fn is_command(stmt: &Stmt) -> bool {
    matches!(stmt, Stmt::CreateTable(_) | Stmt::DropTable(_))
}
