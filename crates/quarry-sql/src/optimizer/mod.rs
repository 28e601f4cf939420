//! Rule-based rewriter for logical plans.
//!
//! The rewriter applies its rules to every node of the tree, parents
//! before children, and repeats whole passes until a pass changes nothing.
//! The number of passes is capped by [`RewriteConfig::max_iterations`]; a
//! plan that is still changing at the cap is rejected rather than looped on.
//!
//! # Rules
//!
//! - **ExpressionRewriter**: runs the expression rules over the
//!   expressions owned by each node
//!   - ComparisonSimplification, ComparisonNormalization,
//!     ConjunctionSimplification
//! - **PredicateRewrite**: drops always-true Predicate nodes
//! - **PredicatePushdown**: moves single-table conjuncts into scans

mod predicate;
mod rules;

pub use predicate::{PredicatePushdownRule, PredicateRewriteRule};
pub use rules::{
    ComparisonNormalizationRule, ComparisonSimplificationRule, ConjunctionSimplificationRule,
};

use tracing::{debug, warn};

use quarry_common::config::RewriteConfig;
use quarry_common::error::{QuarryError, QuarryResult};

use crate::expr::Expression;
use crate::logical::{LogicalOperator, LogicalPlan};

/// A rule that rewrites a single logical operator.
///
/// The rule receives the node by value and hands back either the same node
/// or its replacement, together with whether anything changed. A rule must
/// report no change once its rewrite no longer applies, otherwise the
/// rewrite loop cannot reach a fixpoint.
pub trait RewriteRule: std::fmt::Debug + Send + Sync {
    /// Returns the name of this rule.
    fn name(&self) -> &str;

    /// Rewrites one node.
    fn rewrite(&self, op: LogicalOperator) -> QuarryResult<(LogicalOperator, bool)>;
}

/// A rule that rewrites a single expression node in place.
pub trait ExpressionRule: std::fmt::Debug + Send + Sync {
    /// Returns the name of this rule.
    fn name(&self) -> &str;

    /// Rewrites `expr`. Returns true if it changed.
    fn rewrite(&self, expr: &mut Expression) -> QuarryResult<bool>;
}

/// Applies expression rules to the expressions owned by each operator.
#[derive(Debug)]
pub struct ExpressionRewriter {
    rules: Vec<Box<dyn ExpressionRule>>,
}

impl ExpressionRewriter {
    /// Creates an expression rewriter with the built-in rules.
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(ComparisonSimplificationRule),
                Box::new(ComparisonNormalizationRule),
                Box::new(ConjunctionSimplificationRule),
            ],
        }
    }

    fn rewrite_expr(&self, expr: &mut Expression) -> QuarryResult<bool> {
        let mut changed = false;

        match expr {
            Expression::Comparison { left, right, .. } => {
                changed |= self.rewrite_expr(left)?;
                changed |= self.rewrite_expr(right)?;
            }
            Expression::Conjunction { children, .. } => {
                for child in children.iter_mut() {
                    changed |= self.rewrite_expr(child)?;
                }
            }
            Expression::Field(_) | Expression::Value(_) => {}
        }

        for rule in &self.rules {
            if rule.rewrite(expr)? {
                debug!(rule = rule.name(), "expression rule fired");
                changed = true;
            }
        }
        Ok(changed)
    }
}

impl Default for ExpressionRewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl RewriteRule for ExpressionRewriter {
    fn name(&self) -> &str {
        "ExpressionRewriter"
    }

    fn rewrite(&self, mut op: LogicalOperator) -> QuarryResult<(LogicalOperator, bool)> {
        let mut changed = false;
        for expr in op.expressions_mut() {
            changed |= self.rewrite_expr(expr)?;
        }
        Ok((op, changed))
    }
}

/// Drives the rewrite rules to a fixpoint.
#[derive(Debug)]
pub struct Rewriter {
    config: RewriteConfig,
    rules: Vec<Box<dyn RewriteRule>>,
}

impl Rewriter {
    /// Creates a rewriter with the rules enabled in `config`.
    pub fn new(config: RewriteConfig) -> Self {
        let mut rules: Vec<Box<dyn RewriteRule>> = Vec::new();

        // Add rules in order of application
        if config.enable_expression_rules {
            rules.push(Box::new(ExpressionRewriter::new()));
        }
        if config.enable_predicate_rewrite {
            rules.push(Box::new(PredicateRewriteRule));
        }
        if config.enable_predicate_pushdown {
            rules.push(Box::new(PredicatePushdownRule));
        }

        Self { config, rules }
    }

    /// Adds a custom rule, applied after the built-in ones.
    pub fn add_rule(&mut self, rule: Box<dyn RewriteRule>) {
        self.rules.push(rule);
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }

    /// Rewrites `plan` until a pass makes no change.
    ///
    /// Fails with `RewriteDiverged` if the plan is still changing after
    /// `max_iterations` passes.
    pub fn rewrite(&self, plan: LogicalPlan) -> QuarryResult<LogicalPlan> {
        let mut current = plan;

        for iteration in 0..self.config.max_iterations {
            let (next, changed) = self.rewrite_once(current)?;
            current = next;
            if !changed {
                debug!(passes = iteration + 1, "rewrite reached fixpoint");
                return Ok(current);
            }
        }

        warn!(
            iterations = self.config.max_iterations,
            "rewrite did not reach a fixpoint"
        );
        Err(QuarryError::RewriteDiverged {
            iterations: self.config.max_iterations,
        })
    }

    /// Runs a single pass over `plan`. Returns whether any rule fired.
    pub fn rewrite_once(&self, plan: LogicalPlan) -> QuarryResult<(LogicalPlan, bool)> {
        let (root, changed) = self.rewrite_node(plan.into_root())?;
        Ok((LogicalPlan::new(root), changed))
    }

    fn rewrite_node(&self, op: LogicalOperator) -> QuarryResult<(LogicalOperator, bool)> {
        let mut changed = false;
        let mut op = op;

        for rule in &self.rules {
            let (next, fired) = rule.rewrite(op)?;
            op = next;
            if fired {
                debug!(rule = rule.name(), node = op.name(), "rewrite rule fired");
                changed = true;
            }
        }

        let op = op.try_map_children(|child| {
            let (child, fired) = self.rewrite_node(child)?;
            changed |= fired;
            Ok(child)
        })?;

        Ok((op, changed))
    }
}

impl Default for Rewriter {
    fn default() -> Self {
        Self::new(RewriteConfig::default())
    }
}

/// Cost-based optimization hook. Plans pass through unchanged.
pub fn optimize(plan: LogicalPlan) -> QuarryResult<LogicalPlan> {
    Ok(plan)
}
