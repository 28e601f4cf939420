//! Operator-level rewrite rules for predicates.

use quarry_common::error::QuarryResult;

use super::RewriteRule;
use crate::expr::Expression;
use crate::logical::{LogicalOperator, TableGetOperator};

// ============================================================================
// Predicate Rewrite
// ============================================================================

/// Removes a Predicate whose expression is the literal `true`.
#[derive(Debug)]
pub struct PredicateRewriteRule;

impl RewriteRule for PredicateRewriteRule {
    fn name(&self) -> &str {
        "PredicateRewrite"
    }

    fn rewrite(&self, op: LogicalOperator) -> QuarryResult<(LogicalOperator, bool)> {
        match op {
            LogicalOperator::Predicate(pred) if pred.expression.is_bool_literal(true) => {
                Ok((*pred.input, true))
            }
            other => Ok((other, false)),
        }
    }
}

// ============================================================================
// Predicate Pushdown
// ============================================================================

/// Moves single-table conjuncts of a Predicate into the scan of that table.
///
/// # Example
///
/// Before:
/// ```text
/// Predicate(a.x = 1 AND a.y = b.y)
///   Join
///     TableGet(a)
///     TableGet(b)
/// ```
///
/// After:
/// ```text
/// Predicate(a.y = b.y)
///   Join
///     TableGet(a) (filters: a.x = 1)
///     TableGet(b)
/// ```
///
/// Scans are only reached through Join nodes. The Predicate is removed once
/// every conjunct has been pushed.
#[derive(Debug)]
pub struct PredicatePushdownRule;

impl RewriteRule for PredicatePushdownRule {
    fn name(&self) -> &str {
        "PredicatePushdown"
    }

    fn rewrite(&self, op: LogicalOperator) -> QuarryResult<(LogicalOperator, bool)> {
        let LogicalOperator::Predicate(mut pred) = op else {
            return Ok((op, false));
        };

        let pushable = pred
            .expression
            .conjuncts()
            .iter()
            .any(|c| target_table(c).map_or(false, |t| count_scans(&pred.input, t) == 1));
        if !pushable {
            return Ok((LogicalOperator::Predicate(pred), false));
        }

        let mut remaining = Vec::new();
        for conjunct in pred.expression.into_conjuncts() {
            let table = target_table(&conjunct).map(str::to_string);
            let scan = table
                .as_deref()
                .filter(|t| count_scans(&pred.input, t) == 1)
                .and_then(|t| find_scan_mut(&mut pred.input, t));
            match scan {
                Some(scan) => scan.predicates.push(conjunct),
                None => remaining.push(conjunct),
            }
        }

        let op = match remaining.len() {
            0 => *pred.input,
            1 => {
                pred.expression = remaining.remove(0);
                LogicalOperator::Predicate(pred)
            }
            _ => {
                pred.expression = Expression::and(remaining);
                LogicalOperator::Predicate(pred)
            }
        };
        Ok((op, true))
    }
}

/// The single table a conjunct refers to, if exactly one.
fn target_table(expr: &Expression) -> Option<&str> {
    let tables = expr.referenced_tables();
    if tables.len() == 1 {
        tables.into_iter().next()
    } else {
        None
    }
}

fn count_scans(op: &LogicalOperator, table: &str) -> usize {
    match op {
        LogicalOperator::TableGet(scan) => usize::from(scan.table.name() == table),
        LogicalOperator::Join(join) => count_scans(&join.left, table) + count_scans(&join.right, table),
        _ => 0,
    }
}

fn find_scan_mut<'a>(op: &'a mut LogicalOperator, table: &str) -> Option<&'a mut TableGetOperator> {
    match op {
        LogicalOperator::TableGet(scan) if scan.table.name() == table => Some(scan),
        LogicalOperator::Join(join) => {
            if count_scans(&join.left, table) > 0 {
                find_scan_mut(&mut join.left, table)
            } else {
                find_scan_mut(&mut join.right, table)
            }
        }
        _ => None,
    }
}
