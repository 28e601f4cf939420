//! Logical plan wrapper and utilities.

use std::fmt;

use super::operator::LogicalOperator;

/// A logical query plan.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalPlan {
    /// Root operator.
    pub root: LogicalOperator,
}

impl LogicalPlan {
    /// Creates a new logical plan.
    pub fn new(root: LogicalOperator) -> Self {
        Self { root }
    }

    /// Consumes the plan and returns its root.
    pub fn into_root(self) -> LogicalOperator {
        self.root
    }

    /// Returns a formatted string representation of the plan.
    pub fn display(&self) -> String {
        let mut output = String::new();
        format_node(&self.root, 0, &mut output);
        output
    }

    /// Visits every node in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a LogicalOperator)) {
        walk_node(&self.root, visit);
    }

    /// Counts nodes with the given operator name.
    pub fn count(&self, name: &str) -> usize {
        let mut count = 0;
        self.walk(&mut |op| {
            if op.name() == name {
                count += 1;
            }
        });
        count
    }
}

fn walk_node<'a>(op: &'a LogicalOperator, visit: &mut impl FnMut(&'a LogicalOperator)) {
    visit(op);
    for child in op.children() {
        walk_node(child, visit);
    }
}

fn format_node(op: &LogicalOperator, indent: usize, output: &mut String) {
    output.push_str(&"  ".repeat(indent));
    output.push_str(&op.to_string());
    output.push('\n');
    for child in op.children() {
        format_node(child, indent + 1, output);
    }
}

impl fmt::Display for LogicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}
