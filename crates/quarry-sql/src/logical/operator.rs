//! Logical operators.
//!
//! Each node exclusively owns its children, so the tree is acyclic by
//! construction and can be rewritten in place.

use std::fmt;
use std::sync::Arc;

use quarry_common::error::QuarryResult;

use crate::expr::Expression;
use crate::stmt::{Assignment, Field};
use crate::storage::{Table, Value};

/// A logical operator.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalOperator {
    /// Table scan.
    TableGet(TableGetOperator),

    /// Filter.
    Predicate(PredicateOperator),

    /// Projection.
    Project(ProjectOperator),

    /// Cartesian join of two inputs.
    Join(JoinOperator),

    /// Single-row insert.
    Insert(InsertOperator),

    /// Update of every input row.
    Update(UpdateOperator),

    /// Delete of every input row.
    Delete(DeleteOperator),

    /// Plan description of the input.
    Explain(ExplainOperator),
}

impl LogicalOperator {
    /// Returns the child operators, in order.
    pub fn children(&self) -> Vec<&LogicalOperator> {
        match self {
            LogicalOperator::TableGet(_) | LogicalOperator::Insert(_) => vec![],
            LogicalOperator::Predicate(op) => vec![&op.input],
            LogicalOperator::Project(op) => vec![&op.input],
            LogicalOperator::Join(op) => vec![&op.left, &op.right],
            LogicalOperator::Update(op) => vec![&op.input],
            LogicalOperator::Delete(op) => vec![&op.input],
            LogicalOperator::Explain(op) => vec![&op.input],
        }
    }

    /// Returns the child operators mutably, in order.
    pub fn children_mut(&mut self) -> Vec<&mut LogicalOperator> {
        match self {
            LogicalOperator::TableGet(_) | LogicalOperator::Insert(_) => vec![],
            LogicalOperator::Predicate(op) => vec![&mut op.input],
            LogicalOperator::Project(op) => vec![&mut op.input],
            LogicalOperator::Join(op) => vec![&mut op.left, &mut op.right],
            LogicalOperator::Update(op) => vec![&mut op.input],
            LogicalOperator::Delete(op) => vec![&mut op.input],
            LogicalOperator::Explain(op) => vec![&mut op.input],
        }
    }

    /// Rebuilds this node with each child replaced by `f(child)`.
    ///
    /// Children are visited in order. The first error aborts the rebuild.
    pub fn try_map_children<F>(self, mut f: F) -> QuarryResult<Self>
    where
        F: FnMut(LogicalOperator) -> QuarryResult<LogicalOperator>,
    {
        Ok(match self {
            leaf @ (LogicalOperator::TableGet(_) | LogicalOperator::Insert(_)) => leaf,
            LogicalOperator::Predicate(mut op) => {
                op.input = Box::new(f(*op.input)?);
                LogicalOperator::Predicate(op)
            }
            LogicalOperator::Project(mut op) => {
                op.input = Box::new(f(*op.input)?);
                LogicalOperator::Project(op)
            }
            LogicalOperator::Join(mut op) => {
                op.left = Box::new(f(*op.left)?);
                op.right = Box::new(f(*op.right)?);
                LogicalOperator::Join(op)
            }
            LogicalOperator::Update(mut op) => {
                op.input = Box::new(f(*op.input)?);
                LogicalOperator::Update(op)
            }
            LogicalOperator::Delete(mut op) => {
                op.input = Box::new(f(*op.input)?);
                LogicalOperator::Delete(op)
            }
            LogicalOperator::Explain(mut op) => {
                op.input = Box::new(f(*op.input)?);
                LogicalOperator::Explain(op)
            }
        })
    }

    /// Returns the expressions owned by this node itself.
    pub fn expressions_mut(&mut self) -> Vec<&mut Expression> {
        match self {
            LogicalOperator::TableGet(op) => op.predicates.iter_mut().collect(),
            LogicalOperator::Predicate(op) => vec![&mut op.expression],
            _ => vec![],
        }
    }

    /// Returns true if this operator has no children.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            LogicalOperator::TableGet(_) | LogicalOperator::Insert(_)
        )
    }

    /// Returns the operator name.
    pub fn name(&self) -> &'static str {
        match self {
            LogicalOperator::TableGet(_) => "TableGet",
            LogicalOperator::Predicate(_) => "Predicate",
            LogicalOperator::Project(_) => "Project",
            LogicalOperator::Join(_) => "Join",
            LogicalOperator::Insert(_) => "Insert",
            LogicalOperator::Update(_) => "Update",
            LogicalOperator::Delete(_) => "Delete",
            LogicalOperator::Explain(_) => "Explain",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::TableGet(op) => {
                write!(f, "TableGet: {}", op.table.name())?;
                if !op.fields.is_empty() {
                    let fields: Vec<_> = op.fields.iter().map(|f| f.field_name()).collect();
                    write!(f, " [{}]", fields.join(", "))?;
                }
                if !op.readonly {
                    write!(f, " (for write)")?;
                }
                if !op.predicates.is_empty() {
                    let preds: Vec<_> = op.predicates.iter().map(ToString::to_string).collect();
                    write!(f, " (filters: {})", preds.join(" AND "))?;
                }
                Ok(())
            }
            LogicalOperator::Predicate(op) => write!(f, "Predicate: {}", op.expression),
            LogicalOperator::Project(op) => {
                let fields: Vec<_> = op.fields.iter().map(ToString::to_string).collect();
                write!(f, "Project: {}", fields.join(", "))
            }
            LogicalOperator::Join(_) => write!(f, "Join"),
            LogicalOperator::Insert(op) => {
                let values: Vec<_> = op.values.iter().map(ToString::to_string).collect();
                write!(f, "Insert: {} ({})", op.table.name(), values.join(", "))
            }
            LogicalOperator::Update(op) => {
                let sets: Vec<_> = op.assignments.iter().map(ToString::to_string).collect();
                write!(f, "Update: {} SET {}", op.table.name(), sets.join(", "))
            }
            LogicalOperator::Delete(op) => write!(f, "Delete: {}", op.table.name()),
            LogicalOperator::Explain(_) => write!(f, "Explain"),
        }
    }
}

/// Table scan.
#[derive(Debug, Clone)]
pub struct TableGetOperator {
    /// Scanned table.
    pub table: Arc<Table>,
    /// Fields the scan is expected to produce.
    pub fields: Vec<Field>,
    /// False when the scan feeds a mutation.
    pub readonly: bool,
    /// Predicates evaluated by the scan itself.
    pub predicates: Vec<Expression>,
}

impl TableGetOperator {
    /// Creates a scan of `table`.
    pub fn new(table: Arc<Table>, fields: Vec<Field>, readonly: bool) -> Self {
        Self {
            table,
            fields,
            readonly,
            predicates: Vec::new(),
        }
    }
}

impl PartialEq for TableGetOperator {
    fn eq(&self, other: &Self) -> bool {
        self.table.name() == other.table.name()
            && self.fields == other.fields
            && self.readonly == other.readonly
            && self.predicates == other.predicates
    }
}

/// Filter.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateOperator {
    /// Input operator.
    pub input: Box<LogicalOperator>,
    /// Filter expression.
    pub expression: Expression,
}

/// Projection.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectOperator {
    /// Input operator.
    pub input: Box<LogicalOperator>,
    /// Projected fields, in select-list order.
    pub fields: Vec<Field>,
}

/// Join.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOperator {
    /// Left input.
    pub left: Box<LogicalOperator>,
    /// Right input.
    pub right: Box<LogicalOperator>,
}

/// Insert.
#[derive(Debug, Clone)]
pub struct InsertOperator {
    /// Target table.
    pub table: Arc<Table>,
    /// User field values.
    pub values: Vec<Value>,
}

impl PartialEq for InsertOperator {
    fn eq(&self, other: &Self) -> bool {
        self.table.name() == other.table.name() && self.values == other.values
    }
}

/// Update.
#[derive(Debug, Clone)]
pub struct UpdateOperator {
    /// Input operator.
    pub input: Box<LogicalOperator>,
    /// Target table.
    pub table: Arc<Table>,
    /// Assignments, in order.
    pub assignments: Vec<Assignment>,
}

impl PartialEq for UpdateOperator {
    fn eq(&self, other: &Self) -> bool {
        self.table.name() == other.table.name()
            && self.assignments == other.assignments
            && self.input == other.input
    }
}

/// Delete.
#[derive(Debug, Clone)]
pub struct DeleteOperator {
    /// Input operator.
    pub input: Box<LogicalOperator>,
    /// Target table.
    pub table: Arc<Table>,
}

impl PartialEq for DeleteOperator {
    fn eq(&self, other: &Self) -> bool {
        self.table.name() == other.table.name() && self.input == other.input
    }
}

/// Explain.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplainOperator {
    /// Explained plan.
    pub input: Box<LogicalOperator>,
}
