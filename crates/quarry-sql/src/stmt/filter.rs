//! WHERE clause resolution.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use quarry_common::error::{QuarryError, QuarryResult};

use super::field::Field;
use super::node::{CompOp, ConditionOperand, ConditionSqlNode, RelAttrSqlNode};
use crate::storage::{Table, Value};

/// One operand of a resolved condition.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterObj {
    /// A column.
    Attr(Field),
    /// A literal.
    Value(Value),
}

impl fmt::Display for FilterObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterObj::Attr(field) => write!(f, "{}", field),
            FilterObj::Value(value) => write!(f, "{}", value),
        }
    }
}

/// One resolved comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterUnit {
    comp: CompOp,
    left: FilterObj,
    right: FilterObj,
}

impl FilterUnit {
    /// Creates a filter unit.
    pub fn new(left: FilterObj, comp: CompOp, right: FilterObj) -> Self {
        Self { comp, left, right }
    }

    /// Returns the comparison operator.
    pub fn comp(&self) -> CompOp {
        self.comp
    }

    /// Returns the left operand.
    pub fn left(&self) -> &FilterObj {
        &self.left
    }

    /// Returns the right operand.
    pub fn right(&self) -> &FilterObj {
        &self.right
    }
}

impl fmt::Display for FilterUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.comp, self.right)
    }
}

/// The resolved conditions of a statement, implicitly ANDed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterStmt {
    units: Vec<FilterUnit>,
}

impl FilterStmt {
    /// Creates a filter from already resolved units.
    pub fn new(units: Vec<FilterUnit>) -> Self {
        Self { units }
    }

    /// Resolves `conditions` against `tables`.
    pub fn create(tables: &[Arc<Table>], conditions: &[ConditionSqlNode]) -> QuarryResult<Self> {
        let units = conditions
            .iter()
            .map(|condition| {
                let left = resolve_operand(tables, &condition.left)?;
                let right = resolve_operand(tables, &condition.right)?;
                Ok(FilterUnit::new(left, condition.op, right))
            })
            .collect::<QuarryResult<Vec<_>>>()?;
        Ok(Self { units })
    }

    /// Returns the filter units in source order.
    pub fn units(&self) -> &[FilterUnit] {
        &self.units
    }

    /// Returns true if there are no conditions.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

fn resolve_operand(tables: &[Arc<Table>], operand: &ConditionOperand) -> QuarryResult<FilterObj> {
    match operand {
        ConditionOperand::Attr(attr) => resolve_attr(tables, attr).map(FilterObj::Attr),
        ConditionOperand::Value(value) => Ok(FilterObj::Value(value.clone())),
    }
}

/// Resolves one attribute reference to a user field of `tables`.
///
/// A qualified reference must name one of `tables`. An unqualified one must
/// match exactly one of them.
pub(crate) fn resolve_attr(tables: &[Arc<Table>], attr: &RelAttrSqlNode) -> QuarryResult<Field> {
    let name = attr.attribute_name.as_str();

    if let Some(relation) = &attr.relation_name {
        let table = tables
            .iter()
            .find(|t| t.name() == relation)
            .ok_or_else(|| {
                warn!(table = %relation, "table referenced by attribute is not in the statement");
                QuarryError::SchemaTableNotFound {
                    table: relation.clone(),
                }
            })?;
        return user_field(table, name);
    }

    let mut candidates = tables
        .iter()
        .filter(|t| t.meta().user_fields().iter().any(|f| f.name() == name));
    match (candidates.next(), candidates.next()) {
        (Some(table), None) => user_field(table, name),
        (Some(_), Some(_)) => {
            warn!(field = name, "ambiguous attribute");
            Err(QuarryError::invalid_argument(format!(
                "ambiguous attribute '{}'",
                name
            )))
        }
        (None, _) => {
            let table = tables.first().map(|t| t.name()).unwrap_or_default();
            warn!(table, field = name, "no such field");
            Err(QuarryError::field_not_found(table, name))
        }
    }
}

fn user_field(table: &Arc<Table>, name: &str) -> QuarryResult<Field> {
    table
        .meta()
        .user_fields()
        .iter()
        .find(|f| f.name() == name)
        .map(|meta| Field::new(Arc::clone(table), meta.clone()))
        .ok_or_else(|| {
            warn!(table = table.name(), field = name, "no such field");
            QuarryError::field_not_found(table.name(), name)
        })
}
