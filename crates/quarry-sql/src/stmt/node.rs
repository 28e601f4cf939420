//! Parsed statement nodes.
//!
//! These are what a SQL front end hands over: names are still unresolved
//! strings and nothing has been checked against the catalog.

use std::cmp::Ordering;
use std::fmt;

use crate::storage::{AttrType, Value};

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompOp {
    /// `=`
    Eq,
    /// `<>`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
}

impl CompOp {
    /// Returns the operator that holds with the operands swapped.
    pub fn mirror(self) -> Self {
        match self {
            CompOp::Eq => CompOp::Eq,
            CompOp::NotEq => CompOp::NotEq,
            CompOp::Lt => CompOp::Gt,
            CompOp::LtEq => CompOp::GtEq,
            CompOp::Gt => CompOp::Lt,
            CompOp::GtEq => CompOp::LtEq,
        }
    }

    /// Evaluates the operator against a comparison outcome.
    ///
    /// Incomparable operands never satisfy any operator.
    pub fn matches(self, ordering: Option<Ordering>) -> bool {
        let Some(ord) = ordering else {
            return false;
        };
        match self {
            CompOp::Eq => ord == Ordering::Equal,
            CompOp::NotEq => ord != Ordering::Equal,
            CompOp::Lt => ord == Ordering::Less,
            CompOp::LtEq => ord != Ordering::Greater,
            CompOp::Gt => ord == Ordering::Greater,
            CompOp::GtEq => ord != Ordering::Less,
        }
    }
}

impl fmt::Display for CompOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompOp::Eq => write!(f, "="),
            CompOp::NotEq => write!(f, "<>"),
            CompOp::Lt => write!(f, "<"),
            CompOp::LtEq => write!(f, "<="),
            CompOp::Gt => write!(f, ">"),
            CompOp::GtEq => write!(f, ">="),
        }
    }
}

/// A possibly qualified attribute reference. `*` selects every user field.
#[derive(Debug, Clone, PartialEq)]
pub struct RelAttrSqlNode {
    /// Table name, if qualified.
    pub relation_name: Option<String>,
    /// Attribute name or `*`.
    pub attribute_name: String,
}

impl RelAttrSqlNode {
    /// Creates an unqualified attribute.
    pub fn new(attribute_name: impl Into<String>) -> Self {
        Self {
            relation_name: None,
            attribute_name: attribute_name.into(),
        }
    }

    /// Creates a qualified attribute.
    pub fn qualified(relation_name: impl Into<String>, attribute_name: impl Into<String>) -> Self {
        Self {
            relation_name: Some(relation_name.into()),
            attribute_name: attribute_name.into(),
        }
    }

    /// Creates `*`.
    pub fn star() -> Self {
        Self::new("*")
    }

    /// Returns true if this is `*` or `t.*`.
    pub fn is_star(&self) -> bool {
        self.attribute_name == "*"
    }
}

/// One side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionOperand {
    /// An attribute reference.
    Attr(RelAttrSqlNode),
    /// A literal.
    Value(Value),
}

/// `left op right`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionSqlNode {
    /// Left operand.
    pub left: ConditionOperand,
    /// Operator.
    pub op: CompOp,
    /// Right operand.
    pub right: ConditionOperand,
}

impl ConditionSqlNode {
    /// Creates a condition.
    pub fn new(left: ConditionOperand, op: CompOp, right: ConditionOperand) -> Self {
        Self { left, op, right }
    }

    /// Creates `attr op value`.
    pub fn attr_value(attr: RelAttrSqlNode, op: CompOp, value: impl Into<Value>) -> Self {
        Self::new(
            ConditionOperand::Attr(attr),
            op,
            ConditionOperand::Value(value.into()),
        )
    }
}

/// `SELECT attributes FROM relations WHERE conditions`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectSqlNode {
    /// Select list.
    pub attributes: Vec<RelAttrSqlNode>,
    /// FROM list, in order.
    pub relations: Vec<String>,
    /// WHERE conditions, implicitly ANDed.
    pub conditions: Vec<ConditionSqlNode>,
}

/// `INSERT INTO relation VALUES (values)`.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertSqlNode {
    /// Target table.
    pub relation_name: String,
    /// One literal per user field.
    pub values: Vec<Value>,
}

/// `attribute = value` in an UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentSqlNode {
    /// Assigned column.
    pub attribute_name: String,
    /// New value.
    pub value: Value,
}

/// `UPDATE relation SET assignments WHERE conditions`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateSqlNode {
    /// Target table.
    pub relation_name: String,
    /// Assignments, in order.
    pub assignments: Vec<AssignmentSqlNode>,
    /// WHERE conditions.
    pub conditions: Vec<ConditionSqlNode>,
}

/// `DELETE FROM relation WHERE conditions`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteSqlNode {
    /// Target table.
    pub relation_name: String,
    /// WHERE conditions.
    pub conditions: Vec<ConditionSqlNode>,
}

/// A column definition in CREATE TABLE.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrInfoSqlNode {
    /// Column name.
    pub name: String,
    /// Column type.
    pub attr_type: AttrType,
}

/// `CREATE TABLE relation (attr_infos)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableSqlNode {
    /// Table name.
    pub relation_name: String,
    /// Columns, in order.
    pub attr_infos: Vec<AttrInfoSqlNode>,
}

/// `DROP TABLE relation`.
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableSqlNode {
    /// Table name.
    pub relation_name: String,
}

/// A parsed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlNode {
    /// SELECT.
    Select(SelectSqlNode),
    /// INSERT.
    Insert(InsertSqlNode),
    /// UPDATE.
    Update(UpdateSqlNode),
    /// DELETE.
    Delete(DeleteSqlNode),
    /// EXPLAIN of another statement.
    Explain(Box<SqlNode>),
    /// CREATE TABLE.
    CreateTable(CreateTableSqlNode),
    /// DROP TABLE.
    DropTable(DropTableSqlNode),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comp_op_mirror() {
        for op in [
            CompOp::Eq,
            CompOp::NotEq,
            CompOp::Lt,
            CompOp::LtEq,
            CompOp::Gt,
            CompOp::GtEq,
        ] {
            assert_eq!(op.mirror().mirror(), op);
        }
        assert_eq!(CompOp::Lt.mirror(), CompOp::Gt);
    }

    #[test]
    fn test_comp_op_matches() {
        assert!(CompOp::LtEq.matches(Some(Ordering::Equal)));
        assert!(CompOp::NotEq.matches(Some(Ordering::Less)));
        assert!(!CompOp::Gt.matches(Some(Ordering::Less)));
        assert!(!CompOp::NotEq.matches(None));
    }
}
