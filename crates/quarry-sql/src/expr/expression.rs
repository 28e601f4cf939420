//! Boolean expressions over tuples.

use std::collections::BTreeSet;
use std::fmt;

use quarry_common::error::{QuarryError, QuarryResult};

use super::tuple::{Tuple, TupleCellSpec};
use crate::stmt::{CompOp, Field};
use crate::storage::{AttrType, Value};

/// Logical connective of a conjunction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConjunctionType {
    /// All children must hold.
    And,
}

impl fmt::Display for ConjunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConjunctionType::And => write!(f, "AND"),
        }
    }
}

/// An expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Column reference.
    Field(Field),

    /// Literal value.
    Value(Value),

    /// Binary comparison.
    Comparison {
        /// Comparison operator.
        comp: CompOp,
        /// Left operand.
        left: Box<Expression>,
        /// Right operand.
        right: Box<Expression>,
    },

    /// Conjunction of child expressions, in order.
    Conjunction {
        /// Conjunction kind.
        kind: ConjunctionType,
        /// Child expressions.
        children: Vec<Expression>,
    },
}

impl Expression {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a column reference.
    pub fn field(field: Field) -> Self {
        Expression::Field(field)
    }

    /// Creates a literal.
    pub fn value(value: impl Into<Value>) -> Self {
        Expression::Value(value.into())
    }

    /// Creates `left comp right`.
    pub fn comparison(comp: CompOp, left: Expression, right: Expression) -> Self {
        Expression::Comparison {
            comp,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates an AND over `children`.
    pub fn and(children: Vec<Expression>) -> Self {
        Expression::Conjunction {
            kind: ConjunctionType::And,
            children,
        }
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Evaluates the expression against `tuple`.
    pub fn get_value(&self, tuple: &Tuple) -> QuarryResult<Value> {
        match self {
            Expression::Field(field) => tuple
                .find_cell(&TupleCellSpec::from(field))
                .cloned()
                .ok_or_else(|| QuarryError::field_not_found(field.table_name(), field.field_name())),
            Expression::Value(value) => Ok(value.clone()),
            Expression::Comparison { comp, left, right } => {
                let l = left.get_value(tuple)?;
                let r = right.get_value(tuple)?;
                Ok(Value::Boolean(comp.matches(l.compare(&r))))
            }
            Expression::Conjunction { kind, children } => match kind {
                ConjunctionType::And => {
                    for child in children {
                        if !child.get_value(tuple)?.is_truthy() {
                            return Ok(Value::Boolean(false));
                        }
                    }
                    Ok(Value::Boolean(true))
                }
            },
        }
    }

    /// Evaluates the expression without a tuple.
    ///
    /// Returns `None` if any column is referenced.
    pub fn try_get_value(&self) -> Option<Value> {
        match self {
            Expression::Field(_) => None,
            Expression::Value(value) => Some(value.clone()),
            Expression::Comparison { comp, left, right } => {
                let l = left.try_get_value()?;
                let r = right.try_get_value()?;
                Some(Value::Boolean(comp.matches(l.compare(&r))))
            }
            Expression::Conjunction { kind, children } => match kind {
                ConjunctionType::And => {
                    let mut result = true;
                    for child in children {
                        result &= child.try_get_value()?.is_truthy();
                    }
                    Some(Value::Boolean(result))
                }
            },
        }
    }

    /// Returns the type this expression evaluates to.
    pub fn value_type(&self) -> AttrType {
        match self {
            Expression::Field(field) => field.attr_type(),
            Expression::Value(value) => value.attr_type(),
            Expression::Comparison { .. } | Expression::Conjunction { .. } => AttrType::Booleans,
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Returns true if this is the boolean literal `b`.
    pub fn is_bool_literal(&self, b: bool) -> bool {
        matches!(self, Expression::Value(Value::Boolean(v)) if *v == b)
    }

    /// Returns the names of all tables referenced by column references.
    pub fn referenced_tables(&self) -> BTreeSet<&str> {
        let mut tables = BTreeSet::new();
        self.collect_tables(&mut tables);
        tables
    }

    fn collect_tables<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Expression::Field(field) => {
                out.insert(field.table_name());
            }
            Expression::Value(_) => {}
            Expression::Comparison { left, right, .. } => {
                left.collect_tables(out);
                right.collect_tables(out);
            }
            Expression::Conjunction { children, .. } => {
                for child in children {
                    child.collect_tables(out);
                }
            }
        }
    }

    /// Flattens nested ANDs into their non-conjunction leaves, in order.
    pub fn conjuncts(&self) -> Vec<&Expression> {
        let mut out = Vec::new();
        self.collect_conjuncts(&mut out);
        out
    }

    fn collect_conjuncts<'a>(&'a self, out: &mut Vec<&'a Expression>) {
        match self {
            Expression::Conjunction {
                kind: ConjunctionType::And,
                children,
            } => {
                for child in children {
                    child.collect_conjuncts(out);
                }
            }
            other => out.push(other),
        }
    }

    /// Consumes the expression and returns its conjuncts.
    pub fn into_conjuncts(self) -> Vec<Expression> {
        match self {
            Expression::Conjunction {
                kind: ConjunctionType::And,
                children,
            } => children
                .into_iter()
                .flat_map(Expression::into_conjuncts)
                .collect(),
            other => vec![other],
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Field(field) => write!(f, "{}", field),
            Expression::Value(Value::Chars(s)) => write!(f, "'{}'", s),
            Expression::Value(value) => write!(f, "{}", value),
            Expression::Comparison { comp, left, right } => {
                write!(f, "{} {} {}", left, comp, right)
            }
            Expression::Conjunction { kind, children } => {
                if children.is_empty() {
                    return write!(f, "true");
                }
                let parts: Vec<_> = children.iter().map(ToString::to_string).collect();
                write!(f, "({})", parts.join(&format!(" {} ", kind)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::tuple::RowTuple;
    use crate::storage::{Db, FieldMeta};

    fn fixture() -> (Field, Tuple) {
        let db = Db::default();
        let table = db
            .create_table(
                "t",
                vec![
                    FieldMeta::new("id", AttrType::Ints),
                    FieldMeta::new("name", AttrType::Chars),
                ],
            )
            .unwrap();
        let mut record = table
            .make_record(&[Value::int(0), Value::int(5), Value::chars("bob")])
            .unwrap();
        table.insert_record(&mut record).unwrap();
        let field = Field::new(
            table.clone(),
            table.meta().find_field_by_name("id").unwrap().clone(),
        );
        let tuple = Tuple::Row(RowTuple::new(table, record).unwrap());
        (field, tuple)
    }

    #[test]
    fn test_comparison_evaluation() {
        let (id, tuple) = fixture();
        let gt = Expression::comparison(CompOp::Gt, Expression::field(id.clone()), Expression::value(3));
        assert_eq!(gt.get_value(&tuple).unwrap(), Value::Boolean(true));

        let mixed = Expression::comparison(CompOp::Eq, Expression::field(id), Expression::value(5.0f32));
        assert_eq!(mixed.get_value(&tuple).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_conjunction_short_circuit() {
        let (id, tuple) = fixture();
        let expr = Expression::and(vec![
            Expression::comparison(CompOp::Lt, Expression::field(id.clone()), Expression::value(0)),
            Expression::comparison(CompOp::Eq, Expression::field(id), Expression::value(5)),
        ]);
        assert_eq!(expr.get_value(&tuple).unwrap(), Value::Boolean(false));
        assert_eq!(Expression::and(vec![]).get_value(&tuple).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_incomparable_is_false() {
        let (id, tuple) = fixture();
        let expr = Expression::comparison(CompOp::NotEq, Expression::field(id), Expression::value("x"));
        assert_eq!(expr.get_value(&tuple).unwrap(), Value::Boolean(false));
    }

    #[test]
    fn test_try_get_value() {
        let (id, _) = fixture();
        let constant = Expression::comparison(CompOp::Lt, Expression::value(1), Expression::value(2));
        assert_eq!(constant.try_get_value(), Some(Value::Boolean(true)));
        assert_eq!(Expression::field(id).try_get_value(), None);
    }

    #[test]
    fn test_conjuncts_flatten() {
        let (id, _) = fixture();
        let a = Expression::comparison(CompOp::Eq, Expression::field(id.clone()), Expression::value(1));
        let b = Expression::comparison(CompOp::Eq, Expression::field(id), Expression::value(2));
        let nested = Expression::and(vec![a.clone(), Expression::and(vec![b.clone()])]);
        assert_eq!(nested.conjuncts(), vec![&a, &b]);
        assert_eq!(nested.referenced_tables().into_iter().collect::<Vec<_>>(), vec!["t"]);
        assert_eq!(nested.into_conjuncts(), vec![a, b]);
    }
}
