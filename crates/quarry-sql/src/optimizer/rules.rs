//! Expression rewrite rules.
//!
//! Each rule looks at a single expression node and rewrites it in place.
//! The expression rewriter applies them bottom-up, so a rule sees children
//! that have already been rewritten in the same pass.

use quarry_common::error::QuarryResult;

use super::ExpressionRule;
use crate::expr::{ConjunctionType, Expression};
use crate::storage::Value;

// ============================================================================
// Comparison Simplification
// ============================================================================

/// Folds a comparison between two literals into a boolean literal.
///
/// ```text
/// 1 < 2      =>  true
/// 'a' = 'b'  =>  false
/// ```
#[derive(Debug)]
pub struct ComparisonSimplificationRule;

impl ExpressionRule for ComparisonSimplificationRule {
    fn name(&self) -> &str {
        "ComparisonSimplification"
    }

    fn rewrite(&self, expr: &mut Expression) -> QuarryResult<bool> {
        let Expression::Comparison { left, right, .. } = expr else {
            return Ok(false);
        };
        if !matches!(left.as_ref(), Expression::Value(_))
            || !matches!(right.as_ref(), Expression::Value(_))
        {
            return Ok(false);
        }

        match expr.try_get_value() {
            Some(value) => {
                *expr = Expression::Value(value);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ============================================================================
// Comparison Normalization
// ============================================================================

/// Moves the column of a `literal op column` comparison to the left.
///
/// ```text
/// 3 < t.a  =>  t.a > 3
/// ```
#[derive(Debug)]
pub struct ComparisonNormalizationRule;

impl ExpressionRule for ComparisonNormalizationRule {
    fn name(&self) -> &str {
        "ComparisonNormalization"
    }

    fn rewrite(&self, expr: &mut Expression) -> QuarryResult<bool> {
        let Expression::Comparison { comp, left, right } = expr else {
            return Ok(false);
        };
        if matches!(left.as_ref(), Expression::Value(_))
            && matches!(right.as_ref(), Expression::Field(_))
        {
            std::mem::swap(left, right);
            *comp = comp.mirror();
            return Ok(true);
        }
        Ok(false)
    }
}

// ============================================================================
// Conjunction Simplification
// ============================================================================

/// Simplifies an AND.
///
/// - nested ANDs are flattened into their parent
/// - `true` children are dropped
/// - any `false` child makes the whole conjunction `false`
/// - no children left means `true`
/// - a single child replaces the conjunction
#[derive(Debug)]
pub struct ConjunctionSimplificationRule;

impl ExpressionRule for ConjunctionSimplificationRule {
    fn name(&self) -> &str {
        "ConjunctionSimplification"
    }

    fn rewrite(&self, expr: &mut Expression) -> QuarryResult<bool> {
        let Expression::Conjunction {
            kind: ConjunctionType::And,
            children,
        } = expr
        else {
            return Ok(false);
        };

        if children.iter().any(|c| c.is_bool_literal(false)) {
            *expr = Expression::Value(Value::Boolean(false));
            return Ok(true);
        }

        let needs_flatten = children.iter().any(|c| {
            c.is_bool_literal(true)
                || matches!(
                    c,
                    Expression::Conjunction {
                        kind: ConjunctionType::And,
                        ..
                    }
                )
        });

        let mut changed = false;
        if needs_flatten {
            let flattened: Vec<Expression> = std::mem::take(children)
                .into_iter()
                .flat_map(Expression::into_conjuncts)
                .filter(|c| !c.is_bool_literal(true))
                .collect();
            *children = flattened;
            changed = true;
        }

        match children.len() {
            0 => {
                *expr = Expression::Value(Value::Boolean(true));
                Ok(true)
            }
            1 => {
                let only = children.remove(0);
                *expr = only;
                Ok(true)
            }
            _ => Ok(changed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stmt::{CompOp, Field};
    use crate::storage::{AttrType, Db, FieldMeta};

    fn field() -> Field {
        let db = Db::default();
        let table = db
            .create_table("t", vec![FieldMeta::new("a", AttrType::Ints)])
            .unwrap();
        let meta = table.meta().find_field_by_name("a").unwrap().clone();
        Field::new(table, meta)
    }

    #[test]
    fn test_comparison_simplification() {
        let rule = ComparisonSimplificationRule;
        let mut expr = Expression::comparison(CompOp::Lt, Expression::value(1), Expression::value(2));
        assert!(rule.rewrite(&mut expr).unwrap());
        assert_eq!(expr, Expression::value(true));

        let mut expr =
            Expression::comparison(CompOp::Lt, Expression::field(field()), Expression::value(2));
        assert!(!rule.rewrite(&mut expr).unwrap());
    }

    #[test]
    fn test_comparison_normalization() {
        let rule = ComparisonNormalizationRule;
        let f = field();
        let mut expr = Expression::comparison(CompOp::Lt, Expression::value(3), Expression::field(f.clone()));
        assert!(rule.rewrite(&mut expr).unwrap());
        assert_eq!(
            expr,
            Expression::comparison(CompOp::Gt, Expression::field(f), Expression::value(3))
        );
        assert!(!rule.rewrite(&mut expr).unwrap());
    }

    #[test]
    fn test_conjunction_simplification() {
        let rule = ConjunctionSimplificationRule;
        let f = field();
        let cmp = |v: i32| Expression::comparison(CompOp::Eq, Expression::field(f.clone()), Expression::value(v));

        let mut expr = Expression::and(vec![
            cmp(1),
            Expression::value(true),
            Expression::and(vec![cmp(2), cmp(3)]),
        ]);
        assert!(rule.rewrite(&mut expr).unwrap());
        assert_eq!(expr, Expression::and(vec![cmp(1), cmp(2), cmp(3)]));
        assert!(!rule.rewrite(&mut expr).unwrap());

        let mut expr = Expression::and(vec![cmp(1), Expression::value(false)]);
        assert!(rule.rewrite(&mut expr).unwrap());
        assert_eq!(expr, Expression::value(false));

        let mut expr = Expression::and(vec![Expression::value(true)]);
        assert!(rule.rewrite(&mut expr).unwrap());
        assert_eq!(expr, Expression::value(true));

        let mut expr = Expression::and(vec![cmp(4)]);
        assert!(rule.rewrite(&mut expr).unwrap());
        assert_eq!(expr, cmp(4));
    }
}
