//! Expressions and tuples.

mod expression;
mod tuple;

pub use expression::{ConjunctionType, Expression};
pub use tuple::{JoinedTuple, ProjectTuple, RowTuple, Tuple, TupleCellSpec, ValueListTuple};
