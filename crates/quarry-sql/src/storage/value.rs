//! Runtime values and attribute types.
//!
//! `Value` is the typed cell representation shared by statements,
//! expressions, tuples and the record codec.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Attribute (column) types supported by table schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttrType {
    /// 32-bit signed integer.
    Ints,
    /// 32-bit floating point.
    Floats,
    /// Character string.
    Chars,
    /// Boolean.
    Booleans,
}

impl AttrType {
    /// Returns the type tag used by the record codec.
    pub(crate) fn tag(self) -> u8 {
        match self {
            AttrType::Ints => 1,
            AttrType::Floats => 2,
            AttrType::Chars => 3,
            AttrType::Booleans => 4,
        }
    }

    /// Inverse of [`AttrType::tag`].
    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(AttrType::Ints),
            2 => Some(AttrType::Floats),
            3 => Some(AttrType::Chars),
            4 => Some(AttrType::Booleans),
            _ => None,
        }
    }

    /// Returns the zero value of this type.
    pub fn default_value(self) -> Value {
        match self {
            AttrType::Ints => Value::Int(0),
            AttrType::Floats => Value::Float(0.0),
            AttrType::Chars => Value::Chars(String::new()),
            AttrType::Booleans => Value::Boolean(false),
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrType::Ints => write!(f, "ints"),
            AttrType::Floats => write!(f, "floats"),
            AttrType::Chars => write!(f, "chars"),
            AttrType::Booleans => write!(f, "booleans"),
        }
    }
}

/// A typed runtime value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Integer value.
    Int(i32),
    /// Floating point value.
    Float(f32),
    /// String value.
    Chars(String),
    /// Boolean value.
    Boolean(bool),
}

impl Value {
    /// Creates an integer value.
    pub fn int(v: i32) -> Self {
        Value::Int(v)
    }

    /// Creates a float value.
    pub fn float(v: f32) -> Self {
        Value::Float(v)
    }

    /// Creates a string value.
    pub fn chars(v: impl Into<String>) -> Self {
        Value::Chars(v.into())
    }

    /// Creates a boolean value.
    pub fn boolean(v: bool) -> Self {
        Value::Boolean(v)
    }

    /// Returns the attribute type of this value.
    pub fn attr_type(&self) -> AttrType {
        match self {
            Value::Int(_) => AttrType::Ints,
            Value::Float(_) => AttrType::Floats,
            Value::Chars(_) => AttrType::Chars,
            Value::Boolean(_) => AttrType::Booleans,
        }
    }

    /// Interprets this value as a predicate outcome.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Chars(s) => !s.is_empty(),
            Value::Boolean(b) => *b,
        }
    }

    /// Returns the boolean payload, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(f64::from(*i)),
            Value::Float(f) => Some(f64::from(*f)),
            _ => None,
        }
    }

    /// Compares two values.
    ///
    /// Integers and floats compare numerically; other cross-type pairs are
    /// incomparable and yield `None`.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Chars(a), Value::Chars(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                _ => None,
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Chars(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", if *b { "true" } else { "false" }),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Chars(v.to_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_type() {
        assert_eq!(Value::int(1).attr_type(), AttrType::Ints);
        assert_eq!(Value::chars("a").attr_type(), AttrType::Chars);
        assert_eq!(AttrType::Floats.default_value(), Value::Float(0.0));
        for ty in [
            AttrType::Ints,
            AttrType::Floats,
            AttrType::Chars,
            AttrType::Booleans,
        ] {
            assert_eq!(AttrType::from_tag(ty.tag()), Some(ty));
        }
        assert_eq!(AttrType::from_tag(0), None);
    }

    #[test]
    fn test_value_comparison() {
        assert_eq!(Value::int(1).compare(&Value::int(2)), Some(Ordering::Less));
        assert_eq!(
            Value::chars("b").compare(&Value::chars("a")),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::int(10).compare(&Value::float(10.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(Value::int(1).compare(&Value::chars("1")), None);
    }

    #[test]
    fn test_value_truthiness() {
        assert!(Value::boolean(true).is_truthy());
        assert!(!Value::int(0).is_truthy());
        assert!(!Value::chars("").is_truthy());
        assert_eq!(Value::boolean(false).as_bool(), Some(false));
        assert_eq!(Value::int(1).as_bool(), None);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::int(42).to_string(), "42");
        assert_eq!(Value::chars("foo").to_string(), "foo");
        assert_eq!(Value::boolean(true).to_string(), "true");
    }
}
