use std::cmp::Ordering;
use std::fmt::Display;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use super::ty::Type;

pub const TRUE: Value = Value::Boolean(true);
pub const FALSE: Value = Value::Boolean(false);

/// A runtime value. The set of kinds is closed; equality is structural
/// (value-based), which deliberately diverges from the identity comparison
/// observed in the reference behavior.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Boolean(bool),
    Integer(BigInt),
    Decimal(BigDecimal),
    Character(char),
    String(String),
}

impl Value {
    pub fn ty(&self) -> Type {
        match self {
            Value::Nil => Type::Nil,
            Value::Boolean(_) => Type::Boolean,
            Value::Integer(_) => Type::Integer,
            Value::Decimal(_) => Type::Decimal,
            Value::Character(_) => Type::Character,
            Value::String(_) => Type::String,
        }
    }

    /// Three-way comparison for values of the same comparable kind. `None`
    /// when the kinds differ or are not comparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Boolean(left), Value::Boolean(right)) => Some(left.cmp(right)),
            (Value::Integer(left), Value::Integer(right)) => Some(left.cmp(right)),
            (Value::Decimal(left), Value::Decimal(right)) => left.partial_cmp(right),
            (Value::Character(left), Value::Character(right)) => Some(left.cmp(right)),
            (Value::String(left), Value::String(right)) => Some(left.cmp(right)),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => write!(f, "NIL"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Integer(value) => write!(f, "{value}"),
            Value::Decimal(value) => write!(f, "{value}"),
            Value::Character(value) => write!(f, "{value}"),
            Value::String(value) => write!(f, "{value}"),
        }
    }
}
