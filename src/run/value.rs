use std::fmt;

use crate::errors::RuntimeError;

/// A value held in a local variable slot or on an operand stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Int(i32),
}

impl Value {
    pub fn as_int(&self) -> Result<i32, RuntimeError> {
        match self {
            Value::Int(v) => Ok(*v),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
        }
    }
}
