use std::fmt;

use serde::{Deserialize, Serialize};

/// A runtime value
///
/// Values are plain data: cloning one is a deep copy, which is what gives
/// variable reads copy semantics in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// The absent value, written `nulla`
    Null,
    /// Boolean, written `verum` / `falsum`
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// Immutable string
    Str(String),
}

impl Value {
    /// Human-readable type name, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "nulla",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "string",
        }
    }

    /// Truthiness for conditions and logical operators
    ///
    /// `nulla` is false, booleans are themselves, integers are true when
    /// nonzero, strings are true when nonempty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Str(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    /// Renders the value the way `sonus.dic` prints it
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "nulla"),
            Value::Bool(true) => write!(f, "verum"),
            Value::Bool(false) => write!(f, "falsum"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}
