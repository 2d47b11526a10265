//! Facts and Values

use serde::Serialize;
use std::fmt;

/// Field value of a fact; serializes as a bare number or string
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Symbol(String),
    /// Quoted string
    Text(String),
}

impl Value {
    /// Shorthand for a symbol
    pub fn symbol(s: impl Into<String>) -> Self {
        Value::Symbol(s.into())
    }

    /// Shorthand for a quoted string
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Numeric content, if any
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Symbol or string content, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) | Value::Text(s) => Some(s),
            Value::Number(_) => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Symbol(s) => f.write_str(s),
            Value::Text(s) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        }
    }
}

/// Ordered fact: a relation name followed by field values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fact {
    pub relation: String,
    pub values: Vec<Value>,
}

impl Fact {
    pub fn new(relation: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            relation: relation.into(),
            values,
        }
    }

    /// First field, the common case for `(relation value)` facts
    pub fn first(&self) -> Option<&Value> {
        self.values.first()
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.relation)?;
        for value in &self.values {
            write!(f, " {}", value)?;
        }
        f.write_str(")")
    }
}

/// Fact identifier; doubles as the assertion timetag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FactId(pub u64);

impl fmt::Display for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f-{}", self.0)
    }
}
