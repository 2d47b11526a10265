//! Rule Definitions

use std::collections::HashMap;
use std::fmt;

use crate::fact::{Fact, FactId, Value};

/// Value or fact bound to a rule variable during matching
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Bound {
    Value(Value),
    Fact(FactId),
}

pub(crate) type Bindings = HashMap<String, Bound>;

/// One field of a pattern
#[derive(Debug, Clone, PartialEq)]
pub enum FieldPattern {
    /// Must equal the value
    Literal(Value),
    /// `?name`: binds on first use, must agree afterwards
    Variable(String),
    /// `?`: matches anything
    Wildcard,
}

/// `(relation field...)` matched against facts of the same arity
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub relation: String,
    pub fields: Vec<FieldPattern>,
}

impl Pattern {
    pub fn new(relation: impl Into<String>, fields: Vec<FieldPattern>) -> Self {
        Self {
            relation: relation.into(),
            fields,
        }
    }

    /// Extend `bindings` so that this pattern matches `fact`
    pub(crate) fn unify(&self, fact: &Fact, bindings: &Bindings) -> Option<Bindings> {
        if self.relation != fact.relation || self.fields.len() != fact.values.len() {
            return None;
        }

        let mut extended = bindings.clone();
        for (field, value) in self.fields.iter().zip(&fact.values) {
            match field {
                FieldPattern::Wildcard => {}
                FieldPattern::Literal(expected) => {
                    if expected != value {
                        return None;
                    }
                }
                FieldPattern::Variable(name) => match extended.get(name) {
                    Some(Bound::Value(bound)) if bound == value => {}
                    Some(_) => return None,
                    None => {
                        extended.insert(name.clone(), Bound::Value(value.clone()));
                    }
                },
            }
        }
        Some(extended)
    }
}

/// Value source in tests and assert templates
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Literal(Value),
    Variable(String),
}

impl Slot {
    pub(crate) fn resolve(&self, rule: &str, bindings: &Bindings) -> Result<Value, crate::EngineError> {
        match self {
            Slot::Literal(value) => Ok(value.clone()),
            Slot::Variable(name) => match bindings.get(name) {
                Some(Bound::Value(value)) => Ok(value.clone()),
                Some(Bound::Fact(id)) => Ok(Value::Symbol(id.to_string())),
                None => Err(crate::EngineError::UnboundVariable {
                    rule: rule.to_string(),
                    variable: name.clone(),
                }),
            },
        }
    }
}

/// Numeric comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CmpOp {
    /// Parse the operator symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "<" => Some(CmpOp::Lt),
            "<=" => Some(CmpOp::Le),
            ">" => Some(CmpOp::Gt),
            ">=" => Some(CmpOp::Ge),
            "=" => Some(CmpOp::Eq),
            "<>" => Some(CmpOp::Ne),
            _ => None,
        }
    }

    pub fn apply(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            CmpOp::Lt => lhs < rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Gt => lhs > rhs,
            CmpOp::Ge => lhs >= rhs,
            CmpOp::Eq => lhs == rhs,
            CmpOp::Ne => lhs != rhs,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::Eq => "=",
            CmpOp::Ne => "<>",
        };
        f.write_str(s)
    }
}

/// `(test (op lhs rhs))`
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub op: CmpOp,
    pub lhs: Slot,
    pub rhs: Slot,
}

impl Comparison {
    pub(crate) fn evaluate(&self, rule: &str, bindings: &Bindings) -> Result<bool, crate::EngineError> {
        let number = |slot: &Slot| -> Result<f64, crate::EngineError> {
            let value = slot.resolve(rule, bindings)?;
            value.as_number().ok_or_else(|| crate::EngineError::NonNumericTest {
                rule: rule.to_string(),
                value: value.to_string(),
            })
        };
        Ok(self.op.apply(number(&self.lhs)?, number(&self.rhs)?))
    }
}

/// Left-hand-side element of a rule
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// A fact must match; `binding` captures its id (`?f <- (...)`)
    Match { binding: Option<String>, pattern: Pattern },
    /// No fact may match
    Not(Pattern),
    /// At least one of the patterns must match
    Any(Vec<Pattern>),
    /// Numeric test over bound variables
    Test(Comparison),
}

/// Fact to assert, with variables substituted at firing time
#[derive(Debug, Clone, PartialEq)]
pub struct FactTemplate {
    pub relation: String,
    pub slots: Vec<Slot>,
}

impl FactTemplate {
    pub(crate) fn instantiate(&self, rule: &str, bindings: &Bindings) -> Result<Fact, crate::EngineError> {
        let values = self
            .slots
            .iter()
            .map(|slot| slot.resolve(rule, bindings))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Fact::new(self.relation.clone(), values))
    }

    /// Convert to a fact when the template holds only literals
    pub fn to_ground_fact(&self) -> Option<Fact> {
        let values = self
            .slots
            .iter()
            .map(|slot| match slot {
                Slot::Literal(value) => Some(value.clone()),
                Slot::Variable(_) => None,
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Fact::new(self.relation.clone(), values))
    }
}

/// Right-hand-side element of a rule
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Assert(FactTemplate),
    /// Retract the fact bound to the variable
    Retract(String),
}

/// Named production rule
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: String,
    /// Higher fires first
    pub salience: i32,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
}

impl Rule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            salience: 0,
            conditions: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn with_salience(mut self, salience: i32) -> Self {
        self.salience = salience;
        self
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn then(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}

impl fmt::Display for FieldPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPattern::Literal(value) => write!(f, "{}", value),
            FieldPattern::Variable(name) => write!(f, "?{}", name),
            FieldPattern::Wildcard => f.write_str("?"),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.relation)?;
        for field in &self.fields {
            write!(f, " {}", field)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Literal(value) => write!(f, "{}", value),
            Slot::Variable(name) => write!(f, "?{}", name),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(test ({} {} {}))", self.op, self.lhs, self.rhs)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Match { binding: Some(name), pattern } => write!(f, "?{} <- {}", name, pattern),
            Condition::Match { binding: None, pattern } => write!(f, "{}", pattern),
            Condition::Not(pattern) => write!(f, "(not {})", pattern),
            Condition::Any(patterns) => {
                f.write_str("(or")?;
                for pattern in patterns {
                    write!(f, " {}", pattern)?;
                }
                f.write_str(")")
            }
            Condition::Test(comparison) => write!(f, "{}", comparison),
        }
    }
}

impl fmt::Display for FactTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.relation)?;
        for slot in &self.slots {
            write!(f, " {}", slot)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Assert(template) => write!(f, "(assert {})", template),
            Action::Retract(name) => write!(f, "(retract ?{})", name),
        }
    }
}

/// Prints the rule in the syntax accepted by [`crate::parse_rule`]
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(defrule {}", self.name)?;
        if self.salience != 0 {
            write!(f, "\n  (declare (salience {}))", self.salience)?;
        }
        for condition in &self.conditions {
            write!(f, "\n  {}", condition)?;
        }
        f.write_str("\n  =>")?;
        for action in &self.actions {
            write!(f, "\n  {}", action)?;
        }
        f.write_str(")")
    }
}
