//! Forward-Chaining Expert System
//!
//! A small production-rule engine: facts are matched against rule conditions,
//! activations are ordered on an agenda (salience, then recency), and fired
//! rules assert or retract facts until the agenda is empty.

mod environment;
mod fact;
mod parser;
mod rule;

pub use environment::{AgendaEntry, EngineConfig, Environment};
pub use fact::{Fact, FactId, Value};
pub use parser::{parse_fact, parse_rule, parse_rules};
pub use rule::{Action, CmpOp, Comparison, Condition, FactTemplate, FieldPattern, Pattern, Rule, Slot};

use thiserror::Error;

/// Errors raised while parsing or running rules
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Parse error at byte {position}: {message}")]
    Parse { position: usize, message: String },
    #[error("Variable ?{variable} is not bound in rule {rule}")]
    UnboundVariable { rule: String, variable: String },
    #[error("Test in rule {rule} compares a non-numeric value: {value}")]
    NonNumericTest { rule: String, value: String },
    #[error("Variable ?{variable} in rule {rule} is not bound to a fact")]
    NotAFactBinding { rule: String, variable: String },
    #[error("Unknown fact: {0}")]
    UnknownFact(FactId),
    #[error("Rule firing limit of {0} cycles exceeded")]
    CycleLimit(usize),
}
