//! Fuzzy Inference Engine
//!
//! Mamdani-style fuzzy control: trapezoidal/triangular membership functions,
//! min/max rule evaluation and centroid defuzzification over a sampled universe.

mod defuzz;
mod membership;
mod rule;
mod system;
mod variable;

pub use defuzz::centroid;
pub use membership::MembershipFunction;
pub use rule::{Antecedent, FuzzyRule};
pub use system::{ControlSystem, ControlSystemBuilder, Inference, TermActivation};
pub use variable::{LinguisticVariable, Universe};

use thiserror::Error;

/// Errors during fuzzy inference
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FuzzyError {
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),
    #[error("Unknown term '{term}' for variable '{variable}'")]
    UnknownTerm { variable: String, term: String },
    #[error("Duplicate variable: {0}")]
    DuplicateVariable(String),
    #[error("Missing input value for variable: {0}")]
    MissingInput(String),
    #[error("Invalid input for {variable}: {value}")]
    InvalidInput { variable: String, value: f64 },
    #[error("Control system has no output variable")]
    NoOutput,
    #[error("Invalid universe: start={start}, stop={stop}, step={step}")]
    InvalidUniverse { start: f64, stop: f64, step: f64 },
    #[error("No rule was activated by the given inputs; output area is zero")]
    NoActivation,
}
