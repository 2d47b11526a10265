//! Heuristic Fallback
//!
//! Provides a crisp diagnosis score when the fuzzy rule base is too sparse to
//! produce one for a given combination of symptom severities.

mod rules;

pub use rules::{FallbackConfig, FallbackEngine, FallbackEstimate, FallbackReason};

use thiserror::Error;

/// Errors from the fallback heuristics
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FallbackError {
    #[error("No scores supplied")]
    Empty,
    #[error("Score {0} is not finite")]
    NonFinite(f64),
}
