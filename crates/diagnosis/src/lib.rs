//! Symptom Diagnosis
//!
//! Scores six symptom severities with a fuzzy control system and classifies
//! the score with a forward-chaining rule base.

pub mod category;
pub mod fuzzy_model;
pub mod pipeline;
pub mod rules;
pub mod symptoms;

pub use category::Category;
pub use pipeline::{Diagnosis, DiagnosisPipeline};
pub use symptoms::{RawSymptoms, SymptomKind, Symptoms};

use thiserror::Error;

/// Diagnosis error types
#[derive(Error, Debug)]
pub enum DiagnosisError {
    #[error("Invalid symptoms: {0}")]
    Validation(#[from] data_validator::ValidationError),

    #[error("Fuzzy inference failed: {0}")]
    Fuzzy(#[from] fuzzy_engine::FuzzyError),

    #[error("Rule engine failed: {0}")]
    Rules(#[from] expert_system::EngineError),

    #[error("Fallback estimate failed: {0}")]
    Fallback(#[from] fallback::FallbackError),
}
