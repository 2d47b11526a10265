//! Score Validator for Parsing and Range Checking

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Valid severity range (inclusive)
    pub score_range: (f64, f64),
    /// Clamp out-of-range scores instead of rejecting them
    pub clamp_out_of_range: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            score_range: (0.0, 10.0),
            clamp_out_of_range: true,
        }
    }
}

/// Validator for symptom severity scores
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Parse a raw form value into a score.
    ///
    /// Surrounding whitespace is ignored. Empty, non-numeric and non-finite
    /// values are rejected; the result is then range checked.
    pub fn parse_score(&self, field: &'static str, raw: Option<&str>) -> Result<f64, ValidationError> {
        let raw = raw.ok_or(ValidationError::MissingField(field))?;
        let value = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ValidationError::NotANumber {
                field,
                raw: raw.to_string(),
            })?;
        self.check_score(field, value)
    }

    /// Range check a numeric score, clamping when configured to
    pub fn check_score(&self, field: &'static str, value: f64) -> Result<f64, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotANumber {
                field,
                raw: value.to_string(),
            });
        }
        match self.validate_range(field, value) {
            Ok(()) => Ok(value),
            Err(e) if self.config.clamp_out_of_range => {
                let (min, max) = self.config.score_range;
                warn!("{}; clamping", e);
                Ok(value.clamp(min, max))
            }
            Err(e) => Err(e),
        }
    }

    /// Validate a single value against the score range
    pub fn validate_range(&self, field: &'static str, value: f64) -> Result<(), ValidationError> {
        let (min, max) = self.config.score_range;
        if value < min || value > max {
            Err(ValidationError::OutOfRange { field, value, min, max })
        } else {
            Ok(())
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
