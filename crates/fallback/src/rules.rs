//! Fallback Heuristics

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::FallbackError;

/// Why the fallback produced its score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Mean of the symptom severities
    MeanSeverity,
}

/// Fallback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Output score range (inclusive)
    pub output_range: (f64, f64),
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            output_range: (0.0, 10.0),
        }
    }
}

/// Heuristic score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallbackEstimate {
    pub score: f64,
    pub reason: FallbackReason,
}

/// Rule-free score estimator
#[derive(Debug, Clone, Default)]
pub struct FallbackEngine {
    config: FallbackConfig,
}

impl FallbackEngine {
    pub fn new(config: FallbackConfig) -> Self {
        Self { config }
    }

    /// Estimate a diagnosis score from raw severities
    pub fn estimate(&self, scores: &[f64]) -> Result<FallbackEstimate, FallbackError> {
        if scores.is_empty() {
            return Err(FallbackError::Empty);
        }
        if let Some(&bad) = scores.iter().find(|s| !s.is_finite()) {
            return Err(FallbackError::NonFinite(bad));
        }

        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        let (min, max) = self.config.output_range;
        let score = mean.clamp(min, max);

        debug!("Fallback mean severity over {} scores: {:.3}", scores.len(), mean);
        info!("Using fallback diagnosis score {:.3}", score);

        Ok(FallbackEstimate {
            score,
            reason: FallbackReason::MeanSeverity,
        })
    }
}
