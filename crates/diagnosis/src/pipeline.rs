//! Diagnosis Pipeline Implementation

use expert_system::{EngineConfig, Environment, Fact, Value};
use fallback::{FallbackConfig, FallbackEngine};
use fuzzy_engine::{FuzzyError, TermActivation};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::category::Category;
use crate::fuzzy_model;
use crate::rules::{DIAGNOSIS_RELATION, RECOMMENDATION_RELATION, RULE_BASE, SCORE_RELATION};
use crate::symptoms::Symptoms;
use crate::DiagnosisError;

/// Shown when no category rule fired
pub const UNDETERMINED: &str = "No determinado";
/// Shown when no recommendation was asserted
pub const NO_RECOMMENDATION: &str = "No hay recomendaciones disponibles";

/// Outcome of a diagnosis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    /// Crisp score in the output universe
    pub score: f64,
    pub category: Option<Category>,
    pub recommendation: Option<String>,
    /// Score came from the fallback heuristic instead of the fuzzy system
    pub used_fallback: bool,
    /// Output term activations from the fuzzy system
    pub activations: Vec<TermActivation>,
}

impl Diagnosis {
    /// User-facing summary line
    pub fn message(&self) -> String {
        let category = self.category.map(|c| c.as_str()).unwrap_or(UNDETERMINED);
        let recommendation = self.recommendation.as_deref().unwrap_or(NO_RECOMMENDATION);
        format!("Diagnóstico: {}. Recomendación: {}", category, recommendation)
    }
}

/// Runs fuzzy scoring then rule-based classification.
///
/// Both the control system and the rule environment are built per call, so a
/// pipeline can be shared freely between requests.
#[derive(Debug, Clone, Default)]
pub struct DiagnosisPipeline {
    engine_config: EngineConfig,
}

impl DiagnosisPipeline {
    /// Create a new pipeline
    pub fn new(engine_config: EngineConfig) -> Self {
        info!("Creating diagnosis pipeline: max_cycles={}", engine_config.max_cycles);
        Self { engine_config }
    }

    /// Score and classify one set of symptoms
    pub fn diagnose(&self, symptoms: &Symptoms) -> Result<Diagnosis, DiagnosisError> {
        let system = fuzzy_model::control_system()?;
        let inputs: Vec<(&str, f64)> = symptoms
            .iter()
            .map(|(kind, value)| (kind.variable_name(), value))
            .collect();

        let (score, activations, used_fallback) = match system.compute(&inputs) {
            Ok(inference) => (inference.crisp, inference.activations, false),
            Err(FuzzyError::NoActivation) => {
                warn!("No fuzzy rule activated for {:?}; using fallback", symptoms.values());
                let engine = FallbackEngine::new(FallbackConfig {
                    output_range: system.output().bounds(),
                });
                let estimate = engine.estimate(&symptoms.values())?;
                let idle = system
                    .output()
                    .terms()
                    .iter()
                    .map(|t| TermActivation {
                        term: t.name().to_string(),
                        degree: 0.0,
                    })
                    .collect();
                (estimate.score, idle, true)
            }
            Err(e) => return Err(e.into()),
        };

        let (category, recommendation) = self.classify(score)?;
        debug!(
            "Diagnosis score={:.3} category={:?} fallback={}",
            score, category, used_fallback
        );

        Ok(Diagnosis {
            score,
            category,
            recommendation,
            used_fallback,
            activations,
        })
    }

    /// Classify a crisp score with the rule base
    pub fn classify(&self, score: f64) -> Result<(Option<Category>, Option<String>), DiagnosisError> {
        let mut env = Environment::new(self.engine_config.clone());
        env.build(RULE_BASE)?;
        env.assert_fact(Fact::new(SCORE_RELATION, vec![Value::Number(score)]));
        env.run(None)?;

        let category = env
            .facts_of(DIAGNOSIS_RELATION)
            .filter_map(|f| f.first().and_then(Value::as_str))
            .find_map(|label| label.parse::<Category>().ok());
        let recommendation = env
            .facts_of(RECOMMENDATION_RELATION)
            .filter_map(|f| f.first().and_then(Value::as_str))
            .map(str::to_string)
            .next();

        Ok((category, recommendation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RECOMMENDATION;
    use crate::symptoms::SymptomKind;
    use proptest::prelude::*;

    fn pipeline() -> DiagnosisPipeline {
        DiagnosisPipeline::default()
    }

    #[test]
    fn test_all_zero_is_normal() {
        let diagnosis = pipeline().diagnose(&Symptoms::uniform(0.0)).unwrap();
        assert!((diagnosis.score - 1.0).abs() < 1e-9);
        assert_eq!(diagnosis.category, Some(Category::Normal));
        assert_eq!(diagnosis.recommendation.as_deref(), Some(RECOMMENDATION));
        assert!(!diagnosis.used_fallback);
        assert_eq!(
            diagnosis.message(),
            format!("Diagnóstico: Normal. Recomendación: {}", RECOMMENDATION)
        );
    }

    #[test]
    fn test_moderate_symptoms_are_cold() {
        let diagnosis = pipeline().diagnose(&Symptoms::uniform(5.0)).unwrap();
        assert!((diagnosis.score - 5.0).abs() < 1e-9);
        assert_eq!(diagnosis.category, Some(Category::Resfriado));
        assert_eq!(diagnosis.recommendation.as_deref(), Some(RECOMMENDATION));
        assert_eq!(
            diagnosis.message(),
            format!("Diagnóstico: Resfriado. Recomendación: {}", RECOMMENDATION)
        );
    }

    #[test]
    fn test_severe_symptoms_are_flu() {
        let diagnosis = pipeline().diagnose(&Symptoms::uniform(10.0)).unwrap();
        assert!((diagnosis.score - (7.0 + 2.5 * 2.0 / 3.0)).abs() < 1e-9);
        assert_eq!(diagnosis.category, Some(Category::Gripe));
        assert_eq!(diagnosis.recommendation.as_deref(), Some(RECOMMENDATION));
    }

    #[test]
    fn test_mixed_symptoms_use_fallback() {
        let mut symptoms = Symptoms::uniform(5.0);
        symptoms.set(SymptomKind::Onset, 0.0);

        let diagnosis = pipeline().diagnose(&symptoms).unwrap();
        assert!(diagnosis.used_fallback);
        assert!((diagnosis.score - 25.0 / 6.0).abs() < 1e-9);
        assert_eq!(diagnosis.category, Some(Category::Resfriado));
        assert!(diagnosis.activations.iter().all(|a| a.degree == 0.0));
    }

    #[test]
    fn test_classify_thresholds() {
        let pipeline = pipeline();
        let category = |score: f64| pipeline.classify(score).unwrap().0;

        assert_eq!(category(0.0), Some(Category::Normal));
        assert_eq!(category(3.0), Some(Category::Normal));
        assert_eq!(category(3.01), Some(Category::Resfriado));
        assert_eq!(category(7.99), Some(Category::Resfriado));
        assert_eq!(category(8.0), Some(Category::Gripe));
        assert_eq!(category(10.0), Some(Category::Gripe));
    }

    #[test]
    fn test_every_category_gets_the_recommendation() {
        let pipeline = pipeline();
        for score in [0.0, 1.0, 3.0, 4.0, 6.0, 8.0, 9.5] {
            let (category, recommendation) = pipeline.classify(score).unwrap();
            assert!(category.is_some(), "score {}", score);
            assert_eq!(recommendation.as_deref(), Some(RECOMMENDATION), "score {}", score);
        }
    }

    #[test]
    fn test_undetermined_message() {
        let diagnosis = Diagnosis {
            score: f64::NAN,
            category: None,
            recommendation: None,
            used_fallback: false,
            activations: Vec::new(),
        };
        assert_eq!(
            diagnosis.message(),
            "Diagnóstico: No determinado. Recomendación: No hay recomendaciones disponibles"
        );
    }

    #[test]
    fn test_diagnosis_serializes() {
        let diagnosis = pipeline().diagnose(&Symptoms::uniform(5.0)).unwrap();
        let json = serde_json::to_value(&diagnosis).unwrap();
        assert_eq!(json["category"], "Resfriado");
        assert_eq!(json["used_fallback"], false);
        assert_eq!(json["activations"].as_array().unwrap().len(), 3);
    }

    proptest! {
        #[test]
        fn in_range_symptoms_always_get_a_diagnosis(values in proptest::array::uniform6(0.0f64..=10.0)) {
            let mut symptoms = Symptoms::default();
            for (kind, value) in SymptomKind::ALL.into_iter().zip(values) {
                symptoms.set(kind, value);
            }
            let diagnosis = pipeline().diagnose(&symptoms).unwrap();
            prop_assert!(diagnosis.category.is_some());
            prop_assert!((0.0..=10.0).contains(&diagnosis.score));
            let message = diagnosis.message();
            prop_assert!(message.starts_with("Diagnóstico: "));
            prop_assert!(message.ends_with(RECOMMENDATION));
        }
    }
}
