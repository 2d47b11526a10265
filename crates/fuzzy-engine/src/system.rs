//! Control System Implementation

use serde::Serialize;
use tracing::{debug, trace};

use crate::defuzz::centroid;
use crate::rule::FuzzyRule;
use crate::variable::{interpolate, LinguisticVariable};
use crate::FuzzyError;

/// Activation level of one output term
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermActivation {
    pub term: String,
    pub degree: f64,
}

/// Result of a single inference pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inference {
    /// Defuzzified output value
    pub crisp: f64,
    /// Aggregated activation per output term, in definition order
    pub activations: Vec<TermActivation>,
}

impl Inference {
    /// Activation of a specific output term
    pub fn activation(&self, term: &str) -> Option<f64> {
        self.activations
            .iter()
            .find(|a| a.term == term)
            .map(|a| a.degree)
    }
}

/// Builder validating variables and rules before producing a [`ControlSystem`]
#[derive(Debug, Default)]
pub struct ControlSystemBuilder {
    inputs: Vec<LinguisticVariable>,
    output: Option<LinguisticVariable>,
    rules: Vec<FuzzyRule>,
}

impl ControlSystemBuilder {
    /// Add an input (antecedent) variable
    pub fn input(mut self, variable: LinguisticVariable) -> Self {
        self.inputs.push(variable);
        self
    }

    /// Set the output (consequent) variable
    pub fn output(mut self, variable: LinguisticVariable) -> Self {
        self.output = Some(variable);
        self
    }

    /// Add a rule
    pub fn rule(mut self, rule: FuzzyRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add several rules
    pub fn rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = FuzzyRule>,
    {
        self.rules.extend(rules);
        self
    }

    /// Validate and build
    pub fn build(self) -> Result<ControlSystem, FuzzyError> {
        let output = self.output.ok_or(FuzzyError::NoOutput)?;

        for (i, var) in self.inputs.iter().enumerate() {
            let clashes_with_input = self.inputs[..i].iter().any(|v| v.name() == var.name());
            if clashes_with_input || var.name() == output.name() {
                return Err(FuzzyError::DuplicateVariable(var.name().to_string()));
            }
        }

        for rule in &self.rules {
            for (variable, term) in rule.antecedent.clauses() {
                let input = self
                    .inputs
                    .iter()
                    .find(|v| v.name() == variable)
                    .ok_or_else(|| FuzzyError::UnknownVariable(variable.to_string()))?;
                if input.term(term).is_none() {
                    return Err(FuzzyError::UnknownTerm {
                        variable: variable.to_string(),
                        term: term.to_string(),
                    });
                }
            }
            if output.term(&rule.consequent).is_none() {
                return Err(FuzzyError::UnknownTerm {
                    variable: output.name().to_string(),
                    term: rule.consequent.clone(),
                });
            }
        }

        debug!(
            "Built control system: {} inputs, output '{}', {} rules",
            self.inputs.len(),
            output.name(),
            self.rules.len()
        );

        Ok(ControlSystem {
            inputs: self.inputs,
            output,
            rules: self.rules,
        })
    }
}

/// Mamdani fuzzy control system (min implication, max aggregation, centroid)
#[derive(Debug, Clone)]
pub struct ControlSystem {
    inputs: Vec<LinguisticVariable>,
    output: LinguisticVariable,
    rules: Vec<FuzzyRule>,
}

impl ControlSystem {
    /// Start building a control system
    pub fn builder() -> ControlSystemBuilder {
        ControlSystemBuilder::default()
    }

    pub fn inputs(&self) -> &[LinguisticVariable] {
        &self.inputs
    }

    pub fn output(&self) -> &LinguisticVariable {
        &self.output
    }

    pub fn rules(&self) -> &[FuzzyRule] {
        &self.rules
    }

    /// Run one inference pass. Every input variable needs exactly one value.
    pub fn compute(&self, values: &[(&str, f64)]) -> Result<Inference, FuzzyError> {
        let crisp_inputs = self.resolve_inputs(values)?;

        let degree = |variable: &str, term: &str| -> Result<f64, FuzzyError> {
            let index = self
                .inputs
                .iter()
                .position(|v| v.name() == variable)
                .ok_or_else(|| FuzzyError::UnknownVariable(variable.to_string()))?;
            self.inputs[index].membership(term, crisp_inputs[index])
        };

        let mut activations: Vec<TermActivation> = self
            .output
            .terms()
            .iter()
            .map(|t| TermActivation {
                term: t.name().to_string(),
                degree: 0.0,
            })
            .collect();

        for rule in &self.rules {
            let strength = rule.firing_strength(&degree)?;
            trace!("Rule -> {} fired with strength {:.4}", rule.consequent, strength);
            if let Some(slot) = activations.iter_mut().find(|a| a.term == rule.consequent) {
                slot.degree = slot.degree.max(strength);
            }
        }

        let (xs, mus) = self.aggregate(&activations);
        let crisp = centroid(&xs, &mus)?;

        debug!("Fuzzy output '{}' = {:.4}", self.output.name(), crisp);

        Ok(Inference { crisp, activations })
    }

    fn resolve_inputs(&self, values: &[(&str, f64)]) -> Result<Vec<f64>, FuzzyError> {
        if let Some((name, _)) = values
            .iter()
            .find(|(name, _)| self.inputs.iter().all(|v| v.name() != *name))
        {
            return Err(FuzzyError::UnknownVariable(name.to_string()));
        }

        self.inputs
            .iter()
            .map(|var| {
                let value = values
                    .iter()
                    .find(|(name, _)| *name == var.name())
                    .map(|(_, value)| *value)
                    .ok_or_else(|| FuzzyError::MissingInput(var.name().to_string()))?;
                if !value.is_finite() {
                    return Err(FuzzyError::InvalidInput {
                        variable: var.name().to_string(),
                        value,
                    });
                }
                Ok(var.clip(value))
            })
            .collect()
    }

    /// Clip each output term at its activation and take the pointwise maximum.
    ///
    /// The universe is upsampled with every point where a term crosses its
    /// cut level so the clipped plateau edges are represented exactly.
    fn aggregate(&self, activations: &[TermActivation]) -> (Vec<f64>, Vec<f64>) {
        let points = self.output.points();
        let mut xs = points.to_vec();

        for (term, activation) in self.output.terms().iter().zip(activations) {
            let cut = activation.degree;
            if cut <= 0.0 || cut >= 1.0 {
                continue;
            }
            for (x, y) in points.windows(2).zip(term.samples().windows(2)) {
                if (y[0] - cut) * (y[1] - cut) < 0.0 {
                    xs.push(x[0] + (cut - y[0]) * (x[1] - x[0]) / (y[1] - y[0]));
                }
            }
        }

        xs.sort_by(f64::total_cmp);
        xs.dedup_by(|a, b| (*a - *b).abs() < 1e-12);

        let mus = xs
            .iter()
            .map(|&x| {
                self.output
                    .terms()
                    .iter()
                    .zip(activations)
                    .map(|(term, activation)| interpolate(points, term.samples(), x).min(activation.degree))
                    .fold(0.0, f64::max)
            })
            .collect();

        (xs, mus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Antecedent, MembershipFunction, Universe};
    use proptest::prelude::*;

    fn universe() -> Universe {
        Universe::new(0.0, 10.0, 0.5).unwrap()
    }

    fn tip_system() -> ControlSystem {
        let service = LinguisticVariable::new("service", universe())
            .with_term("poor", MembershipFunction::trapezoidal(0.0, 0.0, 1.5, 3.0))
            .with_term("good", MembershipFunction::trapezoidal(2.5, 4.0, 7.0, 7.5))
            .with_term("great", MembershipFunction::trapezoidal(7.0, 9.0, 10.0, 10.0));
        let food = LinguisticVariable::new("food", universe())
            .with_term("bad", MembershipFunction::trapezoidal(0.0, 0.0, 1.5, 3.0))
            .with_term("fine", MembershipFunction::trapezoidal(2.5, 4.0, 7.0, 7.5))
            .with_term("tasty", MembershipFunction::trapezoidal(7.0, 9.0, 10.0, 10.0));
        let tip = LinguisticVariable::new("tip", universe())
            .with_term("low", MembershipFunction::triangular(0.0, 0.0, 3.0))
            .with_term("medium", MembershipFunction::triangular(2.0, 5.0, 8.0))
            .with_term("high", MembershipFunction::triangular(7.0, 10.0, 10.0));

        ControlSystem::builder()
            .input(service)
            .input(food)
            .output(tip)
            .rule(FuzzyRule::new(Antecedent::is("service", "poor") & Antecedent::is("food", "bad"), "low"))
            .rule(FuzzyRule::new(Antecedent::is("service", "good") & Antecedent::is("food", "fine"), "medium"))
            .rule(FuzzyRule::new(Antecedent::is("service", "great") & Antecedent::is("food", "tasty"), "high"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_low_inputs_give_low_centroid() {
        let result = tip_system().compute(&[("service", 0.0), ("food", 0.0)]).unwrap();
        assert!((result.crisp - 1.0).abs() < 1e-9);
        assert_eq!(result.activation("low"), Some(1.0));
        assert_eq!(result.activation("high"), Some(0.0));
    }

    #[test]
    fn test_middle_inputs_give_symmetric_centroid() {
        let result = tip_system().compute(&[("service", 5.0), ("food", 5.0)]).unwrap();
        assert!((result.crisp - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_high_inputs_are_truncated_by_universe() {
        // The output universe stops at 9.5, so the "high" triangle is cut
        // there: centroid of the ramp from 7 to 9.5 is 7 + 2/3 * 2.5.
        let result = tip_system().compute(&[("service", 10.0), ("food", 10.0)]).unwrap();
        assert!((result.crisp - (7.0 + 2.5 * 2.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_partial_activation_clips_output() {
        // service 7.25: good = 0.5, great = 0.125; food 7.25 likewise
        let result = tip_system().compute(&[("service", 7.25), ("food", 7.25)]).unwrap();
        assert!((result.activation("medium").unwrap() - 0.5).abs() < 1e-12);
        assert!((result.activation("high").unwrap() - 0.125).abs() < 1e-12);
        assert!(result.crisp > 5.0 && result.crisp < 8.0);
    }

    #[test]
    fn test_sparse_inputs_activate_nothing() {
        let err = tip_system().compute(&[("service", 0.0), ("food", 5.0)]).unwrap_err();
        assert_eq!(err, FuzzyError::NoActivation);
    }

    #[test]
    fn test_missing_and_unknown_inputs() {
        let system = tip_system();
        assert_eq!(
            system.compute(&[("service", 1.0)]).unwrap_err(),
            FuzzyError::MissingInput("food".to_string())
        );
        assert_eq!(
            system.compute(&[("service", 1.0), ("food", 1.0), ("ambience", 1.0)]).unwrap_err(),
            FuzzyError::UnknownVariable("ambience".to_string())
        );
        assert!(matches!(
            system.compute(&[("service", f64::NAN), ("food", 1.0)]),
            Err(FuzzyError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_builder_rejects_unknown_term() {
        let service = LinguisticVariable::new("service", universe())
            .with_term("poor", MembershipFunction::triangular(0.0, 0.0, 5.0));
        let tip = LinguisticVariable::new("tip", universe())
            .with_term("low", MembershipFunction::triangular(0.0, 0.0, 5.0));

        let err = ControlSystem::builder()
            .input(service)
            .output(tip)
            .rule(FuzzyRule::new(Antecedent::is("service", "awful"), "low"))
            .build()
            .unwrap_err();
        assert!(matches!(err, FuzzyError::UnknownTerm { .. }));
    }

    #[test]
    fn test_builder_requires_output() {
        let err = ControlSystem::builder().build().unwrap_err();
        assert_eq!(err, FuzzyError::NoOutput);
    }

    #[test]
    fn test_builder_rejects_duplicate_variable() {
        let a = LinguisticVariable::new("x", universe());
        let b = LinguisticVariable::new("x", universe());
        let out = LinguisticVariable::new("y", universe());
        let err = ControlSystem::builder().input(a).input(b).output(out).build().unwrap_err();
        assert_eq!(err, FuzzyError::DuplicateVariable("x".to_string()));
    }

    proptest! {
        #[test]
        fn crisp_output_stays_in_universe(service in 0.0f64..10.0, food in 0.0f64..10.0) {
            match tip_system().compute(&[("service", service), ("food", food)]) {
                Ok(result) => prop_assert!((0.0..=9.5).contains(&result.crisp)),
                Err(e) => prop_assert_eq!(e, FuzzyError::NoActivation),
            }
        }
    }
}
