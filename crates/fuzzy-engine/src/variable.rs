//! Linguistic Variables

use serde::{Deserialize, Serialize};

use crate::membership::MembershipFunction;
use crate::FuzzyError;

/// Sampled domain of a variable: `start, start + step, ...` strictly below `stop`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl Universe {
    /// Create a universe, rejecting empty or non-finite ranges
    pub fn new(start: f64, stop: f64, step: f64) -> Result<Self, FuzzyError> {
        let valid = start.is_finite() && stop.is_finite() && step.is_finite() && step > 0.0 && stop > start;
        if !valid {
            return Err(FuzzyError::InvalidUniverse { start, stop, step });
        }
        Ok(Self { start, stop, step })
    }

    /// Number of sample points
    pub fn len(&self) -> usize {
        ((self.stop - self.start) / self.step).ceil() as usize
    }

    /// Always false for a validated universe
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample points in ascending order
    pub fn points(&self) -> Vec<f64> {
        (0..self.len())
            .map(|i| self.start + i as f64 * self.step)
            .collect()
    }
}

/// A named fuzzy term sampled over its variable's universe
#[derive(Debug, Clone)]
pub struct Term {
    name: String,
    function: MembershipFunction,
    samples: Vec<f64>,
}

impl Term {
    /// Term label
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying membership curve
    pub fn function(&self) -> &MembershipFunction {
        &self.function
    }

    /// Membership degree at each universe point
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
}

/// Input or output variable of a control system
#[derive(Debug, Clone)]
pub struct LinguisticVariable {
    name: String,
    universe: Universe,
    points: Vec<f64>,
    terms: Vec<Term>,
}

impl LinguisticVariable {
    /// Create a variable with no terms
    pub fn new(name: impl Into<String>, universe: Universe) -> Self {
        Self {
            name: name.into(),
            points: universe.points(),
            universe,
            terms: Vec::new(),
        }
    }

    /// Builder-style [`add_term`](Self::add_term)
    pub fn with_term(mut self, name: impl Into<String>, function: MembershipFunction) -> Self {
        self.add_term(name, function);
        self
    }

    /// Add or replace a term
    pub fn add_term(&mut self, name: impl Into<String>, function: MembershipFunction) {
        let name = name.into();
        let samples = self.points.iter().map(|&x| function.membership(x)).collect();
        let term = Term { name, function, samples };

        match self.terms.iter_mut().find(|t| t.name == term.name) {
            Some(existing) => *existing = term,
            None => self.terms.push(term),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Universe sample points
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Look up a term by name
    pub fn term(&self, name: &str) -> Option<&Term> {
        self.terms.iter().find(|t| t.name == name)
    }

    /// Smallest and largest sample point
    pub fn bounds(&self) -> (f64, f64) {
        let first = self.points.first().copied().unwrap_or(self.universe.start);
        let last = self.points.last().copied().unwrap_or(self.universe.start);
        (first, last)
    }

    /// Clip a crisp value to the sampled bounds
    pub fn clip(&self, x: f64) -> f64 {
        let (lo, hi) = self.bounds();
        x.clamp(lo, hi)
    }

    /// Clip a finite value; NaN and infinities are rejected
    fn checked_clip(&self, x: f64) -> Result<f64, FuzzyError> {
        if !x.is_finite() {
            return Err(FuzzyError::InvalidInput {
                variable: self.name.clone(),
                value: x,
            });
        }
        Ok(self.clip(x))
    }

    /// Membership of `x` in `term`, interpolated from the sampled curve
    pub fn membership(&self, term: &str, x: f64) -> Result<f64, FuzzyError> {
        let term = self.term(term).ok_or_else(|| FuzzyError::UnknownTerm {
            variable: self.name.clone(),
            term: term.to_string(),
        })?;
        let x = self.checked_clip(x)?;
        Ok(interpolate(&self.points, &term.samples, x))
    }

    /// Membership of `x` in every term, in definition order
    pub fn fuzzify(&self, x: f64) -> Result<Vec<(&str, f64)>, FuzzyError> {
        let x = self.checked_clip(x)?;
        Ok(self
            .terms
            .iter()
            .map(|t| (t.name.as_str(), interpolate(&self.points, &t.samples, x)))
            .collect())
    }
}

/// Piecewise-linear interpolation; values outside `xs` take the edge value
pub(crate) fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    let (Some(&first), Some(&last)) = (xs.first(), xs.last()) else {
        return 0.0;
    };
    if x <= first {
        return ys[0];
    }
    if x >= last {
        return ys[ys.len() - 1];
    }

    let upper = xs.partition_point(|&p| p <= x);
    let Some(lower) = upper.checked_sub(1) else {
        return 0.0;
    };
    let (x0, x1) = (xs[lower], xs[upper]);
    let (y0, y1) = (ys[lower], ys[upper]);
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}
