//! Fuzzy Rules

use std::ops::{BitAnd, BitOr, Not};

use crate::FuzzyError;

/// Left-hand side of a fuzzy rule
#[derive(Debug, Clone, PartialEq)]
pub enum Antecedent {
    /// `variable is term`
    Is { variable: String, term: String },
    /// Fuzzy AND (minimum)
    And(Box<Antecedent>, Box<Antecedent>),
    /// Fuzzy OR (maximum)
    Or(Box<Antecedent>, Box<Antecedent>),
    /// Complement
    Not(Box<Antecedent>),
}

impl Antecedent {
    /// `variable is term`
    pub fn is(variable: impl Into<String>, term: impl Into<String>) -> Self {
        Antecedent::Is {
            variable: variable.into(),
            term: term.into(),
        }
    }

    /// Conjunction of all clauses; `None` when empty
    pub fn all<I>(clauses: I) -> Option<Self>
    where
        I: IntoIterator<Item = Antecedent>,
    {
        clauses.into_iter().reduce(|acc, c| acc & c)
    }

    /// Evaluate with `degree(variable, term)` supplying fuzzified inputs
    pub fn evaluate<F>(&self, degree: &F) -> Result<f64, FuzzyError>
    where
        F: Fn(&str, &str) -> Result<f64, FuzzyError>,
    {
        match self {
            Antecedent::Is { variable, term } => degree(variable, term),
            Antecedent::And(lhs, rhs) => Ok(lhs.evaluate(degree)?.min(rhs.evaluate(degree)?)),
            Antecedent::Or(lhs, rhs) => Ok(lhs.evaluate(degree)?.max(rhs.evaluate(degree)?)),
            Antecedent::Not(inner) => Ok(1.0 - inner.evaluate(degree)?),
        }
    }

    /// Every `(variable, term)` pair referenced
    pub fn clauses(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        self.collect_clauses(&mut out);
        out
    }

    fn collect_clauses<'a>(&'a self, out: &mut Vec<(&'a str, &'a str)>) {
        match self {
            Antecedent::Is { variable, term } => out.push((variable.as_str(), term.as_str())),
            Antecedent::And(lhs, rhs) | Antecedent::Or(lhs, rhs) => {
                lhs.collect_clauses(out);
                rhs.collect_clauses(out);
            }
            Antecedent::Not(inner) => inner.collect_clauses(out),
        }
    }
}

impl BitAnd for Antecedent {
    type Output = Antecedent;

    fn bitand(self, rhs: Self) -> Self::Output {
        Antecedent::And(Box::new(self), Box::new(rhs))
    }
}

impl BitOr for Antecedent {
    type Output = Antecedent;

    fn bitor(self, rhs: Self) -> Self::Output {
        Antecedent::Or(Box::new(self), Box::new(rhs))
    }
}

impl Not for Antecedent {
    type Output = Antecedent;

    fn not(self) -> Self::Output {
        Antecedent::Not(Box::new(self))
    }
}

/// `if antecedent then output is term`
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyRule {
    pub antecedent: Antecedent,
    /// Output term this rule activates
    pub consequent: String,
    /// Scales the firing strength, in [0, 1]
    pub weight: f64,
}

impl FuzzyRule {
    /// Create a rule with weight 1
    pub fn new(antecedent: Antecedent, consequent: impl Into<String>) -> Self {
        Self {
            antecedent,
            consequent: consequent.into(),
            weight: 1.0,
        }
    }

    /// Set rule weight
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight.clamp(0.0, 1.0);
        self
    }

    /// Firing strength for the given fuzzified inputs
    pub fn firing_strength<F>(&self, degree: &F) -> Result<f64, FuzzyError>
    where
        F: Fn(&str, &str) -> Result<f64, FuzzyError>,
    {
        Ok(self.antecedent.evaluate(degree)? * self.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degrees(variable: &str, term: &str) -> Result<f64, FuzzyError> {
        match (variable, term) {
            ("a", "low") => Ok(0.2),
            ("b", "low") => Ok(0.7),
            _ => Err(FuzzyError::UnknownVariable(variable.to_string())),
        }
    }

    #[test]
    fn test_operators() {
        let a = Antecedent::is("a", "low");
        let b = Antecedent::is("b", "low");

        assert_eq!((a.clone() & b.clone()).evaluate(&degrees).unwrap(), 0.2);
        assert_eq!((a.clone() | b.clone()).evaluate(&degrees).unwrap(), 0.7);
        assert!(((!a).evaluate(&degrees).unwrap() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_all_and_clauses() {
        let rule = Antecedent::all([Antecedent::is("a", "low"), Antecedent::is("b", "low")]).unwrap();
        assert_eq!(rule.clauses(), vec![("a", "low"), ("b", "low")]);
        assert!(Antecedent::all(Vec::new()).is_none());
    }

    #[test]
    fn test_weight_scales_strength() {
        let rule = FuzzyRule::new(Antecedent::is("b", "low"), "high").with_weight(0.5);
        assert!((rule.firing_strength(&degrees).unwrap() - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_variable_propagates() {
        let rule = FuzzyRule::new(Antecedent::is("c", "low"), "high");
        assert!(rule.firing_strength(&degrees).is_err());
    }
}
