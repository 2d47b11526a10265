//! Symptom inputs

use data_validator::{ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// One of the six scored symptoms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymptomKind {
    Onset,
    Fever,
    Aches,
    Fatigue,
    Headache,
    Congestion,
}

impl SymptomKind {
    pub const ALL: [SymptomKind; 6] = [
        SymptomKind::Onset,
        SymptomKind::Fever,
        SymptomKind::Aches,
        SymptomKind::Fatigue,
        SymptomKind::Headache,
        SymptomKind::Congestion,
    ];

    /// HTML form / JSON field name
    pub fn field_name(&self) -> &'static str {
        match self {
            SymptomKind::Onset => "comienzo",
            SymptomKind::Fever => "fiebre",
            SymptomKind::Aches => "dolores",
            SymptomKind::Fatigue => "fatiga",
            SymptomKind::Headache => "dolor_cabeza",
            SymptomKind::Congestion => "congestion",
        }
    }

    /// Fuzzy input variable name
    pub fn variable_name(&self) -> &'static str {
        match self {
            SymptomKind::Onset => "comienzo_de_sintomas",
            SymptomKind::Fever => "fiebre",
            SymptomKind::Aches => "dolores",
            SymptomKind::Fatigue => "fatiga_debilidad",
            SymptomKind::Headache => "dolor_de_cabeza",
            SymptomKind::Congestion => "congestion",
        }
    }

    /// Form label
    pub fn label(&self) -> &'static str {
        match self {
            SymptomKind::Onset => "Comienzo de síntomas",
            SymptomKind::Fever => "Fiebre",
            SymptomKind::Aches => "Dolores",
            SymptomKind::Fatigue => "Fatiga o debilidad",
            SymptomKind::Headache => "Dolor de cabeza",
            SymptomKind::Congestion => "Congestión, estornudos o dolor de garganta",
        }
    }

    /// Fuzzy term names from mildest to most severe
    pub fn terms(&self) -> [&'static str; 3] {
        match self {
            SymptomKind::Onset => ["Normal", "Gradual", "Repentino"],
            _ => ["Normal", "Aveces", "Amenudo"],
        }
    }
}

/// Unparsed form submission; every field is optional so that missing and
/// malformed values are reported by the validator rather than the extractor
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSymptoms {
    pub comienzo: Option<String>,
    pub fiebre: Option<String>,
    pub dolores: Option<String>,
    pub fatiga: Option<String>,
    pub dolor_cabeza: Option<String>,
    pub congestion: Option<String>,
}

impl RawSymptoms {
    pub fn get(&self, kind: SymptomKind) -> Option<&str> {
        let raw = match kind {
            SymptomKind::Onset => &self.comienzo,
            SymptomKind::Fever => &self.fiebre,
            SymptomKind::Aches => &self.dolores,
            SymptomKind::Fatigue => &self.fatiga,
            SymptomKind::Headache => &self.dolor_cabeza,
            SymptomKind::Congestion => &self.congestion,
        };
        raw.as_deref()
    }
}

/// Validated severities, each in [0, 10]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Symptoms {
    pub comienzo: f64,
    pub fiebre: f64,
    pub dolores: f64,
    pub fatiga: f64,
    pub dolor_cabeza: f64,
    pub congestion: f64,
}

impl Symptoms {
    /// Every symptom at the same severity
    pub fn uniform(value: f64) -> Self {
        Self {
            comienzo: value,
            fiebre: value,
            dolores: value,
            fatiga: value,
            dolor_cabeza: value,
            congestion: value,
        }
    }

    /// Parse and validate a form submission
    pub fn from_raw(raw: &RawSymptoms, validator: &Validator) -> Result<Self, ValidationError> {
        let mut symptoms = Self::default();
        for kind in SymptomKind::ALL {
            let value = validator.parse_score(kind.field_name(), raw.get(kind))?;
            symptoms.set(kind, value);
        }
        Ok(symptoms)
    }

    /// Range check already-numeric values (e.g. from JSON)
    pub fn validated(mut self, validator: &Validator) -> Result<Self, ValidationError> {
        for kind in SymptomKind::ALL {
            let value = validator.check_score(kind.field_name(), self.get(kind))?;
            self.set(kind, value);
        }
        Ok(self)
    }

    pub fn get(&self, kind: SymptomKind) -> f64 {
        match kind {
            SymptomKind::Onset => self.comienzo,
            SymptomKind::Fever => self.fiebre,
            SymptomKind::Aches => self.dolores,
            SymptomKind::Fatigue => self.fatiga,
            SymptomKind::Headache => self.dolor_cabeza,
            SymptomKind::Congestion => self.congestion,
        }
    }

    pub fn set(&mut self, kind: SymptomKind, value: f64) {
        let slot = match kind {
            SymptomKind::Onset => &mut self.comienzo,
            SymptomKind::Fever => &mut self.fiebre,
            SymptomKind::Aches => &mut self.dolores,
            SymptomKind::Fatigue => &mut self.fatiga,
            SymptomKind::Headache => &mut self.dolor_cabeza,
            SymptomKind::Congestion => &mut self.congestion,
        };
        *slot = value;
    }

    /// `(kind, severity)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (SymptomKind, f64)> + '_ {
        SymptomKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }

    pub fn values(&self) -> [f64; 6] {
        SymptomKind::ALL.map(|kind| self.get(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(values: [&str; 6]) -> RawSymptoms {
        RawSymptoms {
            comienzo: Some(values[0].to_string()),
            fiebre: Some(values[1].to_string()),
            dolores: Some(values[2].to_string()),
            fatiga: Some(values[3].to_string()),
            dolor_cabeza: Some(values[4].to_string()),
            congestion: Some(values[5].to_string()),
        }
    }

    #[test]
    fn test_from_raw() {
        let symptoms = Symptoms::from_raw(&raw(["1", "2", "3", "4", "5", "6.5"]), &Validator::default()).unwrap();
        assert_eq!(symptoms.values(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.5]);
        assert_eq!(symptoms.get(SymptomKind::Headache), 5.0);
    }

    #[test]
    fn test_from_raw_reports_first_bad_field() {
        let err = Symptoms::from_raw(&raw(["1", "2", "mucho", "4", "x", "6"]), &Validator::default()).unwrap_err();
        assert_eq!(err.field(), "dolores");
    }

    #[test]
    fn test_from_raw_missing_field() {
        let mut form = raw(["1", "2", "3", "4", "5", "6"]);
        form.congestion = None;
        let err = Symptoms::from_raw(&form, &Validator::default()).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("congestion"));
    }

    #[test]
    fn test_validated_clamps() {
        let symptoms = Symptoms {
            fiebre: 14.0,
            ..Symptoms::uniform(2.0)
        };
        let checked = symptoms.validated(&Validator::default()).unwrap();
        assert_eq!(checked.fiebre, 10.0);
        assert_eq!(checked.comienzo, 2.0);
    }

    #[test]
    fn test_names_are_distinct() {
        let fields: std::collections::HashSet<_> = SymptomKind::ALL.iter().map(|k| k.field_name()).collect();
        let variables: std::collections::HashSet<_> = SymptomKind::ALL.iter().map(|k| k.variable_name()).collect();
        assert_eq!(fields.len(), 6);
        assert_eq!(variables.len(), 6);
    }
}
