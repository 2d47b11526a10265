//! Classification rule base
//!
//! The score is asserted as `(numero <score>)`. The category thresholds
//! overlap at 3 and 8; salience decides (Normal, then Gripe, then Resfriado)
//! and the `(not (diagnostico ?))` guard keeps a single category. Every
//! classified score gets the recommendation.

/// Relation carrying the crisp score
pub const SCORE_RELATION: &str = "numero";
/// Relation asserted by the category rules
pub const DIAGNOSIS_RELATION: &str = "diagnostico";
/// Relation asserted by the recommendation rule
pub const RECOMMENDATION_RELATION: &str = "recomendacion";

/// Recommendation attached to every diagnosis
pub const RECOMMENDATION: &str = "Consulta con un médico y descansa adecuadamente.";

/// Classification rule base
pub const RULE_BASE: &str = r#"
(defrule Normal
  (declare (salience 20))
  (numero ?num)
  (test (<= ?num 3))
  (not (diagnostico ?))
  =>
  (assert (diagnostico Normal)))

(defrule Resfriado
  (numero ?num)
  (test (<= ?num 8))
  (not (diagnostico ?))
  =>
  (assert (diagnostico Resfriado)))

(defrule Gripe
  (declare (salience 10))
  (numero ?num)
  (test (>= ?num 8))
  (not (diagnostico ?))
  =>
  (assert (diagnostico Gripe)))

(defrule Recomendaciones
  (diagnostico ?)
  =>
  (assert (recomendacion "Consulta con un médico y descansa adecuadamente.")))
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use expert_system::{parse_rules, Action, Slot, Value};

    #[test]
    fn test_rule_base_parses() {
        let rules = parse_rules(RULE_BASE).unwrap();
        let names: Vec<&str> = rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Normal", "Resfriado", "Gripe", "Recomendaciones"]);
    }

    #[test]
    fn test_recommendation_text_matches_constant() {
        let rules = parse_rules(RULE_BASE).unwrap();
        let recommend = rules.iter().find(|r| r.name == "Recomendaciones").unwrap();
        match &recommend.actions[0] {
            Action::Assert(template) => {
                assert_eq!(template.relation, RECOMMENDATION_RELATION);
                assert_eq!(template.slots, vec![Slot::Literal(Value::text(RECOMMENDATION))]);
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_rule_base_round_trips() {
        let rules = parse_rules(RULE_BASE).unwrap();
        let printed = rules
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n\n");
        assert_eq!(parse_rules(&printed).unwrap(), rules);
    }
}
