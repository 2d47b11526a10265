//! Fuzzy model for symptom scoring
//!
//! Every symptom has three terms (mild, moderate, severe) on a 0-10 scale;
//! the output has one triangular term per [`Category`]. One rule per
//! category requires every symptom to sit at the matching level.

use fuzzy_engine::{
    Antecedent, ControlSystem, FuzzyError, FuzzyRule, LinguisticVariable, MembershipFunction, Universe,
};

use crate::category::Category;
use crate::symptoms::SymptomKind;

/// Name of the output variable
pub const OUTPUT_VARIABLE: &str = "diagnostico";

/// Shared sample grid: 0, 0.5, ..., 9.5
pub fn universe() -> Result<Universe, FuzzyError> {
    Universe::new(0.0, 10.0, 0.5)
}

/// Mild, moderate and severe severity curves
fn input_levels() -> [MembershipFunction; 3] {
    [
        MembershipFunction::trapezoidal(0.0, 0.0, 1.5, 3.0),
        MembershipFunction::trapezoidal(2.5, 4.0, 7.0, 7.5),
        MembershipFunction::trapezoidal(7.0, 9.0, 10.0, 10.0),
    ]
}

fn output_curve(category: Category) -> MembershipFunction {
    match category {
        Category::Normal => MembershipFunction::triangular(0.0, 0.0, 3.0),
        Category::Resfriado => MembershipFunction::triangular(2.0, 5.0, 8.0),
        Category::Gripe => MembershipFunction::triangular(7.0, 10.0, 10.0),
    }
}

/// Input variable for one symptom
pub fn input_variable(kind: SymptomKind, universe: Universe) -> LinguisticVariable {
    kind.terms()
        .into_iter()
        .zip(input_levels())
        .fold(LinguisticVariable::new(kind.variable_name(), universe), |var, (term, mf)| {
            var.with_term(term, mf)
        })
}

/// Output variable with one term per category
pub fn output_variable(universe: Universe) -> LinguisticVariable {
    Category::ALL
        .into_iter()
        .fold(LinguisticVariable::new(OUTPUT_VARIABLE, universe), |var, category| {
            var.with_term(category.as_str(), output_curve(category))
        })
}

/// Rule for the category at `level` (0 = Normal, 1 = Resfriado, 2 = Gripe)
fn category_rule(level: usize, category: Category) -> Option<FuzzyRule> {
    let clauses = SymptomKind::ALL
        .into_iter()
        .map(|kind| Antecedent::is(kind.variable_name(), kind.terms()[level]));
    Antecedent::all(clauses).map(|antecedent| FuzzyRule::new(antecedent, category.as_str()))
}

/// Build the complete control system
pub fn control_system() -> Result<ControlSystem, FuzzyError> {
    let universe = universe()?;

    let builder = SymptomKind::ALL
        .into_iter()
        .fold(ControlSystem::builder(), |builder, kind| {
            builder.input(input_variable(kind, universe))
        })
        .output(output_variable(universe));

    let rules = Category::ALL
        .into_iter()
        .enumerate()
        .filter_map(|(level, category)| category_rule(level, category));

    builder.rules(rules).build()
}
