//! Rule Environment and Agenda

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, trace, warn};

use crate::fact::{Fact, FactId};
use crate::parser::{parse_fact, parse_rules};
use crate::rule::{Action, Bindings, Bound, Condition, Rule};
use crate::EngineError;

/// Environment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum rule firings in one `run` before giving up (default: 1000)
    pub max_cycles: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { max_cycles: 1000 }
    }
}

/// Pending rule activation, as reported by [`Environment::agenda`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaEntry {
    pub rule: String,
    pub salience: i32,
    /// Facts that satisfied the rule's patterns
    pub facts: Vec<FactId>,
}

#[derive(Debug, Clone)]
struct Activation {
    rule: usize,
    bindings: Bindings,
    support: Vec<FactId>,
}

/// Working memory plus rule base.
///
/// Matching is recomputed from scratch on every cycle, which is fine for
/// rule bases of a few dozen rules and facts.
#[derive(Debug, Default)]
pub struct Environment {
    config: EngineConfig,
    rules: Vec<Rule>,
    facts: Vec<(FactId, Fact)>,
    next_id: u64,
    /// Refraction memory: (rule name, supporting facts) already fired
    fired: HashSet<(String, Vec<FactId>)>,
}

impl Environment {
    /// Create an empty environment
    pub fn new(config: EngineConfig) -> Self {
        debug!("Creating rule environment: max_cycles={}", config.max_cycles);
        Self {
            config,
            ..Default::default()
        }
    }

    /// Remove all rules and facts
    pub fn clear(&mut self) {
        self.rules.clear();
        self.reset();
    }

    /// Remove all facts, keeping the rules
    pub fn reset(&mut self) {
        self.facts.clear();
        self.fired.clear();
        self.next_id = 0;
    }

    /// Parse and add rule definitions; returns how many were added
    pub fn build(&mut self, text: &str) -> Result<usize, EngineError> {
        let rules = parse_rules(text)?;
        let count = rules.len();
        for rule in rules {
            self.add_rule(rule);
        }
        Ok(count)
    }

    /// Add a rule, replacing any rule with the same name in place
    pub fn add_rule(&mut self, rule: Rule) {
        self.fired.retain(|(name, _)| *name != rule.name);
        match self.rules.iter_mut().find(|r| r.name == rule.name) {
            Some(existing) => {
                debug!("Redefining rule {}", rule.name);
                *existing = rule;
            }
            None => {
                trace!("Defining rule {}", rule.name);
                self.rules.push(rule);
            }
        }
    }

    /// Rules in definition order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Add a fact; returns `None` if an identical fact already exists
    pub fn assert_fact(&mut self, fact: Fact) -> Option<FactId> {
        if self.facts.iter().any(|(_, f)| *f == fact) {
            trace!("Ignoring duplicate fact {}", fact);
            return None;
        }
        let id = FactId(self.next_id);
        self.next_id += 1;
        debug!("==> {} {}", id, fact);
        self.facts.push((id, fact));
        Some(id)
    }

    /// Parse and assert a fact such as `(numero 4.5)`
    pub fn assert_string(&mut self, text: &str) -> Result<Option<FactId>, EngineError> {
        Ok(self.assert_fact(parse_fact(text)?))
    }

    /// Remove a fact
    pub fn retract(&mut self, id: FactId) -> Result<Fact, EngineError> {
        let index = self
            .facts
            .iter()
            .position(|(fid, _)| *fid == id)
            .ok_or(EngineError::UnknownFact(id))?;
        let (_, fact) = self.facts.remove(index);
        debug!("<== {} {}", id, fact);
        Ok(fact)
    }

    /// Facts in assertion order
    pub fn facts(&self) -> impl Iterator<Item = (FactId, &Fact)> + '_ {
        self.facts.iter().map(|(id, fact)| (*id, fact))
    }

    /// Facts of one relation, in assertion order
    pub fn facts_of<'a>(&'a self, relation: &'a str) -> impl Iterator<Item = &'a Fact> + 'a {
        self.facts
            .iter()
            .map(|(_, fact)| fact)
            .filter(move |fact| fact.relation == relation)
    }

    /// Pending activations in firing order
    pub fn agenda(&self) -> Result<Vec<AgendaEntry>, EngineError> {
        let mut activations = self.activations()?;
        activations.sort_by(|a, b| self.compare(a, b));
        Ok(activations
            .into_iter()
            .map(|a| AgendaEntry {
                rule: self.rules[a.rule].name.clone(),
                salience: self.rules[a.rule].salience,
                facts: a.support,
            })
            .collect())
    }

    /// Fire rules until the agenda is empty or `limit` rules have fired.
    ///
    /// Returns the number of rules fired. Exceeding `max_cycles` is an error.
    pub fn run(&mut self, limit: Option<usize>) -> Result<usize, EngineError> {
        let mut fired = 0;

        while limit.map_or(true, |limit| fired < limit) {
            let Some(activation) = self.next_activation()? else {
                break;
            };
            if fired >= self.config.max_cycles {
                warn!("Rule engine stopped after {} cycles", fired);
                return Err(EngineError::CycleLimit(self.config.max_cycles));
            }
            self.fire(activation)?;
            fired += 1;
        }

        debug!("Rule engine run complete: {} rules fired, {} facts", fired, self.facts.len());
        Ok(fired)
    }

    fn next_activation(&self) -> Result<Option<Activation>, EngineError> {
        Ok(self
            .activations()?
            .into_iter()
            .min_by(|a, b| self.compare(a, b)))
    }

    /// Salience (high first), then recency of supporting facts, then rule order
    fn compare(&self, a: &Activation, b: &Activation) -> Ordering {
        let salience_a = self.rules[a.rule].salience;
        let salience_b = self.rules[b.rule].salience;

        salience_b
            .cmp(&salience_a)
            .then_with(|| recency(&b.support).cmp(&recency(&a.support)))
            .then_with(|| a.rule.cmp(&b.rule))
    }

    fn fire(&mut self, activation: Activation) -> Result<(), EngineError> {
        let rule = self.rules[activation.rule].clone();
        debug!(
            "FIRE {}: {}",
            rule.name,
            activation
                .support
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        );
        self.fired.insert((rule.name.clone(), activation.support));

        for action in &rule.actions {
            match action {
                Action::Assert(template) => {
                    let fact = template.instantiate(&rule.name, &activation.bindings)?;
                    self.assert_fact(fact);
                }
                Action::Retract(variable) => match activation.bindings.get(variable) {
                    Some(Bound::Fact(id)) => {
                        self.retract(*id)?;
                    }
                    _ => {
                        return Err(EngineError::NotAFactBinding {
                            rule: rule.name.clone(),
                            variable: variable.clone(),
                        })
                    }
                },
            }
        }
        Ok(())
    }

    fn activations(&self) -> Result<Vec<Activation>, EngineError> {
        let mut activations: Vec<Activation> = Vec::new();

        for (index, rule) in self.rules.iter().enumerate() {
            let mut matches = Vec::new();
            self.match_conditions(rule, &rule.conditions, Bindings::new(), Vec::new(), &mut matches)?;

            for (bindings, support) in matches {
                let key = (rule.name.clone(), support);
                if self.fired.contains(&key) {
                    continue;
                }
                let support = key.1;
                if activations.iter().any(|a| a.rule == index && a.support == support) {
                    continue;
                }
                activations.push(Activation {
                    rule: index,
                    bindings,
                    support,
                });
            }
        }

        Ok(activations)
    }

    fn match_conditions(
        &self,
        rule: &Rule,
        conditions: &[Condition],
        bindings: Bindings,
        support: Vec<FactId>,
        out: &mut Vec<(Bindings, Vec<FactId>)>,
    ) -> Result<(), EngineError> {
        let Some((condition, rest)) = conditions.split_first() else {
            out.push((bindings, support));
            return Ok(());
        };

        match condition {
            Condition::Match { binding, pattern } => {
                for (id, fact) in &self.facts {
                    if let Some(mut extended) = pattern.unify(fact, &bindings) {
                        if let Some(name) = binding {
                            extended.insert(name.clone(), Bound::Fact(*id));
                        }
                        let mut support = support.clone();
                        support.push(*id);
                        self.match_conditions(rule, rest, extended, support, out)?;
                    }
                }
            }
            Condition::Any(patterns) => {
                for pattern in patterns {
                    for (id, fact) in &self.facts {
                        if let Some(extended) = pattern.unify(fact, &bindings) {
                            let mut support = support.clone();
                            support.push(*id);
                            self.match_conditions(rule, rest, extended, support, out)?;
                        }
                    }
                }
            }
            Condition::Not(pattern) => {
                let blocked = self
                    .facts
                    .iter()
                    .any(|(_, fact)| pattern.unify(fact, &bindings).is_some());
                if !blocked {
                    self.match_conditions(rule, rest, bindings, support, out)?;
                }
            }
            Condition::Test(comparison) => {
                if comparison.evaluate(&rule.name, &bindings)? {
                    self.match_conditions(rule, rest, bindings, support, out)?;
                }
            }
        }

        Ok(())
    }
}

/// Supporting timetags, newest first, for lexicographic recency comparison
fn recency(support: &[FactId]) -> Vec<FactId> {
    let mut tags = support.to_vec();
    tags.sort_unstable_by(|a, b| b.cmp(a));
    tags
}
