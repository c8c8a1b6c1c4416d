//! Conditions and the evaluator that joins them against working memory.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::working_memory::{FactId, FactStore, Field, Value};

/// Variable name -> value assignments produced by matching.
pub type Binding = BTreeMap<String, Value>;

/// A predicate over working memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// A fact with `field` set to `value`.
    FieldEquals { field: Field, value: Value },

    /// Any fact carrying `field`; its value is bound to `var` when one is named.
    Exists { field: Field, var: Option<String> },

    /// Negation as failure.
    Not(Box<Condition>),

    /// At least one branch holds.
    Or(Vec<Condition>),
}

impl Condition {
    pub fn equals(field: Field, value: impl Into<Value>) -> Self {
        Condition::FieldEquals {
            field,
            value: value.into(),
        }
    }

    /// Wildcard: matches any value and binds nothing.
    pub fn exists(field: Field) -> Self {
        Condition::Exists { field, var: None }
    }

    /// Matches any value and binds it to `var`.
    pub fn bind(field: Field, var: impl Into<String>) -> Self {
        Condition::Exists {
            field,
            var: Some(var.into()),
        }
    }

    pub fn not(condition: Condition) -> Self {
        Condition::Not(Box::new(condition))
    }

    pub fn any(branches: impl IntoIterator<Item = Condition>) -> Self {
        Condition::Or(branches.into_iter().collect())
    }
}

/// One way a conjunction of conditions is satisfied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Match {
    pub binding: Binding,

    /// Facts the positive conditions matched, in condition order.
    pub support: Vec<FactId>,
}

impl Match {
    fn supported_by(&self, id: FactId) -> Self {
        let mut next = self.clone();
        next.support.push(id);
        next
    }
}

/// Every distinct binding under which all `conditions` hold, left to right.
///
/// Each condition narrows the partial matches produced by the ones before it.
/// When several fact combinations yield the same binding, the first one found
/// (in condition order, then fact insertion order) is kept.
pub fn evaluate(conditions: &[Condition], store: &FactStore) -> Vec<Match> {
    let mut partial = vec![Match::default()];

    for condition in conditions {
        let mut extended = Vec::new();
        for candidate in &partial {
            extend(condition, candidate, store, &mut extended);
        }
        partial = extended;
        if partial.is_empty() {
            break;
        }
    }

    let mut seen = HashSet::new();
    partial.retain(|m| seen.insert(m.binding.clone()));
    partial
}

/// Push every consistent extension of `current` by `condition` onto `out`.
fn extend(condition: &Condition, current: &Match, store: &FactStore, out: &mut Vec<Match>) {
    match condition {
        Condition::FieldEquals { field, value } => {
            for (id, fact) in store.with_field(*field) {
                if fact.value() == *value {
                    out.push(current.supported_by(id));
                }
            }
        }
        Condition::Exists { field, var } => {
            for (id, fact) in store.with_field(*field) {
                let Some(name) = var else {
                    out.push(current.supported_by(id));
                    continue;
                };

                let value = fact.value();
                match current.binding.get(name) {
                    Some(bound) if *bound != value => {}
                    Some(_) => out.push(current.supported_by(id)),
                    None => {
                        let mut next = current.supported_by(id);
                        next.binding.insert(name.clone(), value);
                        out.push(next);
                    }
                }
            }
        }
        Condition::Not(inner) => {
            let mut witnesses = Vec::new();
            extend(inner, current, store, &mut witnesses);
            if witnesses.is_empty() {
                out.push(current.clone());
            }
        }
        Condition::Or(branches) => {
            for branch in branches {
                extend(branch, current, store, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::working_memory::{Fact, Stage};
    use recipe_book::TimeBudget;

    fn store_with(facts: impl IntoIterator<Item = Fact>) -> FactStore {
        let mut store = FactStore::new();
        for fact in facts {
            store.insert(fact);
        }
        store
    }

    #[test]
    fn test_conjunction_of_equalities() {
        let store = store_with([
            Fact::Stage(Stage::FindRecipe),
            Fact::ingredient("pasta"),
            Fact::ingredient("pomodoro"),
        ]);

        let conditions = vec![
            Condition::equals(Field::Stage, "find_recipe"),
            Condition::equals(Field::Ingredient, "pasta"),
            Condition::equals(Field::Ingredient, "pomodoro"),
        ];
        let matches = evaluate(&conditions, &store);

        assert_eq!(matches.len(), 1);
        assert!(matches[0].binding.is_empty());
        assert_eq!(matches[0].support.len(), 3);
    }

    #[test]
    fn test_failed_condition_kills_branch() {
        let store = store_with([Fact::ingredient("pasta")]);

        let conditions = vec![
            Condition::equals(Field::Ingredient, "pasta"),
            Condition::equals(Field::Ingredient, "uova"),
        ];
        assert!(evaluate(&conditions, &store).is_empty());
    }

    #[test]
    fn test_bind_produces_one_match_per_value() {
        let store = store_with([
            Fact::candidate("Uova Strapazzate"),
            Fact::candidate("Insalata Mista"),
        ]);

        let matches = evaluate(&[Condition::bind(Field::Candidate, "recipe")], &store);

        let names: Vec<_> = matches
            .iter()
            .map(|m| m.binding["recipe"].to_string())
            .collect();
        assert_eq!(names, vec!["Uova Strapazzate", "Insalata Mista"]);
    }

    #[test]
    fn test_wildcard_collapses_to_one_binding() {
        let store = store_with([
            Fact::candidate("Uova Strapazzate"),
            Fact::candidate("Insalata Mista"),
        ]);

        let matches = evaluate(&[Condition::exists(Field::Candidate)], &store);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_repeated_variable_joins() {
        let store = store_with([
            Fact::candidate("Frittata"),
            Fact::candidate("Caprese"),
            Fact::suggested("Caprese"),
        ]);

        let conditions = vec![
            Condition::bind(Field::Candidate, "name"),
            Condition::bind(Field::SuggestedRecipe, "name"),
        ];
        let matches = evaluate(&conditions, &store);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].binding["name"], Value::from("Caprese"));
    }

    #[test]
    fn test_negation() {
        let conditions = vec![
            Condition::equals(Field::Stage, "find_recipe"),
            Condition::not(Condition::exists(Field::Candidate)),
        ];

        let mut store = store_with([Fact::Stage(Stage::FindRecipe)]);
        assert_eq!(evaluate(&conditions, &store).len(), 1);

        store.insert(Fact::candidate("Frittata"));
        assert!(evaluate(&conditions, &store).is_empty());

        store.retract(&Fact::candidate("Frittata"));
        assert_eq!(evaluate(&conditions, &store).len(), 1);
    }

    #[test]
    fn test_negation_adds_no_support_or_variables() {
        let store = store_with([Fact::ingredient("uova")]);
        let conditions = vec![
            Condition::bind(Field::Ingredient, "what"),
            Condition::not(Condition::equals(Field::Preference, "vegano")),
        ];

        let matches = evaluate(&conditions, &store);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].binding.len(), 1);
        assert_eq!(matches[0].support.len(), 1);
    }

    #[test]
    fn test_or_unions_branches() {
        let conditions = vec![Condition::any([
            Condition::equals(Field::TimeAvailable, "medium"),
            Condition::equals(Field::TimeAvailable, "long"),
        ])];

        let long = store_with([Fact::TimeAvailable(TimeBudget::Long)]);
        assert_eq!(evaluate(&conditions, &long).len(), 1);

        let short = store_with([Fact::TimeAvailable(TimeBudget::Short)]);
        assert!(evaluate(&conditions, &short).is_empty());
    }

    #[test]
    fn test_empty_conjunction_always_holds() {
        let matches = evaluate(&[], &FactStore::new());
        assert_eq!(matches, vec![Match::default()]);
    }
}
