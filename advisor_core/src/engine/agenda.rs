//! The agenda: which satisfied rule fires next.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::{evaluate, Binding, RuleBase, RuleId};
use crate::working_memory::{FactId, FactStore};

/// One way a rule is currently satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activation {
    #[serde(skip)]
    pub rule: RuleId,
    pub rule_name: String,
    pub salience: i32,
    pub binding: Binding,

    /// Facts backing the binding.
    pub support: Vec<FactId>,

    /// Latest cycle in which one of the supporting facts was asserted.
    pub enabled_cycle: u64,

    /// Discovery order within a refresh; follows fact insertion order per rule.
    pub discovered: usize,
}

impl Activation {
    fn key(&self) -> (RuleId, Binding) {
        (self.rule, self.binding.clone())
    }

    /// Conflict resolution: salience, then recency, then declaration order,
    /// then discovery order. `Less` fires first.
    fn firing_order(&self, other: &Self) -> Ordering {
        other
            .salience
            .cmp(&self.salience)
            .then_with(|| other.enabled_cycle.cmp(&self.enabled_cycle))
            .then_with(|| self.rule.cmp(&other.rule))
            .then_with(|| self.discovered.cmp(&other.discovered))
    }
}

/// Pending activations plus the refraction memory of fired ones.
#[derive(Debug, Clone, Default)]
pub struct Agenda {
    /// Sorted: the next activation to fire is first.
    pending: Vec<Activation>,

    /// Fired (rule, binding) pairs and the support they fired on.
    refraction: HashMap<(RuleId, Binding), Vec<FactId>>,
}

impl Agenda {
    /// Create a new empty agenda.
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-evaluate every rule against `memory` and rebuild the pending list.
    ///
    /// A fired activation stays suppressed while its rule still holds for the
    /// same binding, whichever facts support it now. It becomes eligible again
    /// once it stops holding, or through [`Agenda::invalidate`].
    pub fn refresh<C>(&mut self, rules: &RuleBase<C>, memory: &FactStore) {
        let mut satisfied = Vec::new();

        for (id, rule) in rules.iter() {
            for found in evaluate(rule.conditions(), memory) {
                let enabled_cycle = found
                    .support
                    .iter()
                    .filter_map(|fact| memory.asserted_cycle(*fact))
                    .max()
                    .unwrap_or(0);
                let discovered = satisfied.len();

                satisfied.push(Activation {
                    rule: id,
                    rule_name: rule.name().to_string(),
                    salience: rule.salience(),
                    binding: found.binding,
                    support: found.support,
                    enabled_cycle,
                    discovered,
                });
            }
        }

        let current: HashSet<(RuleId, Binding)> =
            satisfied.iter().map(Activation::key).collect();
        self.refraction.retain(|key, _| current.contains(key));

        let mut pending: Vec<Activation> = satisfied
            .into_iter()
            .filter(|activation| !self.refraction.contains_key(&activation.key()))
            .collect();
        pending.sort_by(Activation::firing_order);

        debug!(
            pending = pending.len(),
            refracted = self.refraction.len(),
            "agenda refreshed"
        );
        self.pending = pending;
    }

    /// Take the next activation to fire.
    pub fn pop(&mut self) -> Option<Activation> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    /// Remember that `activation` fired so it is not offered again.
    pub fn mark_fired(&mut self, activation: &Activation) {
        self.refraction
            .insert(activation.key(), activation.support.clone());
    }

    /// Forget every fired activation supported by a retracted fact.
    pub fn invalidate(&mut self, retracted: FactId) {
        self.refraction
            .retain(|_, support| !support.contains(&retracted));
        self.pending
            .retain(|activation| !activation.support.contains(&retracted));
    }

    /// Check whether `rule` already fired with `binding` and is still suppressed.
    pub fn is_refracted(&self, rule: RuleId, binding: &Binding) -> bool {
        self.refraction.contains_key(&(rule, binding.clone()))
    }

    /// Pending activations, next to fire first.
    pub fn pending(&self) -> &[Activation] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop everything, including refraction memory.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.refraction.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Condition, RuleBuilder};
    use crate::working_memory::{Fact, Field};

    fn activation(salience: i32, enabled_cycle: u64, rule: usize, discovered: usize) -> Activation {
        Activation {
            rule: RuleId(rule),
            rule_name: format!("rule-{}", rule),
            salience,
            binding: Binding::new(),
            support: Vec::new(),
            enabled_cycle,
            discovered,
        }
    }

    #[test]
    fn test_firing_order_salience_first() {
        let high = activation(10, 0, 1, 1);
        let low = activation(1, 5, 0, 0);
        assert_eq!(high.firing_order(&low), Ordering::Less);
    }

    #[test]
    fn test_firing_order_recency_then_declaration() {
        let recent = activation(0, 4, 3, 3);
        let old = activation(0, 1, 0, 0);
        assert_eq!(recent.firing_order(&old), Ordering::Less);

        let declared_first = activation(0, 1, 0, 5);
        let declared_later = activation(0, 1, 2, 1);
        assert_eq!(declared_first.firing_order(&declared_later), Ordering::Less);

        let found_first = activation(0, 1, 2, 0);
        assert_eq!(found_first.firing_order(&declared_later), Ordering::Less);
    }

    #[test]
    fn test_refresh_orders_and_refracts() {
        let rules: RuleBase<()> = RuleBase::new()
            .with_rule(
                RuleBuilder::new("low")
                    .when(Condition::exists(Field::Ingredient))
                    .salience(1)
                    .then(|_| Ok(())),
            )
            .with_rule(
                RuleBuilder::new("high")
                    .when(Condition::exists(Field::Ingredient))
                    .salience(10)
                    .then(|_| Ok(())),
            );
        let mut memory = FactStore::new();
        memory.insert(Fact::ingredient("pasta"));

        let mut agenda = Agenda::new();
        agenda.refresh(&rules, &memory);
        let names: Vec<_> = agenda.pending().iter().map(|a| a.rule_name.as_str()).collect();
        assert_eq!(names, vec!["high", "low"]);

        let fired = agenda.pop().unwrap();
        agenda.mark_fired(&fired);
        agenda.refresh(&rules, &memory);
        assert_eq!(agenda.pending().len(), 1);
        assert_eq!(agenda.pending()[0].rule_name, "low");
        assert!(agenda.is_refracted(RuleId(1), &Binding::new()));
    }

    #[test]
    fn test_invalidate_releases_refraction() {
        let rules: RuleBase<()> = RuleBase::new().with_rule(
            RuleBuilder::new("only")
                .when(Condition::equals(Field::Ingredient, "uova"))
                .then(|_| Ok(())),
        );
        let mut memory = FactStore::new();
        memory.insert(Fact::ingredient("uova"));

        let mut agenda = Agenda::new();
        agenda.refresh(&rules, &memory);
        let fired = agenda.pop().unwrap();
        agenda.mark_fired(&fired);

        let id = memory.remove(&Fact::ingredient("uova")).unwrap();
        agenda.invalidate(id);
        assert!(!agenda.is_refracted(RuleId(0), &Binding::new()));

        memory.insert(Fact::ingredient("uova"));
        agenda.refresh(&rules, &memory);
        assert_eq!(agenda.pending().len(), 1);
    }

    #[test]
    fn test_refraction_holds_when_support_changes() {
        let rules: RuleBase<()> = RuleBase::new().with_rule(
            RuleBuilder::new("either")
                .when(Condition::any([
                    Condition::equals(Field::Ingredient, "pasta"),
                    Condition::equals(Field::Ingredient, "riso"),
                ]))
                .then(|_| Ok(())),
        );
        let mut memory = FactStore::new();
        memory.insert(Fact::ingredient("riso"));

        let mut agenda = Agenda::new();
        agenda.refresh(&rules, &memory);
        let fired = agenda.pop().unwrap();
        agenda.mark_fired(&fired);

        memory.insert(Fact::ingredient("pasta"));
        agenda.refresh(&rules, &memory);
        assert!(agenda.is_empty());
        assert!(agenda.is_refracted(RuleId(0), &Binding::new()));
    }
}
