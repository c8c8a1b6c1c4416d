//! Fact Store - the set of asserted facts.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{Fact, Field};

/// Identifier handed out on every successful insertion.
///
/// Ids grow monotonically, so a fact retracted and asserted again gets a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactId(pub u64);

impl std::fmt::Display for FactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "f-{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct StoredFact {
    fact: Fact,
    /// Engine cycle during which the fact was asserted.
    asserted_cycle: u64,
}

/// Working memory: a duplicate-free set of facts.
///
/// Iteration follows insertion order. Queries borrow the store, so they always
/// observe the state as of the call.
#[derive(Debug, Clone, Default)]
pub struct FactStore {
    /// All facts stored by ID.
    facts: BTreeMap<FactId, StoredFact>,

    /// Index: content -> ID.
    ids: HashMap<Fact, FactId>,

    /// Index: field -> facts carrying it.
    by_field: HashMap<Field, BTreeSet<FactId>>,

    next_id: u64,

    /// Cycle stamped on newly inserted facts.
    cycle: u64,
}

impl FactStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fact. Returns `false` if an identical fact is already present.
    pub fn insert(&mut self, fact: Fact) -> bool {
        self.assert_fact(fact).is_some()
    }

    /// Insert a fact, returning its new ID, or `None` for a duplicate.
    pub fn assert_fact(&mut self, fact: Fact) -> Option<FactId> {
        if self.ids.contains_key(&fact) {
            return None;
        }

        let id = FactId(self.next_id);
        self.next_id += 1;

        self.by_field.entry(fact.field()).or_default().insert(id);
        self.ids.insert(fact.clone(), id);
        self.facts.insert(
            id,
            StoredFact {
                fact,
                asserted_cycle: self.cycle,
            },
        );
        Some(id)
    }

    /// Retract a fact. Returns `false` if it was not present.
    pub fn retract(&mut self, fact: &Fact) -> bool {
        self.remove(fact).is_some()
    }

    /// Retract a fact, returning the ID it was stored under.
    pub fn remove(&mut self, fact: &Fact) -> Option<FactId> {
        let id = self.ids.remove(fact)?;
        self.facts.remove(&id);
        if let Some(ids) = self.by_field.get_mut(&fact.field()) {
            ids.remove(&id);
        }
        Some(id)
    }

    /// Facts matching a predicate, in insertion order.
    pub fn query<'a, F>(&'a self, predicate: F) -> impl Iterator<Item = &'a Fact> + 'a
    where
        F: Fn(&Fact) -> bool + 'a,
    {
        self.facts
            .values()
            .map(|stored| &stored.fact)
            .filter(move |fact| predicate(fact))
    }

    /// Facts carrying `field`, with their IDs, in insertion order.
    pub fn with_field(&self, field: Field) -> impl Iterator<Item = (FactId, &Fact)> {
        self.by_field
            .get(&field)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(move |id| self.facts.get(id).map(|stored| (*id, &stored.fact)))
    }

    /// Text values of every fact carrying `field`, in insertion order.
    pub fn texts(&self, field: Field) -> Vec<String> {
        self.with_field(field)
            .filter_map(|(_, fact)| fact.value().into_text())
            .collect()
    }

    /// Check whether an identical fact is present.
    pub fn contains(&self, fact: &Fact) -> bool {
        self.ids.contains_key(fact)
    }

    /// ID of a present fact.
    pub fn id_of(&self, fact: &Fact) -> Option<FactId> {
        self.ids.get(fact).copied()
    }

    /// Get fact by ID.
    pub fn get(&self, id: FactId) -> Option<&Fact> {
        self.facts.get(&id).map(|stored| &stored.fact)
    }

    /// Cycle during which a present fact was asserted.
    pub fn asserted_cycle(&self, id: FactId) -> Option<u64> {
        self.facts.get(&id).map(|stored| stored.asserted_cycle)
    }

    /// Set the cycle stamped on facts inserted from now on.
    pub fn set_cycle(&mut self, cycle: u64) {
        self.cycle = cycle;
    }

    /// All facts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.facts.values().map(|stored| &stored.fact)
    }

    /// Get the total number of facts.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Remove every fact. IDs keep growing across clears.
    pub fn clear(&mut self) {
        self.facts.clear();
        self.ids.clear();
        self.by_field.clear();
        self.cycle = 0;
    }
}
