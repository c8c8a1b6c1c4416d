//! Rules, the rule base, and the context rule actions run in.

use tracing::debug;

use super::{Agenda, Binding, Condition, EngineError};
use crate::working_memory::{Fact, FactStore, Value};

/// Position of a rule in its rule base; doubles as declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub usize);

/// Effect run when a rule fires.
pub type Action<C> = Box<dyn Fn(&mut ActionContext<'_, C>) -> Result<(), EngineError>>;

/// A production rule: conditions, priority, and an action.
pub struct Rule<C> {
    name: String,
    conditions: Vec<Condition>,
    salience: i32,
    action: Action<C>,
}

impl<C> Rule<C> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn salience(&self) -> i32 {
        self.salience
    }

    pub(crate) fn fire(&self, ctx: &mut ActionContext<'_, C>) -> Result<(), EngineError> {
        (self.action)(ctx)
    }
}

impl<C> std::fmt::Debug for Rule<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("conditions", &self.conditions)
            .field("salience", &self.salience)
            .finish_non_exhaustive()
    }
}

/// Builds a [`Rule`] one condition at a time.
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    name: String,
    conditions: Vec<Condition>,
    salience: i32,
}

impl RuleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            conditions: Vec::new(),
            salience: 0,
        }
    }

    /// Append a condition to the conjunction.
    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn salience(mut self, salience: i32) -> Self {
        self.salience = salience;
        self
    }

    /// Attach the action and finish the rule.
    pub fn then<C, F>(self, action: F) -> Rule<C>
    where
        F: Fn(&mut ActionContext<'_, C>) -> Result<(), EngineError> + 'static,
    {
        Rule {
            name: self.name,
            conditions: self.conditions,
            salience: self.salience,
            action: Box::new(action),
        }
    }
}

/// The static table of rules, in declaration order.
pub struct RuleBase<C> {
    rules: Vec<Rule<C>>,
}

impl<C> Default for RuleBase<C> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<C> RuleBase<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, builder style.
    pub fn with_rule(mut self, rule: Rule<C>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn get(&self, id: RuleId) -> Option<&Rule<C>> {
        self.rules.get(id.0)
    }

    /// Rules with their IDs, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &Rule<C>)> {
        self.rules.iter().enumerate().map(|(i, rule)| (RuleId(i), rule))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// What a firing rule can see and do.
///
/// Bindings are read-only. Fact changes go through [`assert`](Self::assert) and
/// [`retract`](Self::retract) so the agenda can keep refraction in step.
pub struct ActionContext<'a, C> {
    rule: &'a str,
    binding: &'a Binding,
    memory: &'a mut FactStore,
    agenda: &'a mut Agenda,
    services: &'a mut C,
    halt_fact: Option<&'a Fact>,
    halted: bool,
}

impl<'a, C> ActionContext<'a, C> {
    pub(crate) fn new(
        rule: &'a str,
        binding: &'a Binding,
        memory: &'a mut FactStore,
        agenda: &'a mut Agenda,
        services: &'a mut C,
        halt_fact: Option<&'a Fact>,
    ) -> Self {
        Self {
            rule,
            binding,
            memory,
            agenda,
            services,
            halt_fact,
            halted: false,
        }
    }

    pub fn rule(&self) -> &str {
        self.rule
    }

    pub fn binding(&self) -> &Binding {
        self.binding
    }

    /// Value bound to `variable`; a missing variable is a rule-base bug.
    pub fn var(&self, variable: &str) -> Result<&Value, EngineError> {
        self.binding
            .get(variable)
            .ok_or_else(|| EngineError::UnboundVariable {
                rule: self.rule.to_string(),
                variable: variable.to_string(),
            })
    }

    /// Text bound to `variable`.
    pub fn text(&self, variable: &str) -> Result<String, EngineError> {
        Ok(self.var(variable)?.to_string())
    }

    /// Read-only view of working memory.
    pub fn facts(&self) -> &FactStore {
        &*self.memory
    }

    /// Collaborators available to actions.
    pub fn services(&mut self) -> &mut C {
        &mut *self.services
    }

    /// Assert a fact. Re-asserting an existing fact is a no-op and does not
    /// halt, even for the halt fact.
    pub fn assert(&mut self, fact: Fact) -> bool {
        let added = self.memory.insert(fact.clone());
        if added && self.halt_fact == Some(&fact) {
            self.halted = true;
        }
        debug!(rule = self.rule, %fact, added, "assert");
        added
    }

    /// Retract a fact that must be present.
    pub fn retract(&mut self, fact: &Fact) -> Result<(), EngineError> {
        let id = self
            .memory
            .remove(fact)
            .ok_or_else(|| EngineError::RetractUnknown {
                rule: self.rule.to_string(),
                fact: fact.clone(),
            })?;
        self.agenda.invalidate(id);
        debug!(rule = self.rule, %fact, "retract");
        Ok(())
    }

    /// Whether this firing asserted the halt fact.
    pub fn halted(&self) -> bool {
        self.halted
    }
}
