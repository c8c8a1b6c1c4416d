//! Rule Engine - forward chaining over working memory.
//!
//! Each cycle works as follows:
//! 1. **Discovery**: Evaluate every rule against the fact store
//! 2. **Refraction**: Drop activations that already fired and still hold
//! 3. **Conflict resolution**: Order by salience, recency, declaration, discovery
//! 4. **Fire**: Run the first activation's action
//! 5. **Repeat**: Until no activation remains or the halt fact is asserted

mod agenda;
mod condition;
mod error;
mod rule;

pub use agenda::*;
pub use condition::*;
pub use error::*;
pub use rule::*;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::working_memory::{Fact, FactStore};

/// Configuration for the engine loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Firings allowed in one run before the rule base is declared non-terminating.
    #[serde(default = "default_max_firings")]
    pub max_firings: usize,
}

fn default_max_firings() -> usize {
    256
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_firings: default_max_firings(),
        }
    }
}

/// Mutable state owned by the engine: working memory, agenda, and cycle counter.
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    memory: FactStore,
    agenda: Agenda,
    cycle: u64,
}

impl EngineState {
    pub fn memory(&self) -> &FactStore {
        &self.memory
    }

    pub fn agenda(&self) -> &Agenda {
        &self.agenda
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }
}

/// A single firing, as recorded in the run history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Firing {
    pub cycle: u64,
    pub rule: String,
    pub binding: Binding,
}

/// Result of one engine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// A rule fired and the agenda may have more work.
    Fired,
    /// A rule fired and asserted the halt fact.
    Halted,
    /// Nothing left to fire.
    Quiescent,
}

/// Summary of a complete run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub cycles: u64,
    pub halted: bool,
    pub fired: Vec<Firing>,
}

/// The forward-chaining engine.
pub struct Engine<C> {
    rules: RuleBase<C>,
    state: EngineState,
    config: EngineConfig,
    halt_fact: Option<Fact>,
    history: Vec<Firing>,
}

impl<C> Engine<C> {
    /// Create an engine over a fixed rule base.
    pub fn new(rules: RuleBase<C>, config: EngineConfig) -> Self {
        Self {
            rules,
            state: EngineState::default(),
            config,
            halt_fact: None,
            history: Vec::new(),
        }
    }

    /// Stop the run as soon as an action asserts `fact`.
    pub fn with_halt_fact(mut self, fact: Fact) -> Self {
        self.halt_fact = Some(fact);
        self
    }

    pub fn rules(&self) -> &RuleBase<C> {
        &self.rules
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Working memory.
    pub fn facts(&self) -> &FactStore {
        &self.state.memory
    }

    /// Seed working memory before (or between) runs.
    pub fn seed(&mut self, facts: impl IntoIterator<Item = Fact>) {
        for fact in facts {
            self.state.memory.insert(fact);
        }
    }

    /// Firings so far.
    pub fn history(&self) -> &[Firing] {
        &self.history
    }

    /// Current activations in firing order, without firing any.
    pub fn activations(&mut self) -> &[Activation] {
        self.state.agenda.refresh(&self.rules, &self.state.memory);
        self.state.agenda.pending()
    }

    /// Clear memory, agenda, and history for a fresh run.
    pub fn reset(&mut self) {
        self.state = EngineState::default();
        self.history.clear();
    }

    /// Run one cycle: discover, pick, and fire at most one activation.
    pub fn step(&mut self, services: &mut C) -> Result<Step, EngineError> {
        self.state.agenda.refresh(&self.rules, &self.state.memory);

        let Some(activation) = self.state.agenda.pop() else {
            return Ok(Step::Quiescent);
        };
        if self.history.len() >= self.config.max_firings {
            return Err(EngineError::FiringLimit {
                limit: self.config.max_firings,
            });
        }
        let Some(rule) = self.rules.get(activation.rule) else {
            return Ok(Step::Quiescent);
        };

        self.state.cycle += 1;
        self.state.memory.set_cycle(self.state.cycle);
        self.state.agenda.mark_fired(&activation);

        debug!(
            cycle = self.state.cycle,
            rule = rule.name(),
            salience = rule.salience(),
            binding = ?activation.binding,
            "firing"
        );

        let mut ctx = ActionContext::new(
            rule.name(),
            &activation.binding,
            &mut self.state.memory,
            &mut self.state.agenda,
            services,
            self.halt_fact.as_ref(),
        );
        if let Err(error) = rule.fire(&mut ctx) {
            warn!(rule = rule.name(), %error, "rule action failed; aborting run");
            return Err(error);
        }
        let halted = ctx.halted();

        self.history.push(Firing {
            cycle: self.state.cycle,
            rule: rule.name().to_string(),
            binding: activation.binding,
        });

        Ok(if halted { Step::Halted } else { Step::Fired })
    }

    /// Fire until quiescence or halt.
    pub fn run(&mut self, services: &mut C) -> Result<RunReport, EngineError> {
        let halted = loop {
            match self.step(services)? {
                Step::Fired => continue,
                Step::Halted => break true,
                Step::Quiescent => break false,
            }
        };

        debug!(cycles = self.state.cycle, halted, "run finished");
        Ok(RunReport {
            cycles: self.state.cycle,
            halted,
            fired: self.history.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::working_memory::{Field, Stage};

    /// Records which rules ran, in order.
    #[derive(Default)]
    struct Log(Vec<String>);

    fn note(ctx: &mut ActionContext<'_, Log>) {
        let rule = ctx.rule().to_string();
        ctx.services().0.push(rule);
    }

    #[test]
    fn test_salience_orders_firing() {
        for _ in 0..5 {
            let rules = RuleBase::new()
                .with_rule(
                    RuleBuilder::new("low")
                        .when(Condition::exists(Field::Ingredient))
                        .salience(1)
                        .then(|ctx: &mut ActionContext<'_, Log>| {
                            note(ctx);
                            Ok(())
                        }),
                )
                .with_rule(
                    RuleBuilder::new("high")
                        .when(Condition::exists(Field::Ingredient))
                        .salience(10)
                        .then(|ctx: &mut ActionContext<'_, Log>| {
                            note(ctx);
                            Ok(())
                        }),
                );
            let mut engine = Engine::new(rules, EngineConfig::default());
            engine.seed([Fact::ingredient("pasta")]);

            let mut log = Log::default();
            let report = engine.run(&mut log).unwrap();

            assert_eq!(log.0, vec!["high", "low"]);
            assert!(!report.halted);
            assert_eq!(report.cycles, 2);
        }
    }

    #[test]
    fn test_refraction_across_cycles() {
        // "noisy" re-asserts its own support every time; it must still fire once.
        let rules = RuleBase::new()
            .with_rule(
                RuleBuilder::new("noisy")
                    .when(Condition::bind(Field::Ingredient, "what"))
                    .salience(5)
                    .then(|ctx: &mut ActionContext<'_, Log>| {
                        note(ctx);
                        let what = ctx.text("what")?;
                        ctx.assert(Fact::ingredient(what));
                        Ok(())
                    }),
            )
            .with_rule(
                RuleBuilder::new("idle")
                    .when(Condition::exists(Field::Ingredient))
                    .then(|ctx: &mut ActionContext<'_, Log>| {
                        note(ctx);
                        Ok(())
                    }),
            );
        let mut engine = Engine::new(rules, EngineConfig::default());
        engine.seed([Fact::ingredient("pasta"), Fact::ingredient("uova")]);

        let mut log = Log::default();
        engine.run(&mut log).unwrap();

        assert_eq!(log.0, vec!["noisy", "noisy", "idle"]);
        assert!(engine.activations().is_empty());
    }

    #[test]
    fn test_recency_breaks_salience_ties() {
        let rules = RuleBase::new()
            .with_rule(
                RuleBuilder::new("on_ingredient")
                    .when(Condition::bind(Field::Ingredient, "what"))
                    .then(|ctx: &mut ActionContext<'_, Log>| {
                        let what = ctx.text("what")?;
                        ctx.services().0.push(what);
                        Ok(())
                    }),
            )
            .with_rule(
                RuleBuilder::new("add_late")
                    .when(Condition::equals(Field::Stage, "ask_time"))
                    .salience(1)
                    .then(|ctx: &mut ActionContext<'_, Log>| {
                        ctx.assert(Fact::ingredient("late"));
                        Ok(())
                    }),
            );
        let mut engine = Engine::new(rules, EngineConfig::default());
        engine.seed([
            Fact::ingredient("early"),
            Fact::ingredient("middle"),
            Fact::Stage(Stage::AskTime),
        ]);

        let mut log = Log::default();
        engine.run(&mut log).unwrap();

        // The newly asserted ingredient is acted on before older ones.
        assert_eq!(log.0, vec!["late", "early", "middle"]);
    }

    #[test]
    fn test_negation_activation_tracks_memory() {
        let rules: RuleBase<Log> = RuleBase::new().with_rule(
            RuleBuilder::new("fallback")
                .when(Condition::equals(Field::Stage, "find_recipe"))
                .when(Condition::not(Condition::exists(Field::Candidate)))
                .then(|_| Ok(())),
        );
        let mut engine = Engine::new(rules, EngineConfig::default());
        engine.seed([Fact::Stage(Stage::FindRecipe)]);
        assert_eq!(engine.activations().len(), 1);

        engine.seed([Fact::candidate("Frittata")]);
        assert!(engine.activations().is_empty());

        engine.state.memory.retract(&Fact::candidate("Frittata"));
        assert_eq!(engine.activations().len(), 1);
    }

    #[test]
    fn test_negated_rule_fires_again_after_block_lifts() {
        let rules = RuleBase::new()
            .with_rule(
                RuleBuilder::new("fallback")
                    .when(Condition::equals(Field::Stage, "find_recipe"))
                    .when(Condition::not(Condition::exists(Field::Candidate)))
                    .then(|ctx: &mut ActionContext<'_, Log>| {
                        note(ctx);
                        ctx.assert(Fact::candidate("Frittata"));
                        Ok(())
                    }),
            )
            .with_rule(
                RuleBuilder::new("drop_candidate")
                    .when(Condition::bind(Field::Candidate, "name"))
                    .when(Condition::not(Condition::exists(Field::Halt)))
                    .then(|ctx: &mut ActionContext<'_, Log>| {
                        note(ctx);
                        let name = ctx.text("name")?;
                        ctx.retract(&Fact::candidate(name))?;
                        ctx.assert(Fact::Halt);
                        Ok(())
                    }),
            );
        let mut engine = Engine::new(rules, EngineConfig::default());
        engine.seed([Fact::Stage(Stage::FindRecipe)]);

        let mut log = Log::default();
        engine.run(&mut log).unwrap();

        assert_eq!(log.0, vec!["fallback", "drop_candidate", "fallback"]);
    }

    #[test]
    fn test_or_rule_fires_once_when_earlier_branch_appears() {
        let rules = RuleBase::new()
            .with_rule(
                RuleBuilder::new("either")
                    .when(Condition::any([
                        Condition::equals(Field::Ingredient, "pasta"),
                        Condition::equals(Field::Ingredient, "riso"),
                    ]))
                    .salience(10)
                    .then(|ctx: &mut ActionContext<'_, Log>| {
                        note(ctx);
                        Ok(())
                    }),
            )
            .with_rule(
                RuleBuilder::new("add_pasta")
                    .when(Condition::equals(Field::Ingredient, "riso"))
                    .salience(1)
                    .then(|ctx: &mut ActionContext<'_, Log>| {
                        ctx.assert(Fact::ingredient("pasta"));
                        Ok(())
                    }),
            );
        let mut engine = Engine::new(rules, EngineConfig::default());
        engine.seed([Fact::ingredient("riso")]);

        let mut log = Log::default();
        let report = engine.run(&mut log).unwrap();

        assert_eq!(log.0, vec!["either"]);
        assert_eq!(report.fired.len(), 2);
    }

    #[test]
    fn test_halt_fact_stops_run() {
        let rules = RuleBase::new()
            .with_rule(
                RuleBuilder::new("stop")
                    .when(Condition::exists(Field::Ingredient))
                    .salience(10)
                    .then(|ctx: &mut ActionContext<'_, Log>| {
                        note(ctx);
                        ctx.assert(Fact::Halt);
                        Ok(())
                    }),
            )
            .with_rule(
                RuleBuilder::new("never")
                    .when(Condition::exists(Field::Ingredient))
                    .then(|ctx: &mut ActionContext<'_, Log>| {
                        note(ctx);
                        Ok(())
                    }),
            );
        let mut engine = Engine::new(rules, EngineConfig::default()).with_halt_fact(Fact::Halt);
        engine.seed([Fact::ingredient("pasta")]);

        let mut log = Log::default();
        let report = engine.run(&mut log).unwrap();

        assert!(report.halted);
        assert_eq!(log.0, vec!["stop"]);
        assert_eq!(engine.activations().len(), 1);
    }

    #[test]
    fn test_non_terminating_rule_base_is_fatal() {
        // Toggles its own support forever.
        let rules: RuleBase<()> = RuleBase::new()
            .with_rule(
                RuleBuilder::new("ping")
                    .when(Condition::equals(Field::Stage, "ask_time"))
                    .then(|ctx| {
                        ctx.retract(&Fact::Stage(Stage::AskTime))?;
                        ctx.assert(Fact::Stage(Stage::Report));
                        Ok(())
                    }),
            )
            .with_rule(
                RuleBuilder::new("pong")
                    .when(Condition::equals(Field::Stage, "report"))
                    .then(|ctx| {
                        ctx.retract(&Fact::Stage(Stage::Report))?;
                        ctx.assert(Fact::Stage(Stage::AskTime));
                        Ok(())
                    }),
            );
        let mut engine = Engine::new(rules, EngineConfig { max_firings: 10 });
        engine.seed([Fact::Stage(Stage::AskTime)]);

        let result = engine.run(&mut ());
        assert!(matches!(result, Err(EngineError::FiringLimit { limit: 10 })));
        assert_eq!(engine.history().len(), 10);
    }

    #[test]
    fn test_retracting_unknown_fact_aborts() {
        let rules: RuleBase<()> = RuleBase::new().with_rule(
            RuleBuilder::new("buggy")
                .when(Condition::exists(Field::Ingredient))
                .then(|ctx| ctx.retract(&Fact::candidate("Ghost"))),
        );
        let mut engine = Engine::new(rules, EngineConfig::default());
        engine.seed([Fact::ingredient("pasta")]);

        let result = engine.run(&mut ());
        assert!(matches!(result, Err(EngineError::RetractUnknown { .. })));
    }

    #[test]
    fn test_reset() {
        let rules: RuleBase<()> = RuleBase::new();
        let mut engine = Engine::new(rules, EngineConfig::default());
        engine.seed([Fact::ingredient("pasta")]);
        engine.reset();

        assert!(engine.facts().is_empty());
        assert_eq!(engine.state().cycle(), 0);
    }
}
