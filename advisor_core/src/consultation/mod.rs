//! Consultation - one run of the recipe rule base against a user.
//!
//! A consultation consists of:
//! - **Rules**: the recipe rule table
//! - **Services**: the collaborators rule actions call
//! - **Outcome**: what was proposed, chosen, and estimated

mod input;
mod rules;

pub use input::*;
pub use rules::*;

use recipe_book::TimeThresholds;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, info_span, warn};
use uuid::Uuid;

use crate::collaborators::{EvidenceEvaluator, Prompter, RecipeLookup};
use crate::config::{AdvisorConfig, EstimateMode};
use crate::engine::{Engine, EngineConfig, EngineError, Firing, RunReport};
use crate::working_memory::{Estimate, Fact, FactStore, Field, Stage};

/// Knobs rule actions read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsultationSettings {
    pub time: TimeThresholds,
    pub estimate: EstimateMode,
}

impl From<&AdvisorConfig> for ConsultationSettings {
    fn from(config: &AdvisorConfig) -> Self {
        Self {
            time: config.time,
            estimate: config.estimate.mode,
        }
    }
}

/// Collaborators and settings handed to every rule action.
pub struct Services {
    pub prompter: Box<dyn Prompter>,
    pub evaluator: Box<dyn EvidenceEvaluator>,
    pub lookup: Box<dyn RecipeLookup>,
    pub settings: ConsultationSettings,

    /// Filled in when no recipe fits.
    pub partial_matches: BTreeMap<String, Vec<String>>,
}

impl Services {
    pub fn new(
        prompter: impl Prompter + 'static,
        evaluator: impl EvidenceEvaluator + 'static,
        lookup: impl RecipeLookup + 'static,
    ) -> Self {
        Self {
            prompter: Box::new(prompter),
            evaluator: Box::new(evaluator),
            lookup: Box::new(lookup),
            settings: ConsultationSettings::default(),
            partial_matches: BTreeMap::new(),
        }
    }

    pub fn with_settings(mut self, settings: ConsultationSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// What a consultation produced.
#[derive(Debug, Clone, Serialize)]
pub struct ConsultationOutcome {
    pub id: Uuid,
    pub candidates: Vec<String>,
    pub suggested: Option<String>,
    pub estimate: Option<Estimate>,
    pub partial_matches: BTreeMap<String, Vec<String>>,
    pub halted: bool,
    pub cycles: u64,
    pub fired: Vec<Firing>,
}

impl ConsultationOutcome {
    fn collect(id: Uuid, facts: &FactStore, services: &Services, report: RunReport) -> Self {
        let estimate = facts
            .with_field(Field::Estimate)
            .find_map(|(_, fact)| match fact {
                Fact::Estimate(estimate) => Some(*estimate),
                _ => None,
            });

        Self {
            id,
            candidates: facts.texts(Field::Candidate),
            suggested: facts.texts(Field::SuggestedRecipe).into_iter().next(),
            estimate,
            partial_matches: services.partial_matches.clone(),
            halted: report.halted,
            cycles: report.cycles,
            fired: report.fired,
        }
    }
}

/// The engine loaded with the recipe rules, plus its services.
pub struct Consultation {
    id: Uuid,
    engine: Engine<Services>,
    services: Services,
}

impl Consultation {
    pub fn new(services: Services, config: EngineConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            engine: Engine::new(recipe_rules(), config).with_halt_fact(Fact::Halt),
            services,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Working memory as the last run left it.
    pub fn facts(&self) -> &FactStore {
        self.engine.facts()
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Give the services back, e.g. to reuse the prompter.
    pub fn into_services(self) -> Services {
        self.services
    }

    /// Run a full consultation, starting by asking for ingredients.
    pub fn run(&mut self) -> Result<ConsultationOutcome, EngineError> {
        self.run_from([Fact::Stage(Stage::AskIngredients)])
    }

    /// Run from an arbitrary seed. Working memory is cleared first.
    pub fn run_from(
        &mut self,
        seed: impl IntoIterator<Item = Fact>,
    ) -> Result<ConsultationOutcome, EngineError> {
        let span = info_span!("consultation", id = %self.id);
        let _guard = span.enter();

        self.engine.reset();
        self.services.partial_matches.clear();
        self.engine.seed(seed);
        info!(facts = self.engine.facts().len(), "consultation started");

        let report = match self.engine.run(&mut self.services) {
            Ok(report) => report,
            Err(error) => {
                warn!(%error, "consultation aborted");
                return Err(error);
            }
        };

        let outcome = ConsultationOutcome::collect(self.id, self.engine.facts(), &self.services, report);
        info!(
            suggested = ?outcome.suggested,
            halted = outcome.halted,
            cycles = outcome.cycles,
            "consultation finished"
        );
        Ok(outcome)
    }
}
