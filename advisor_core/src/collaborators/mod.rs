//! Collaborators - everything rule actions call outside working memory.
//!
//! Rule actions talk to the outside world through three seams:
//! - **Prompter**: asks the user a question and tells them things
//! - **EvidenceEvaluator**: estimates the probability that a recipe succeeds
//! - **RecipeLookup**: reads recipe details and partial matches from the cookbook
//!
//! Production code uses [`ConsolePrompter`], [`BayesianEvaluator`] and the
//! [`Cookbook`]. Tests swap in [`ScriptedPrompter`] and fixed evaluators.
//!
//! Every call blocks the engine until it returns. There is no timeout: a
//! collaborator that never answers hangs the consultation.

mod console;
mod scripted;

pub use console::*;
pub use scripted::*;

use recipe_book::{
    Cookbook, Dataset, DatasetError, EstimateError, Evidence, RecipeDetails, SuccessNetwork,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

/// Failures reading an answer from the user.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input closed")]
    Closed,

    #[error("no scripted answer left for prompt '{prompt}'")]
    Exhausted { prompt: String },
}

/// Line-oriented conversation with the user.
///
/// Implementations block until a line is available.
pub trait Prompter {
    /// Show `prompt` and read one line of input, without the trailing newline.
    fn read_line(&mut self, prompt: &str) -> Result<String, PromptError>;

    /// Show a message.
    fn tell(&mut self, message: &str);
}

/// Ask until `validate` accepts the answer.
///
/// A rejected answer is not an error: the validator's message is shown and
/// the same question is asked again.
pub fn ask<T, F>(prompter: &mut dyn Prompter, prompt: &str, validate: F) -> Result<T, PromptError>
where
    F: Fn(&str) -> Result<T, String>,
{
    loop {
        let line = prompter.read_line(prompt)?;
        match validate(line.trim()) {
            Ok(value) => return Ok(value),
            Err(message) => {
                debug!(prompt, answer = %line.trim(), "answer rejected");
                prompter.tell(&message);
            }
        }
    }
}

/// Estimates P(success) from categorical evidence.
pub trait EvidenceEvaluator {
    fn estimate(&self, evidence: &Evidence) -> Result<f64, EstimateError>;

    /// Re-learn parameters from observed data, when the evaluator has any.
    /// Later estimates use the learned parameters until [`use_default`] is called.
    ///
    /// [`use_default`]: EvidenceEvaluator::use_default
    fn refine(&mut self) -> Result<(), DatasetError> {
        Ok(())
    }

    /// Go back to the default parameters, dropping anything learned.
    fn use_default(&mut self) {}
}

/// Read access to the recipe knowledge base.
pub trait RecipeLookup {
    fn details(&self, name: &str) -> Option<RecipeDetails>;

    /// Recipe name -> the supplied ingredients it uses. No match is an empty map.
    fn partial_match(&self, ingredients: &[String]) -> BTreeMap<String, Vec<String>>;
}

impl RecipeLookup for Cookbook {
    fn details(&self, name: &str) -> Option<RecipeDetails> {
        Cookbook::details(self, name)
    }

    fn partial_match(&self, ingredients: &[String]) -> BTreeMap<String, Vec<String>> {
        Cookbook::partial_match(self, ingredients)
    }
}

/// Evaluator backed by the success network, optionally refined from a CSV dataset.
///
/// The default network is never modified. A refinement is kept beside it and
/// used only until the next [`EvidenceEvaluator::use_default`].
#[derive(Debug, Clone, Default)]
pub struct BayesianEvaluator {
    default: SuccessNetwork,
    learned: Option<SuccessNetwork>,
    dataset: Option<PathBuf>,
}

impl BayesianEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dataset used by [`EvidenceEvaluator::refine`].
    pub fn with_dataset(mut self, path: impl Into<PathBuf>) -> Self {
        self.dataset = Some(path.into());
        self
    }

    /// The network estimates are currently drawn from.
    pub fn network(&self) -> &SuccessNetwork {
        self.learned.as_ref().unwrap_or(&self.default)
    }

    pub fn is_refined(&self) -> bool {
        self.learned.is_some()
    }
}

impl EvidenceEvaluator for BayesianEvaluator {
    fn estimate(&self, evidence: &Evidence) -> Result<f64, EstimateError> {
        self.network().estimate(evidence)
    }

    fn refine(&mut self) -> Result<(), DatasetError> {
        self.learned = None;
        let path = self.dataset.as_ref().ok_or(DatasetError::NotConfigured)?;
        let dataset = Dataset::load(path)?;
        self.learned = Some(SuccessNetwork::learned_from(&dataset)?);
        info!(path = %path.display(), rows = dataset.len(), "network refined from dataset");
        Ok(())
    }

    fn use_default(&mut self) {
        if self.learned.take().is_some() {
            debug!("learned network dropped, back to the default");
        }
    }
}
