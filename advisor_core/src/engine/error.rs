//! Error types for the rule engine.

use thiserror::Error;

use crate::collaborators::PromptError;
use crate::working_memory::Fact;

/// Fatal engine failures. Any of these aborts the current run.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("rule '{rule}' retracted a fact that was never asserted: {fact}")]
    RetractUnknown { rule: String, fact: Fact },

    #[error("rule '{rule}' read unbound variable '?{variable}'")]
    UnboundVariable { rule: String, variable: String },

    #[error("agenda still active after {limit} firings; the rule base does not terminate")]
    FiringLimit { limit: usize },

    #[error("rule '{rule}' failed: {message}")]
    Action { rule: String, message: String },

    #[error("prompt failed: {0}")]
    Prompt(#[from] PromptError),
}
