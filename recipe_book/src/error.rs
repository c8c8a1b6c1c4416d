//! Error types for the recipe book.

use thiserror::Error;

/// Failures while loading a cookbook catalogue.
#[derive(Error, Debug)]
pub enum CookbookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid cookbook TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("recipe '{0}' is listed more than once")]
    DuplicateRecipe(String),
}

/// Failures of the success estimator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    #[error("unknown evidence variable '{0}'")]
    UnknownVariable(String),

    #[error("state {state} is out of range for '{variable}' ({cardinality} states)")]
    InvalidState {
        variable: String,
        state: u8,
        cardinality: u8,
    },

    #[error("the network cannot be evaluated: {0}")]
    Degenerate(String),
}

/// Failures while reading or learning from a dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no dataset is configured")]
    NotConfigured,

    #[error("dataset is empty")]
    Empty,

    #[error("dataset is missing the '{0}' column")]
    MissingColumn(&'static str),

    #[error("line {line}: {message}")]
    BadRow { line: usize, message: String },

    #[error("estimate failed: {0}")]
    Estimate(#[from] EstimateError),

    #[error("cannot split {rows} rows into {folds} folds")]
    InvalidFolds { folds: usize, rows: usize },
}
