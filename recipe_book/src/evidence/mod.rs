//! Evidence module - Bayesian estimate of how likely a recipe is to succeed.
//!
//! The network has three independent parents feeding one child:
//! - **time**: the time budget (short, medium, long)
//! - **difficulty**: how hard the recipe is (easy, medium, hard)
//! - **ingredient_quality**: poor or good
//! - **success**: failure or success, conditioned on all three

mod dataset;
mod network;
mod validation;

pub use dataset::*;
pub use network::*;
pub use validation::*;

use std::collections::BTreeMap;

/// Observed states keyed by variable name, e.g. `{"time": 1}`.
pub type Evidence = BTreeMap<String, u8>;

/// Variables of the success network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    Time,
    Difficulty,
    IngredientQuality,
    Success,
}

impl Variable {
    pub const ALL: [Variable; 4] = [
        Variable::Time,
        Variable::Difficulty,
        Variable::IngredientQuality,
        Variable::Success,
    ];

    /// Canonical name used in evidence maps.
    pub fn name(&self) -> &'static str {
        match self {
            Variable::Time => "time",
            Variable::Difficulty => "difficulty",
            Variable::IngredientQuality => "ingredient_quality",
            Variable::Success => "success",
        }
    }

    /// Number of states.
    pub fn cardinality(&self) -> u8 {
        match self {
            Variable::Time | Variable::Difficulty => 3,
            Variable::IngredientQuality | Variable::Success => 2,
        }
    }

    /// Resolve a variable from its canonical name or a dataset header alias.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "time" | "tempo" => Some(Variable::Time),
            "difficulty" | "difficolta" => Some(Variable::Difficulty),
            "ingredient_quality" | "qualitaingredienti" => Some(Variable::IngredientQuality),
            "success" | "successo" => Some(Variable::Success),
            _ => None,
        }
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
