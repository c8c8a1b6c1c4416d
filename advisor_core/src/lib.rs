//! # Advisor Core
//!
//! A forward-chaining production-rule engine and the recipe consultation built
//! on it. Rules fire over a working memory of typed facts; the recipe rules
//! ask the user what they have, propose recipes, and estimate the chance of
//! cooking them successfully using the `recipe_book` crate.
//!
//! ## Core Components
//!
//! - **working_memory**: Typed facts and the fact store
//! - **engine**: Conditions, rules, the agenda, and the run loop
//! - **collaborators**: Prompting, success estimation, and recipe lookup seams
//! - **consultation**: The recipe rule table and the consultation driver
//! - **config**: TOML configuration
//!
//! ## Design Philosophy
//!
//! - **Deterministic**: The same facts and answers always fire the same rules in the same order
//! - **Single-threaded**: One activation fires at a time; collaborators block the engine
//! - **Data-driven rules**: Rules are plain records registered once in a table

pub mod collaborators;
pub mod config;
pub mod consultation;
pub mod engine;
pub mod working_memory;

pub use collaborators::*;
pub use config::*;
pub use consultation::*;
pub use engine::*;
pub use working_memory::*;
