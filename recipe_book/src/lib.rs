//! # Recipe Book
//!
//! The "Cookbook" crate - the vocabulary and reference knowledge the advisor reasons over.
//! This crate holds recipes, time budgets, and the success estimator, and does not contain
//! any rule-engine logic.

pub mod cookbook;
pub mod error;
pub mod evidence;
pub mod time;

pub use cookbook::*;
pub use error::*;
pub use evidence::*;
pub use time::*;
