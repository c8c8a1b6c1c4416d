//! Fact definitions - records in working memory.

use recipe_book::TimeBudget;
use serde::{Deserialize, Serialize};

/// Step of the consultation the engine is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    AskIngredients,
    AskTime,
    AskPreferences,
    FindRecipe,
    Evaluate,
    Report,
    Terminate,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::AskIngredients => "ask_ingredients",
            Stage::AskTime => "ask_time",
            Stage::AskPreferences => "ask_preferences",
            Stage::FindRecipe => "find_recipe",
            Stage::Evaluate => "evaluate",
            Stage::Report => "report",
            Stage::Terminate => "terminate",
        }
    }
}

/// Outcome of the success estimate, kept in basis points so facts stay hashable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Estimate {
    Available { basis_points: u16 },
    Unavailable,
}

impl Estimate {
    const UNAVAILABLE: &'static str = "unavailable";

    /// Round a probability in `[0, 1]` to basis points.
    pub fn from_probability(p: f64) -> Self {
        let basis_points = (p.clamp(0.0, 1.0) * 10_000.0).round() as u16;
        Estimate::Available { basis_points }
    }

    pub fn probability(&self) -> Option<f64> {
        match self {
            Estimate::Available { basis_points } => Some(f64::from(*basis_points) / 10_000.0),
            Estimate::Unavailable => None,
        }
    }

    /// Inverse of the value this estimate takes in a fact.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => u16::try_from(*n)
                .ok()
                .map(|basis_points| Estimate::Available { basis_points }),
            Value::Text(s) if s == Self::UNAVAILABLE => Some(Estimate::Unavailable),
            Value::Text(_) => None,
        }
    }
}

impl std::fmt::Display for Estimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Estimate::Available { basis_points } => write!(
                f,
                "Estimated probability of success: {:.2}%",
                f64::from(*basis_points) / 100.0
            ),
            Estimate::Unavailable => f.write_str("Estimate unavailable."),
        }
    }
}

/// A scalar stored in a fact field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Number(i64),
}

impl Value {
    /// The text, if this is a text value.
    pub fn into_text(self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s),
            Value::Number(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
        }
    }
}

/// The named field each kind of fact carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Stage,
    Ingredient,
    TimeAvailable,
    Preference,
    Candidate,
    SuggestedRecipe,
    Estimate,
    Halt,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Stage => "stage",
            Field::Ingredient => "ingredient",
            Field::TimeAvailable => "time_available",
            Field::Preference => "preference",
            Field::Candidate => "candidate",
            Field::SuggestedRecipe => "suggested_recipe",
            Field::Estimate => "estimate",
            Field::Halt => "halt",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A fact in working memory. Two facts with the same content are the same fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum Fact {
    Stage(Stage),
    Ingredient(String),
    TimeAvailable(TimeBudget),
    Preference(String),
    Candidate(String),
    SuggestedRecipe(String),
    Estimate(Estimate),
    /// Asserted when the consultation is over.
    Halt,
}

impl Fact {
    /// Ingredient names are trimmed and lowercased.
    pub fn ingredient(name: impl AsRef<str>) -> Self {
        Fact::Ingredient(name.as_ref().trim().to_lowercase())
    }

    /// Preferences are trimmed and lowercased.
    pub fn preference(name: impl AsRef<str>) -> Self {
        Fact::Preference(name.as_ref().trim().to_lowercase())
    }

    pub fn candidate(name: impl Into<String>) -> Self {
        Fact::Candidate(name.into())
    }

    pub fn suggested(name: impl Into<String>) -> Self {
        Fact::SuggestedRecipe(name.into())
    }

    pub fn field(&self) -> Field {
        match self {
            Fact::Stage(_) => Field::Stage,
            Fact::Ingredient(_) => Field::Ingredient,
            Fact::TimeAvailable(_) => Field::TimeAvailable,
            Fact::Preference(_) => Field::Preference,
            Fact::Candidate(_) => Field::Candidate,
            Fact::SuggestedRecipe(_) => Field::SuggestedRecipe,
            Fact::Estimate(_) => Field::Estimate,
            Fact::Halt => Field::Halt,
        }
    }

    /// The value conditions see for this fact's field.
    pub fn value(&self) -> Value {
        match self {
            Fact::Stage(stage) => Value::from(stage.as_str()),
            Fact::Ingredient(s)
            | Fact::Preference(s)
            | Fact::Candidate(s)
            | Fact::SuggestedRecipe(s) => Value::Text(s.clone()),
            Fact::TimeAvailable(budget) => Value::from(budget.as_str()),
            Fact::Estimate(Estimate::Available { basis_points }) => {
                Value::Number(i64::from(*basis_points))
            }
            Fact::Estimate(Estimate::Unavailable) => Value::from(Estimate::UNAVAILABLE),
            Fact::Halt => Value::from("halt"),
        }
    }
}

impl std::fmt::Display for Fact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.field(), self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_normalization() {
        assert_eq!(Fact::ingredient("  Pasta "), Fact::Ingredient("pasta".to_string()));
        assert_eq!(Fact::preference("Vegano"), Fact::Preference("vegano".to_string()));
    }

    #[test]
    fn test_fact_field_and_value() {
        let fact = Fact::TimeAvailable(TimeBudget::Medium);
        assert_eq!(fact.field(), Field::TimeAvailable);
        assert_eq!(fact.value(), Value::from("medium"));

        let stage = Fact::Stage(Stage::FindRecipe);
        assert_eq!(stage.to_string(), "stage=find_recipe");
    }

    #[test]
    fn test_estimate_round_trip_through_value() {
        let estimate = Estimate::from_probability(0.7325);
        assert_eq!(estimate, Estimate::Available { basis_points: 7325 });

        let value = Fact::Estimate(estimate).value();
        assert_eq!(Estimate::from_value(&value), Some(estimate));

        let value = Fact::Estimate(Estimate::Unavailable).value();
        assert_eq!(Estimate::from_value(&value), Some(Estimate::Unavailable));
    }

    #[test]
    fn test_estimate_display() {
        let estimate = Estimate::from_probability(0.7325);
        assert_eq!(estimate.to_string(), "Estimated probability of success: 73.25%");
        assert_eq!(Estimate::Unavailable.to_string(), "Estimate unavailable.");
        assert!((estimate.probability().unwrap() - 0.7325).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_clamps() {
        assert_eq!(
            Estimate::from_probability(1.5),
            Estimate::Available { basis_points: 10_000 }
        );
    }
}
