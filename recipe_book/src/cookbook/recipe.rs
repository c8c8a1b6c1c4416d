//! Recipe definitions - entries in the cookbook.

use serde::{Deserialize, Serialize};

/// A recipe as stored in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Display name, e.g. "Pasta al Pomodoro".
    pub name: String,

    /// Class of dish; recipes sharing a class are alternatives to each other.
    pub class: String,

    /// Ingredients, lowercase.
    #[serde(default)]
    pub ingredients: Vec<String>,

    /// Estimated preparation time in minutes.
    #[serde(default)]
    pub prep_minutes: Option<u32>,

    /// Short description of the steps.
    #[serde(default)]
    pub description: Option<String>,
}

impl Recipe {
    /// Create a new recipe with the given name and class.
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            ingredients: Vec::new(),
            prep_minutes: None,
            description: None,
        }
    }

    /// Add an ingredient.
    pub fn with_ingredient(mut self, ingredient: impl Into<String>) -> Self {
        self.ingredients.push(normalize(&ingredient.into()));
        self
    }

    /// Add multiple ingredients.
    pub fn with_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients
            .extend(ingredients.into_iter().map(|i| normalize(&i.into())));
        self
    }

    /// Set the preparation time.
    pub fn with_prep_minutes(mut self, minutes: u32) -> Self {
        self.prep_minutes = Some(minutes);
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check if this recipe answers to `name` (case-insensitive, `_` read as a space).
    pub fn is_named(&self, name: &str) -> bool {
        normalize_name(&self.name) == normalize_name(name)
    }
}

/// What the knowledge base knows about a recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDetails {
    pub estimated_minutes: Option<u32>,
    pub description: Option<String>,
    /// Another recipe of the same class.
    pub alternative: Option<String>,
}

pub(crate) fn normalize(ingredient: &str) -> String {
    ingredient.trim().to_lowercase()
}

pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().replace('_', " ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_builder() {
        let recipe = Recipe::new("Caprese", "salad")
            .with_ingredients(["Pomodoro", " mozzarella "])
            .with_ingredient("basilico")
            .with_prep_minutes(10)
            .with_description("Slice and serve");

        assert_eq!(recipe.ingredients, vec!["pomodoro", "mozzarella", "basilico"]);
        assert_eq!(recipe.prep_minutes, Some(10));
        assert_eq!(recipe.description.as_deref(), Some("Slice and serve"));
    }

    #[test]
    fn test_is_named() {
        let recipe = Recipe::new("Pasta al Pomodoro", "first_course");

        assert!(recipe.is_named("pasta al pomodoro"));
        assert!(recipe.is_named("Pasta_al_Pomodoro"));
        assert!(!recipe.is_named("Pasta"));
    }
}
