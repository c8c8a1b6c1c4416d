//! Cookbook module - the recipe knowledge base.
//!
//! The cookbook consists of:
//! - **Recipes**: named dishes with ingredients, timing, and a description
//! - **Classes**: recipes sharing a class are offered as alternatives
//! - **Ingredient index**: reverse lookup used by partial matching

mod recipe;

pub use recipe::*;

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::debug;

use crate::error::CookbookError;

const BUILTIN_CATALOGUE: &str = include_str!("../../data/cookbook.toml");

#[derive(Debug, Deserialize)]
struct CatalogueFile {
    #[serde(default, rename = "recipe")]
    recipes: Vec<Recipe>,
}

/// The recipe catalogue with its lookup indices.
#[derive(Debug, Clone, Default)]
pub struct Cookbook {
    /// Recipes in catalogue order.
    recipes: Vec<Recipe>,

    /// Index: ingredient -> positions of recipes using it.
    by_ingredient: HashMap<String, Vec<usize>>,
}

impl Cookbook {
    /// Create an empty cookbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalogue shipped with the crate.
    pub fn builtin() -> Result<Self, CookbookError> {
        Self::from_toml_str(BUILTIN_CATALOGUE)
    }

    /// Parse a catalogue from TOML (`[[recipe]]` tables).
    pub fn from_toml_str(source: &str) -> Result<Self, CookbookError> {
        let file: CatalogueFile = toml::from_str(source)?;
        let mut cookbook = Self::new();
        for recipe in file.recipes {
            cookbook.add_recipe(recipe)?;
        }
        Ok(cookbook)
    }

    /// Load a catalogue file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CookbookError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        let cookbook = Self::from_toml_str(&source)?;
        debug!(
            path = %path.as_ref().display(),
            recipes = cookbook.recipe_count(),
            "cookbook loaded"
        );
        Ok(cookbook)
    }

    /// Add a recipe to the catalogue.
    pub fn add_recipe(&mut self, mut recipe: Recipe) -> Result<(), CookbookError> {
        if self.recipe(&recipe.name).is_some() {
            return Err(CookbookError::DuplicateRecipe(recipe.name));
        }

        recipe.ingredients = recipe.ingredients.iter().map(|i| normalize(i)).collect();

        let position = self.recipes.len();
        for ingredient in &recipe.ingredients {
            let positions = self.by_ingredient.entry(ingredient.clone()).or_default();
            if !positions.contains(&position) {
                positions.push(position);
            }
        }

        self.recipes.push(recipe);
        Ok(())
    }

    /// Find a recipe by name.
    pub fn recipe(&self, name: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.is_named(name))
    }

    /// Details for a recipe, including the first other recipe of its class.
    pub fn details(&self, name: &str) -> Option<RecipeDetails> {
        let recipe = self.recipe(name)?;
        let alternative = self
            .recipes
            .iter()
            .find(|other| other.class == recipe.class && !other.is_named(&recipe.name))
            .map(|other| other.name.clone());

        Some(RecipeDetails {
            estimated_minutes: recipe.prep_minutes,
            description: recipe.description.clone(),
            alternative,
        })
    }

    /// Recipes using at least one of `ingredients`, with the ingredients each one matched.
    ///
    /// Matched ingredients keep the order they were supplied in.
    pub fn partial_match(&self, ingredients: &[String]) -> BTreeMap<String, Vec<String>> {
        let mut matches: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut seen = HashSet::new();

        for ingredient in ingredients.iter().map(|i| normalize(i)) {
            if !seen.insert(ingredient.clone()) {
                continue;
            }
            let Some(positions) = self.by_ingredient.get(&ingredient) else {
                continue;
            };
            for &position in positions {
                matches
                    .entry(self.recipes[position].name.clone())
                    .or_default()
                    .push(ingredient.clone());
            }
        }

        matches
    }

    /// Get the total number of recipes.
    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }
}
