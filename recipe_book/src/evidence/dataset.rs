//! Observation datasets used to learn the network parameters.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::Variable;
use crate::error::DatasetError;

/// One recorded cooking attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub time: u8,
    pub difficulty: u8,
    pub ingredient_quality: u8,
    pub success: u8,
}

impl Observation {
    /// State recorded for `variable`.
    pub fn state(&self, variable: Variable) -> u8 {
        match variable {
            Variable::Time => self.time,
            Variable::Difficulty => self.difficulty,
            Variable::IngredientQuality => self.ingredient_quality,
            Variable::Success => self.success,
        }
    }

    /// Check every state against its variable's cardinality. `row` is 1-based.
    pub fn validate(&self, row: usize) -> Result<(), DatasetError> {
        for variable in Variable::ALL {
            let state = self.state(variable);
            if state >= variable.cardinality() {
                return Err(DatasetError::BadRow {
                    line: row,
                    message: format!(
                        "{} is not a valid state for '{}' (0..{})",
                        state,
                        variable,
                        variable.cardinality()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// A set of observations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    observations: Vec<Observation>,
}

impl Dataset {
    /// Build a dataset from observations.
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    /// Parse comma-separated values with a header row.
    ///
    /// Columns may appear in any order; unknown columns are ignored.
    pub fn from_csv_str(source: &str) -> Result<Self, DatasetError> {
        let mut lines = source
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

        let (_, header) = lines.next().ok_or(DatasetError::Empty)?;
        let columns: Vec<Option<Variable>> = header.split(',').map(Variable::from_name).collect();

        let position = |variable: Variable| {
            columns
                .iter()
                .position(|c| *c == Some(variable))
                .ok_or(DatasetError::MissingColumn(variable.name()))
        };
        let time = position(Variable::Time)?;
        let difficulty = position(Variable::Difficulty)?;
        let quality = position(Variable::IngredientQuality)?;
        let success = position(Variable::Success)?;

        let mut observations = Vec::new();
        for (line, row) in lines {
            let cells: Vec<&str> = row.split(',').map(str::trim).collect();
            if cells.len() != columns.len() {
                return Err(DatasetError::BadRow {
                    line,
                    message: format!("expected {} cells, found {}", columns.len(), cells.len()),
                });
            }

            let cell = |index: usize, variable: Variable| parse_state(cells[index], variable, line);
            observations.push(Observation {
                time: cell(time, Variable::Time)?,
                difficulty: cell(difficulty, Variable::Difficulty)?,
                ingredient_quality: cell(quality, Variable::IngredientQuality)?,
                success: cell(success, Variable::Success)?,
            });
        }

        if observations.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(Self { observations })
    }

    /// Read a CSV dataset from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        let dataset = Self::from_csv_str(&source)?;
        debug!(
            path = %path.as_ref().display(),
            rows = dataset.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

// Accepts "1" as well as "1.0", which spreadsheet exports tend to produce.
fn parse_state(cell: &str, variable: Variable, line: usize) -> Result<u8, DatasetError> {
    let bad = |message: String| DatasetError::BadRow { line, message };

    let value: f64 = cell
        .parse()
        .map_err(|_| bad(format!("'{}' is not a number for '{}'", cell, variable)))?;
    if value.fract() != 0.0 || value < 0.0 || value >= f64::from(variable.cardinality()) {
        return Err(bad(format!(
            "'{}' is not a valid state for '{}' (0..{})",
            cell,
            variable,
            variable.cardinality()
        )));
    }
    Ok(value as u8)
}
