//! Advisor configuration, read from TOML.
//!
//! ```toml
//! [time]
//! short_max_minutes = 20
//! medium_max_minutes = 60
//!
//! [engine]
//! max_firings = 256
//!
//! [estimate]
//! mode = "ask"          # ask | default | dataset
//! dataset = "data/recipes.csv"
//!
//! [cookbook]
//! path = "cookbook.toml"
//! ```

use recipe_book::TimeThresholds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::engine::EngineConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// How the success estimate is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateMode {
    /// Ask the user each consultation.
    #[default]
    Ask,
    /// Use the default network.
    Default,
    /// Refine the network from the dataset first.
    Dataset,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateConfig {
    pub mode: EstimateMode,
    pub dataset: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookbookConfig {
    /// Catalogue file; the built-in catalogue when absent.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub time: TimeThresholds,
    pub engine: EngineConfig,
    pub estimate: EstimateConfig,
    pub cookbook: CookbookConfig,
}

impl AdvisorConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        debug!(path = %path.display(), ?config, "config loaded");
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
