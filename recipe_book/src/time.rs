//! Time budgets - how long the cook has, bucketed into categories.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Coarse category for the time the user can spend cooking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBudget {
    Short,
    Medium,
    Long,
}

impl TimeBudget {
    /// Label used in facts and messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBudget::Short => "short",
            TimeBudget::Medium => "medium",
            TimeBudget::Long => "long",
        }
    }

    /// State index of the `time` variable in the success network.
    pub fn evidence_index(&self) -> u8 {
        match self {
            TimeBudget::Short => 0,
            TimeBudget::Medium => 1,
            TimeBudget::Long => 2,
        }
    }

    /// Evidence index for a free-form label; unknown labels count as medium.
    pub fn evidence_index_of(label: &str) -> u8 {
        label
            .parse::<TimeBudget>()
            .unwrap_or(TimeBudget::Medium)
            .evidence_index()
    }
}

impl FromStr for TimeBudget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(TimeBudget::Short),
            "medium" => Ok(TimeBudget::Medium),
            "long" => Ok(TimeBudget::Long),
            other => Err(format!("unknown time budget '{}'", other)),
        }
    }
}

impl std::fmt::Display for TimeBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper bounds (inclusive, in minutes) of the short and medium categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeThresholds {
    #[serde(default = "default_short_max")]
    pub short_max_minutes: u32,
    #[serde(default = "default_medium_max")]
    pub medium_max_minutes: u32,
}

fn default_short_max() -> u32 {
    20
}

fn default_medium_max() -> u32 {
    60
}

impl Default for TimeThresholds {
    fn default() -> Self {
        Self {
            short_max_minutes: default_short_max(),
            medium_max_minutes: default_medium_max(),
        }
    }
}

impl TimeThresholds {
    /// Bucket a number of minutes into a budget.
    pub fn categorize(&self, minutes: u32) -> TimeBudget {
        match minutes {
            m if m <= self.short_max_minutes => TimeBudget::Short,
            m if m <= self.medium_max_minutes => TimeBudget::Medium,
            _ => TimeBudget::Long,
        }
    }
}
