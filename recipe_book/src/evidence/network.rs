//! The success network and its inference.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Dataset, Evidence, Variable};
use crate::error::{DatasetError, EstimateError};

/// Discrete Bayesian network: `time`, `difficulty`, `ingredient_quality` -> `success`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessNetwork {
    time_prior: [f64; 3],
    difficulty_prior: [f64; 3],
    quality_prior: [f64; 2],

    /// P(success = 1 | time, difficulty, quality).
    success_given: [[[f64; 2]; 3]; 3],
}

impl Default for SuccessNetwork {
    fn default() -> Self {
        let mut success_given = [[[0.0; 2]; 3]; 3];
        for (time, by_difficulty) in success_given.iter_mut().enumerate() {
            for (difficulty, by_quality) in by_difficulty.iter_mut().enumerate() {
                for (quality, p) in by_quality.iter_mut().enumerate() {
                    *p = heuristic_success(time, difficulty, quality);
                }
            }
        }

        Self {
            time_prior: [0.5, 0.3, 0.2],
            difficulty_prior: [0.5, 0.4, 0.1],
            quality_prior: [0.3, 0.7],
            success_given,
        }
    }
}

/// Hand-tuned success probability used before any data is seen.
fn heuristic_success(time: usize, difficulty: usize, quality: usize) -> f64 {
    let mut risk = 0.0;

    // Little time makes any non-trivial recipe riskier
    if time == 0 && difficulty > 0 {
        risk += 0.3 * difficulty as f64;
    }
    risk += match difficulty {
        2 => 0.5,
        1 => 0.2,
        _ => 0.0,
    };
    if quality == 0 {
        risk += 0.4;
    }

    (1.0 - risk).clamp(0.1, 0.95)
}

impl SuccessNetwork {
    /// Network with the default priors and heuristic table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn every parameter from `dataset` with one pseudo-count per state.
    pub fn learned_from(dataset: &Dataset) -> Result<Self, DatasetError> {
        if dataset.is_empty() {
            return Err(DatasetError::Empty);
        }

        let mut time_counts = [0u32; 3];
        let mut difficulty_counts = [0u32; 3];
        let mut quality_counts = [0u32; 2];
        let mut trials = [[[0u32; 2]; 3]; 3];
        let mut successes = [[[0u32; 2]; 3]; 3];

        for (i, row) in dataset.observations().iter().enumerate() {
            row.validate(i + 1)?;
            let (t, d, q) = (
                row.time as usize,
                row.difficulty as usize,
                row.ingredient_quality as usize,
            );
            time_counts[t] += 1;
            difficulty_counts[d] += 1;
            quality_counts[q] += 1;
            trials[t][d][q] += 1;
            if row.success == 1 {
                successes[t][d][q] += 1;
            }
        }

        let mut success_given = [[[0.0; 2]; 3]; 3];
        for t in 0..3 {
            for d in 0..3 {
                for q in 0..2 {
                    success_given[t][d][q] =
                        (f64::from(successes[t][d][q]) + 1.0) / (f64::from(trials[t][d][q]) + 2.0);
                }
            }
        }

        debug!(rows = dataset.len(), "success network parameters learned");

        Ok(Self {
            time_prior: smoothed(time_counts),
            difficulty_prior: smoothed(difficulty_counts),
            quality_prior: smoothed(quality_counts),
            success_given,
        })
    }

    /// P(success = 1 | evidence), by enumeration over the unobserved parents.
    pub fn estimate(&self, evidence: &Evidence) -> Result<f64, EstimateError> {
        let mut observed = [None; 3];

        for (name, &state) in evidence {
            let variable = Variable::from_name(name)
                .ok_or_else(|| EstimateError::UnknownVariable(name.clone()))?;
            if state >= variable.cardinality() {
                return Err(EstimateError::InvalidState {
                    variable: variable.name().to_string(),
                    state,
                    cardinality: variable.cardinality(),
                });
            }
            match variable {
                Variable::Time => observed[0] = Some(state as usize),
                Variable::Difficulty => observed[1] = Some(state as usize),
                Variable::IngredientQuality => observed[2] = Some(state as usize),
                Variable::Success => {
                    return Err(EstimateError::Degenerate(
                        "evidence cannot fix the queried variable".to_string(),
                    ))
                }
            }
        }

        let consistent = |slot: usize, state: usize| observed[slot].map_or(true, |s| s == state);

        let mut joint_success = 0.0;
        let mut joint = 0.0;
        for t in (0..3).filter(|&t| consistent(0, t)) {
            for d in (0..3).filter(|&d| consistent(1, d)) {
                for q in (0..2).filter(|&q| consistent(2, q)) {
                    let weight = self.time_prior[t] * self.difficulty_prior[d] * self.quality_prior[q];
                    joint += weight;
                    joint_success += weight * self.success_given[t][d][q];
                }
            }
        }

        if joint <= 0.0 || !joint.is_finite() {
            return Err(EstimateError::Degenerate(
                "evidence has zero probability".to_string(),
            ));
        }
        Ok(joint_success / joint)
    }
}

fn smoothed<const N: usize>(counts: [u32; N]) -> [f64; N] {
    let total: u32 = counts.iter().sum();
    let denominator = f64::from(total) + N as f64;
    counts.map(|c| (f64::from(c) + 1.0) / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::Observation;

    fn evidence(pairs: &[(&str, u8)]) -> Evidence {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_heuristic_table() {
        assert!((heuristic_success(1, 0, 1) - 0.95).abs() < 1e-9);
        assert!((heuristic_success(1, 1, 0) - 0.4).abs() < 1e-9);
        assert!((heuristic_success(0, 2, 0) - 0.1).abs() < 1e-9);
        assert!((heuristic_success(0, 1, 1) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_with_time_evidence() {
        let network = SuccessNetwork::new();

        let medium = network.estimate(&evidence(&[("time", 1)])).unwrap();
        let short = network.estimate(&evidence(&[("time", 0)])).unwrap();

        assert!((medium - 0.7325).abs() < 1e-9, "medium = {}", medium);
        assert!((short - 0.5845).abs() < 1e-9, "short = {}", short);
        assert!(short < medium);
    }

    #[test]
    fn test_estimate_without_evidence_is_probability() {
        let p = SuccessNetwork::new().estimate(&Evidence::new()).unwrap();
        assert!(p > 0.0 && p < 1.0);
    }

    #[test]
    fn test_unknown_variable() {
        let result = SuccessNetwork::new().estimate(&evidence(&[("weather", 1)]));
        assert_eq!(result, Err(EstimateError::UnknownVariable("weather".to_string())));
    }

    #[test]
    fn test_invalid_state() {
        let result = SuccessNetwork::new().estimate(&evidence(&[("ingredient_quality", 2)]));
        assert!(matches!(result, Err(EstimateError::InvalidState { cardinality: 2, .. })));
    }

    #[test]
    fn test_learning_moves_estimate() {
        let row = Observation {
            time: 1,
            difficulty: 0,
            ingredient_quality: 1,
            success: 1,
        };
        let dataset = Dataset::new(vec![row; 10]);
        let network = SuccessNetwork::learned_from(&dataset).unwrap();

        let full = evidence(&[("time", 1), ("difficulty", 0), ("ingredient_quality", 1)]);
        let p = network.estimate(&full).unwrap();
        assert!((p - 11.0 / 12.0).abs() < 1e-9);

        // Unseen configurations fall back to an even split
        let unseen = evidence(&[("time", 0), ("difficulty", 2), ("ingredient_quality", 0)]);
        assert!((network.estimate(&unseen).unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_learning_rejects_out_of_range_state() {
        let good = Observation {
            time: 1,
            difficulty: 0,
            ingredient_quality: 1,
            success: 1,
        };
        let bad = Observation { time: 7, ..good };
        let result = SuccessNetwork::learned_from(&Dataset::new(vec![good, bad]));

        match result {
            Err(DatasetError::BadRow { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("time"), "{}", message);
            }
            other => panic!("expected a bad row, got {:?}", other),
        }
    }

    #[test]
    fn test_learning_rejects_empty_dataset() {
        let result = SuccessNetwork::learned_from(&Dataset::default());
        assert!(matches!(result, Err(DatasetError::Empty)));
    }
}
