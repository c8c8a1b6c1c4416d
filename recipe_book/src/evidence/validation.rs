//! K-fold cross-validation of the success network.
//!
//! Rows are dealt round-robin into folds, so the split is deterministic: row
//! `i` is tested in fold `i % k`. Each fold trains a network on the other
//! rows and predicts success when P(success | time, difficulty, quality) is
//! at least one half. Success is the positive class.
//!
//! States missing from a training split need no padding: learning already
//! adds one pseudo-count per state.

use serde::Serialize;
use tracing::{debug, info};

use super::{Dataset, Evidence, Observation, SuccessNetwork, Variable};
use crate::error::DatasetError;

/// Folds used when the caller does not choose.
pub const DEFAULT_FOLDS: usize = 10;

/// Classification scores for one fold, or their mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl Metrics {
    /// Scores from a confusion count. Undefined ratios are zero.
    fn from_counts(counts: &Confusion) -> Self {
        let ratio = |num: u32, den: u32| {
            if den == 0 {
                0.0
            } else {
                f64::from(num) / f64::from(den)
            }
        };

        let accuracy = ratio(
            counts.true_positive + counts.true_negative,
            counts.true_positive + counts.true_negative + counts.false_positive + counts.false_negative,
        );
        let precision = ratio(counts.true_positive, counts.true_positive + counts.false_positive);
        let recall = ratio(counts.true_positive, counts.true_positive + counts.false_negative);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            accuracy,
            precision,
            recall,
            f1,
        }
    }

    fn mean(all: &[Metrics]) -> Self {
        let n = all.len().max(1) as f64;
        let sum = |pick: fn(&Metrics) -> f64| all.iter().map(pick).sum::<f64>() / n;
        Self {
            accuracy: sum(|m| m.accuracy),
            precision: sum(|m| m.precision),
            recall: sum(|m| m.recall),
            f1: sum(|m| m.f1),
        }
    }

    /// Population standard deviation of each score around `mean`.
    fn spread(all: &[Metrics], mean: &Metrics) -> Self {
        let n = all.len().max(1) as f64;
        let deviation = |pick: fn(&Metrics) -> f64| {
            let centre = pick(mean);
            (all.iter().map(|m| (pick(m) - centre).powi(2)).sum::<f64>() / n).sqrt()
        };
        Self {
            accuracy: deviation(|m| m.accuracy),
            precision: deviation(|m| m.precision),
            recall: deviation(|m| m.recall),
            f1: deviation(|m| m.f1),
        }
    }
}

#[derive(Debug, Default)]
struct Confusion {
    true_positive: u32,
    true_negative: u32,
    false_positive: u32,
    false_negative: u32,
}

impl Confusion {
    fn record(&mut self, predicted: bool, actual: bool) {
        match (predicted, actual) {
            (true, true) => self.true_positive += 1,
            (false, false) => self.true_negative += 1,
            (true, false) => self.false_positive += 1,
            (false, true) => self.false_negative += 1,
        }
    }
}

/// Result of a cross-validation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossValidation {
    /// Scores per fold, in fold order.
    pub folds: Vec<Metrics>,
    pub mean: Metrics,
    pub std_dev: Metrics,
}

fn full_evidence(row: &Observation) -> Evidence {
    [Variable::Time, Variable::Difficulty, Variable::IngredientQuality]
        .into_iter()
        .map(|variable| (variable.name().to_string(), row.state(variable)))
        .collect()
}

impl SuccessNetwork {
    /// Score the learned network on `dataset` with `folds`-fold cross-validation.
    ///
    /// Needs at least two folds and no more folds than rows.
    pub fn cross_validate(dataset: &Dataset, folds: usize) -> Result<CrossValidation, DatasetError> {
        let rows = dataset.observations();
        if folds < 2 || folds > rows.len() {
            return Err(DatasetError::InvalidFolds {
                folds,
                rows: rows.len(),
            });
        }
        for (i, row) in rows.iter().enumerate() {
            row.validate(i + 1)?;
        }

        let mut scores = Vec::with_capacity(folds);
        for fold in 0..folds {
            let (test, train): (Vec<_>, Vec<_>) = rows
                .iter()
                .enumerate()
                .partition(|(i, _)| i % folds == fold);
            let train = Dataset::new(train.into_iter().map(|(_, row)| *row).collect());
            let network = SuccessNetwork::learned_from(&train)?;

            let mut counts = Confusion::default();
            for (_, row) in test {
                let p = network.estimate(&full_evidence(row))?;
                counts.record(p >= 0.5, row.success == 1);
            }

            let metrics = Metrics::from_counts(&counts);
            debug!(fold = fold + 1, ?metrics, "fold scored");
            scores.push(metrics);
        }

        let mean = Metrics::mean(&scores);
        let std_dev = Metrics::spread(&scores, &mean);
        info!(
            folds,
            rows = rows.len(),
            accuracy = mean.accuracy,
            f1 = mean.f1,
            "cross-validation finished"
        );

        Ok(CrossValidation {
            folds: scores,
            mean,
            std_dev,
        })
    }
}
