use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::error::{LearnerError, Result};

/// Confusion matrix keyed by actual category, then predicted category.
pub type ConfusionMatrix = BTreeMap<String, BTreeMap<String, usize>>;

/// True/false positive/negative tallies for one scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub tp: usize,
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
}

impl ConfusionCounts {
    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    /// Increment exactly one of the four counters.
    pub fn record(&mut self, predicted_positive: bool, actual_positive: bool) {
        match (predicted_positive, actual_positive) {
            (true, true) => self.tp += 1,
            (true, false) => self.fp += 1,
            (false, true) => self.fn_ += 1,
            (false, false) => self.tn += 1,
        }
    }

    pub fn report(&self) -> StatsReport {
        StatsReport::from_counts(self)
    }
}

/// Ratio with the zero-denominator policy used throughout the crate: 0.0.
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Derived ratios over a set of confusion counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub precision: f64,
    pub recall: f64,
    pub accuracy: f64,
    pub specificity: f64,
    pub f1: f64,
}

impl StatsReport {
    /// Compute all ratios from counts. Any ratio whose denominator is zero is
    /// reported as 0.0, and F1 is 0.0 when precision + recall is 0.
    pub fn from_counts(counts: &ConfusionCounts) -> Self {
        let precision = ratio(counts.tp, counts.tp + counts.fp);
        let recall = ratio(counts.tp, counts.tp + counts.fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        StatsReport {
            precision,
            recall,
            accuracy: ratio(counts.tp + counts.tn, counts.total()),
            specificity: ratio(counts.tn, counts.fp + counts.tn),
            f1,
        }
    }

    /// Arithmetic mean of each ratio over `reports`.
    ///
    /// Callers must pass at least one report.
    fn mean(reports: &[StatsReport]) -> Self {
        let mean_of = |metric: fn(&StatsReport) -> f64| -> f64 {
            reports.iter().map(metric).collect::<Vec<f64>>().iter().mean()
        };
        StatsReport {
            precision: mean_of(|r| r.precision),
            recall: mean_of(|r| r.recall),
            accuracy: mean_of(|r| r.accuracy),
            specificity: mean_of(|r| r.specificity),
            f1: mean_of(|r| r.f1),
        }
    }
}

/// One-vs-rest counts for a single category. True negatives are derived
/// from the number of observations so late-seen categories stay consistent.
#[derive(Debug, Clone, Copy, Default)]
struct ClassCounts {
    tp: usize,
    fp: usize,
    fn_: usize,
}

impl ClassCounts {
    fn with_observations(&self, observations: usize) -> ConfusionCounts {
        ConfusionCounts {
            tp: self.tp,
            tn: observations - self.tp - self.fp - self.fn_,
            fp: self.fp,
            fn_: self.fn_,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassStats {
    pub counts: ConfusionCounts,
    pub stats: StatsReport,
}

/// Read-only snapshot of an accumulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullStats {
    pub positive_category: String,
    /// Pooled counts against `positive_category`.
    pub counts: ConfusionCounts,
    /// Micro stats, or the macro average when that was calculated last.
    pub stats: StatsReport,
    pub per_class: BTreeMap<String, ClassStats>,
    pub confusion_matrix: ConfusionMatrix,
    pub num_folds: usize,
}

impl FullStats {
    pub fn total_count(&self) -> usize {
        self.counts.total()
    }

    /// Fraction of observations whose predicted category equals the actual
    /// one, over all categories.
    pub fn exact_match_accuracy(&self) -> f64 {
        let correct: usize = self
            .confusion_matrix
            .iter()
            .filter_map(|(actual, row)| row.get(actual))
            .sum();
        ratio(correct, self.total_count())
    }

    /// Mean of the per-category F1 scores.
    pub fn class_macro_f1(&self) -> f64 {
        if self.per_class.is_empty() {
            return 0.0;
        }
        self.per_class
            .values()
            .map(|c| c.stats.f1)
            .collect::<Vec<f64>>()
            .iter()
            .mean()
    }
}

/// Accumulates confusion counts from (predicted, actual) label pairs.
///
/// Pooled counts are binary against the positive category, so every
/// observation increments exactly one of TP/TN/FP/FN. Each category seen is
/// also scored one-vs-rest, and when a fold is open the observation is added
/// to that fold's bucket as well.
#[derive(Debug, Clone)]
pub struct StatsAccumulator {
    positive: String,
    pooled: ConfusionCounts,
    per_class: BTreeMap<String, ClassCounts>,
    confusion_matrix: ConfusionMatrix,
    folds: Vec<ConfusionCounts>,
    stats: Option<StatsReport>,
}

impl StatsAccumulator {
    pub fn new(positive: impl Into<String>) -> Self {
        StatsAccumulator {
            positive: positive.into(),
            pooled: ConfusionCounts::default(),
            per_class: BTreeMap::new(),
            confusion_matrix: BTreeMap::new(),
            folds: Vec::new(),
            stats: None,
        }
    }

    pub fn positive_category(&self) -> &str {
        &self.positive
    }

    pub fn counts(&self) -> ConfusionCounts {
        self.pooled
    }

    /// Open a new fold bucket. Later updates are added to it until the next
    /// call.
    pub fn begin_fold(&mut self) {
        self.folds.push(ConfusionCounts::default());
    }

    pub fn update(&mut self, predicted: &str, actual: &str) {
        let predicted_positive = predicted == self.positive;
        let actual_positive = actual == self.positive;

        self.pooled.record(predicted_positive, actual_positive);
        if let Some(fold) = self.folds.last_mut() {
            fold.record(predicted_positive, actual_positive);
        }

        if predicted == actual {
            self.per_class.entry(actual.to_string()).or_default().tp += 1;
        } else {
            self.per_class.entry(predicted.to_string()).or_default().fp += 1;
            self.per_class.entry(actual.to_string()).or_default().fn_ += 1;
        }

        *self
            .confusion_matrix
            .entry(actual.to_string())
            .or_default()
            .entry(predicted.to_string())
            .or_insert(0) += 1;
    }

    /// Micro-averaged statistics from the pooled counts.
    pub fn calculate_stats(&mut self) -> StatsReport {
        let stats = self.pooled.report();
        self.stats = Some(stats);
        stats
    }

    /// Mean of each fold's own statistics.
    ///
    /// Ratios are computed per fold first and then averaged, so folds weigh
    /// equally regardless of their size or class balance.
    pub fn calculate_macro_average_stats(&mut self, num_folds: usize) -> Result<StatsReport> {
        if num_folds == 0 || num_folds != self.folds.len() {
            return Err(LearnerError::FoldMismatch {
                expected: num_folds,
                recorded: self.folds.len(),
            });
        }
        let reports: Vec<StatsReport> = self.folds.iter().map(|f| f.report()).collect();
        let stats = StatsReport::mean(&reports);
        self.stats = Some(stats);
        Ok(stats)
    }

    pub fn full_stats(&self) -> FullStats {
        let observations = self.pooled.total();
        let per_class = self
            .per_class
            .iter()
            .map(|(category, counts)| {
                let counts = counts.with_observations(observations);
                (
                    category.clone(),
                    ClassStats {
                        counts,
                        stats: counts.report(),
                    },
                )
            })
            .collect();

        FullStats {
            positive_category: self.positive.clone(),
            counts: self.pooled,
            stats: self.stats.unwrap_or_else(|| self.pooled.report()),
            per_class,
            confusion_matrix: self.confusion_matrix.clone(),
            num_folds: self.folds.len(),
        }
    }
}
