//! Train/test evaluation and k-fold cross-validation.
//!
//! `Evaluator` runs one train-then-classify pass over a split.
//! `CrossValidator` repeats this over the K folds of a dataset, training a
//! fresh classifier per fold, and aggregates both micro-averaged (pooled
//! counts) and macro-averaged (mean of per-fold ratios) statistics.
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::data_handling::{Dataset, Sample};
use crate::error::{LearnerError, Result};
use crate::models::Classifier;
use crate::partition::{k_fold, Split};
use crate::stats::{FullStats, StatsAccumulator, StatsReport};

/// (predicted, actual) pairs for the test side of one split.
type Predictions = Vec<(String, String)>;

fn classify_all(
    classifier: &dyn Classifier,
    test: &[Sample],
    log_errors: bool,
) -> Result<Predictions> {
    test.iter()
        .map(|sample| {
            let predicted = classifier.classify(&sample.input)?;
            if log_errors && predicted != sample.output {
                log::info!(
                    "Misclassified: expected '{}', got '{}' for input {:?}",
                    sample.output,
                    predicted,
                    sample.input
                );
            }
            Ok((predicted, sample.output.clone()))
        })
        .collect()
}

/// Single train + test pass.
#[derive(Debug, Clone)]
pub struct Evaluator {
    positive: String,
    log_errors: bool,
}

impl Evaluator {
    pub fn new(positive: impl Into<String>) -> Self {
        Evaluator {
            positive: positive.into(),
            log_errors: false,
        }
    }

    /// Log every misclassified test sample at info level.
    pub fn with_error_logging(mut self, log_errors: bool) -> Self {
        self.log_errors = log_errors;
        self
    }

    /// Train `classifier` on `train`, classify every sample of `test` and
    /// report the pooled statistics.
    ///
    /// The classifier is trained in place; pass a fresh instance unless
    /// reusing its state is intended.
    pub fn run(
        &self,
        classifier: &mut dyn Classifier,
        train: &[Sample],
        test: &[Sample],
    ) -> Result<FullStats> {
        log::debug!(
            "Evaluating {} on {} training and {} testing samples",
            classifier.name(),
            train.len(),
            test.len()
        );
        classifier.train_batch(train);

        let mut accumulator = StatsAccumulator::new(self.positive.clone());
        for (predicted, actual) in classify_all(classifier, test, self.log_errors)? {
            accumulator.update(&predicted, &actual);
        }
        accumulator.calculate_stats();
        Ok(accumulator.full_stats())
    }
}

/// Outcome of one fold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldSummary {
    pub fold: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub stats: StatsReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationResult {
    pub micro_avg: FullStats,
    pub macro_avg: FullStats,
    pub folds: Vec<FoldSummary>,
}

impl CrossValidationResult {
    /// Sample standard deviation of the per-fold F1 scores.
    pub fn f1_std_dev(&self) -> f64 {
        self.folds
            .iter()
            .map(|f| f.stats.f1)
            .collect::<Vec<f64>>()
            .iter()
            .std_dev()
    }
}

/// K-fold cross-validation driver.
#[derive(Debug, Clone)]
pub struct CrossValidator {
    num_folds: usize,
    positive: String,
    verbose_level: u8,
    log_errors: bool,
    shuffle_seed: Option<u64>,
}

impl CrossValidator {
    pub fn new(num_folds: usize, positive: impl Into<String>) -> Self {
        CrossValidator {
            num_folds,
            positive: positive.into(),
            verbose_level: 0,
            log_errors: false,
            shuffle_seed: None,
        }
    }

    /// 0 is silent, 1 logs a line per fold, 2 adds per-fold counts.
    pub fn verbose_level(mut self, level: u8) -> Self {
        self.verbose_level = level;
        self
    }

    pub fn with_error_logging(mut self, log_errors: bool) -> Self {
        self.log_errors = log_errors;
        self
    }

    /// Assign samples to folds from a seeded permutation.
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    fn folds(&self, dataset: &Dataset) -> Result<Vec<Split>> {
        let folds = k_fold(dataset.len(), self.num_folds)?;
        let folds = match self.shuffle_seed {
            Some(seed) => folds.with_shuffle(seed),
            None => folds,
        };
        let splits: Vec<Split> = folds.collect();
        if let Some((fold, split)) = splits.iter().enumerate().find(|(_, s)| s.is_degenerate()) {
            return Err(LearnerError::DegenerateFold {
                fold,
                train: split.train.len(),
                test: split.test.len(),
            });
        }
        Ok(splits)
    }

    fn run_fold<F>(&self, dataset: &Dataset, split: &Split, factory: &F) -> Result<Predictions>
    where
        F: Fn() -> Box<dyn Classifier>,
    {
        let mut classifier = factory();
        classifier.train_batch(&dataset.select(&split.train));
        classify_all(classifier.as_ref(), &dataset.select(&split.test), self.log_errors)
    }

    /// Run all folds sequentially, building a fresh classifier per fold.
    pub fn run<F>(&self, dataset: &Dataset, factory: F) -> Result<CrossValidationResult>
    where
        F: Fn() -> Box<dyn Classifier>,
    {
        let splits = self.folds(dataset)?;
        let mut predictions = Vec::with_capacity(splits.len());
        for (fold, split) in splits.iter().enumerate() {
            if self.verbose_level >= 1 {
                log::info!(
                    "Fold {}/{}: training on {} samples, testing on {}",
                    fold + 1,
                    self.num_folds,
                    split.train.len(),
                    split.test.len()
                );
            }
            predictions.push(self.run_fold(dataset, split, &factory)?);
        }
        self.aggregate(&splits, predictions)
    }

    /// Same result as [`CrossValidator::run`], with folds trained on the
    /// rayon thread pool. Predictions are aggregated in fold order.
    pub fn run_parallel<F>(&self, dataset: &Dataset, factory: F) -> Result<CrossValidationResult>
    where
        F: Fn() -> Box<dyn Classifier> + Sync,
    {
        let splits = self.folds(dataset)?;
        log::info!("Running {} folds in parallel", splits.len());
        let predictions = splits
            .par_iter()
            .map(|split| self.run_fold(dataset, split, &factory))
            .collect::<Result<Vec<Predictions>>>()?;
        self.aggregate(&splits, predictions)
    }

    fn aggregate(
        &self,
        splits: &[Split],
        predictions: Vec<Predictions>,
    ) -> Result<CrossValidationResult> {
        let mut micro = StatsAccumulator::new(self.positive.clone());
        let mut macro_acc = StatsAccumulator::new(self.positive.clone());
        let mut folds = Vec::with_capacity(splits.len());

        for (fold, (split, pairs)) in splits.iter().zip(predictions).enumerate() {
            let mut fold_acc = StatsAccumulator::new(self.positive.clone());
            macro_acc.begin_fold();
            for (predicted, actual) in &pairs {
                micro.update(predicted, actual);
                macro_acc.update(predicted, actual);
                fold_acc.update(predicted, actual);
            }
            let stats = fold_acc.calculate_stats();
            if self.verbose_level >= 2 {
                log::info!(
                    "Fold {} counts {:?}: precision {:.4}, recall {:.4}, F1 {:.4}",
                    fold + 1,
                    fold_acc.counts(),
                    stats.precision,
                    stats.recall,
                    stats.f1
                );
            }
            folds.push(FoldSummary {
                fold,
                train_size: split.train.len(),
                test_size: split.test.len(),
                stats,
            });
        }

        micro.calculate_stats();
        let macro_stats = macro_acc.calculate_macro_average_stats(splits.len())?;

        let result = CrossValidationResult {
            micro_avg: micro.full_stats(),
            macro_avg: macro_acc.full_stats(),
            folds,
        };
        if self.verbose_level >= 1 {
            log::info!(
                "Cross-validation over {} folds: micro F1 {:.4}, macro F1 {:.4}",
                splits.len(),
                result.micro_avg.stats.f1,
                macro_stats.f1
            );
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassifierConfig;
    use crate::models::factory::build_classifier;
    use crate::models::majority::MajorityClassifier;

    /// Predicts whatever label is embedded in the input text.
    struct EchoClassifier;

    impl Classifier for EchoClassifier {
        fn train_batch(&mut self, _samples: &[Sample]) {}

        fn classify(&self, input: &str) -> Result<String> {
            Ok(input.to_string())
        }

        fn save_state(&self) -> Result<serde_json::Value> {
            Ok(serde_json::Value::Null)
        }

        fn load_state(&mut self, _state: serde_json::Value) -> Result<()> {
            Ok(())
        }
    }

    fn balanced(n: usize) -> Dataset {
        Dataset::from_samples(
            (0..n)
                .map(|i| {
                    let label = if i % 2 == 0 { "a" } else { "b" };
                    Sample::new(format!("text {}", i), label)
                })
                .collect(),
        )
    }

    #[test]
    fn test_evaluator_counts_every_test_sample() {
        let ds = balanced(10);
        let train = ds.select(&[0, 1, 2, 3, 4, 5, 6]);
        let test = ds.select(&[7, 8, 9]);
        let mut clf = MajorityClassifier::new();
        let stats = Evaluator::new("a").run(&mut clf, &train, &test).unwrap();
        assert_eq!(stats.total_count(), 3);
    }

    #[test]
    fn test_evaluator_perfect_classifier() {
        let test = vec![Sample::new("a", "a"), Sample::new("b", "b")];
        let stats = Evaluator::new("a").run(&mut EchoClassifier, &[], &test).unwrap();
        assert_eq!(stats.stats.accuracy, 1.0);
        assert_eq!(stats.stats.f1, 1.0);
    }

    #[test]
    fn test_cross_validation_majority_is_half() {
        let ds = balanced(100);
        let result = CrossValidator::new(5, "a")
            .run(&ds, || Box::new(MajorityClassifier::new()) as Box<dyn Classifier>)
            .unwrap();
        assert_eq!(result.folds.len(), 5);
        assert_eq!(result.micro_avg.total_count(), 100);
        assert!((result.micro_avg.stats.accuracy - 0.5).abs() < 1e-9);
        assert!((result.macro_avg.stats.accuracy - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let ds = balanced(40);
        let config = ClassifierConfig::default();
        let validator = CrossValidator::new(4, "a").with_shuffle(3);
        let sequential = validator.run(&ds, || build_classifier(&config)).unwrap();
        let parallel = validator.run_parallel(&ds, || build_classifier(&config)).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_invalid_fold_count() {
        let ds = balanced(3);
        let err = CrossValidator::new(4, "a").run(&ds, || build_classifier(&ClassifierConfig::MajorityClass));
        assert!(matches!(err, Err(LearnerError::InvalidFoldCount { k: 4, len: 3 })));
    }

    #[test]
    fn test_aggregate_reports_missing_fold() {
        let splits: Vec<Split> = k_fold(4, 2).unwrap().collect();
        let predictions = vec![vec![("a".to_string(), "a".to_string())]];
        let err = CrossValidator::new(2, "a").aggregate(&splits, predictions);
        assert!(matches!(
            err,
            Err(LearnerError::FoldMismatch {
                expected: 2,
                recorded: 1
            })
        ));
    }

    #[test]
    fn test_untrained_error_propagates() {
        // an empty training side leaves the majority model untrained
        let test = vec![Sample::new("x", "a")];
        let err = Evaluator::new("a").run(&mut MajorityClassifier::new(), &[], &test);
        assert!(matches!(err, Err(LearnerError::NotTrained)));
    }
}
