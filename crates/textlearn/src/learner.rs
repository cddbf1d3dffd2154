//! The `Learner` ties a dataset, its train/test split and a classifier
//! together and exposes training, evaluation, cross-validation and
//! persistence.
use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::LearnerConfig;
use crate::data_handling::{CategoryPartition, Dataset, Sample};
use crate::error::{LearnerError, Result};
use crate::evaluation::{CrossValidationResult, CrossValidator, Evaluator};
use crate::models::factory::build_classifier;
use crate::models::Classifier;
use crate::partition::{split, split_shuffled, Split};
use crate::serialization;
use crate::stats::{ConfusionMatrix, FullStats};

/// File name used when persisting a classifier without an explicit path.
pub const DEFAULT_CLASSIFIER_FILE: &str = "classifier.json";

pub const DEFAULT_NUM_FOLDS: usize = 5;

/// Consolidated view of the latest micro-level statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerStats {
    pub total_count: usize,
    pub tp: usize,
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
    pub precision: f64,
    pub recall: f64,
    pub accuracy: f64,
    pub specificity: f64,
    pub f1: f64,
    pub confusion_matrix: ConfusionMatrix,
    pub category_partition: BTreeMap<String, CategoryPartition>,
}

/// Which computation produced the most recent statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum StatsSource {
    Eval,
    CrossValidation,
}

/// Persisted form of a learner.
#[derive(Serialize, Deserialize)]
struct LearnerState {
    #[serde(default)]
    classifier: Option<String>,
    config: LearnerConfig,
    dataset: Dataset,
    split: Split,
    #[serde(default)]
    last_eval: Option<FullStats>,
    #[serde(default)]
    cross_validation: Option<CrossValidationResult>,
    #[serde(default)]
    latest: Option<StatsSource>,
    saved_at: DateTime<Utc>,
}

pub struct Learner {
    dataset: Dataset,
    config: LearnerConfig,
    positive: String,
    classifier: Box<dyn Classifier>,
    split: Split,
    last_eval: Option<FullStats>,
    cross_validation: Option<CrossValidationResult>,
    latest: Option<StatsSource>,
}

fn resolve_positive(dataset: &Dataset, config: &LearnerConfig) -> Result<String> {
    match &config.positive_category {
        Some(category) if dataset.has_category(category) => Ok(category.clone()),
        Some(category) => Err(LearnerError::UnknownCategory(category.clone())),
        None => dataset
            .categories()
            .first()
            .cloned()
            .ok_or(LearnerError::EmptyDataset),
    }
}

impl Learner {
    /// Create a learner and split the dataset right away.
    ///
    /// # Arguments
    ///
    /// * `dataset` - Labeled samples and their categories
    /// * `config` - Split ratio, classifier configuration, positive category
    ///   and optional shuffle seed
    pub fn new(dataset: Dataset, config: LearnerConfig) -> Result<Self> {
        if dataset.is_empty() {
            return Err(LearnerError::EmptyDataset);
        }
        config.classifier.validate()?;
        let positive = resolve_positive(&dataset, &config)?;
        let split = match config.shuffle_seed {
            Some(seed) => split_shuffled(dataset.len(), config.train_split, seed)?,
            None => split(dataset.len(), config.train_split)?,
        };
        log::debug!(
            "Split {} samples into {} training and {} testing (positive category '{}')",
            dataset.len(),
            split.train.len(),
            split.test.len(),
            positive
        );

        let classifier = build_classifier(&config.classifier);
        Ok(Learner {
            dataset,
            config,
            positive,
            classifier,
            split,
            last_eval: None,
            cross_validation: None,
            latest: None,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    pub fn split(&self) -> &Split {
        &self.split
    }

    pub fn positive_category(&self) -> &str {
        &self.positive
    }

    pub fn train_set(&self) -> Vec<Sample> {
        self.dataset.select(&self.split.train)
    }

    pub fn test_set(&self) -> Vec<Sample> {
        self.dataset.select(&self.split.test)
    }

    pub fn last_eval(&self) -> Option<&FullStats> {
        self.last_eval.as_ref()
    }

    pub fn cross_validation(&self) -> Option<&CrossValidationResult> {
        self.cross_validation.as_ref()
    }

    /// Train the classifier on the held training set.
    pub fn train(&mut self) {
        let train = self.train_set();
        self.train_on(&train);
    }

    /// Train the classifier on an explicit set of samples.
    pub fn train_on(&mut self, samples: &[Sample]) {
        log::info!(
            "Training {} classifier on {} samples",
            self.classifier.name(),
            samples.len()
        );
        self.classifier.train_batch(samples);
    }

    /// Train on the held training set and evaluate on the held test set.
    pub fn eval(&mut self, log_errors: bool) -> Result<FullStats> {
        let train = self.train_set();
        let test = self.test_set();
        let stats = Evaluator::new(self.positive.clone())
            .with_error_logging(log_errors)
            .run(self.classifier.as_mut(), &train, &test)?;
        log::info!(
            "Evaluation on {} samples: accuracy {:.4}, F1 {:.4}",
            stats.total_count(),
            stats.stats.accuracy,
            stats.stats.f1
        );
        self.last_eval = Some(stats.clone());
        self.latest = Some(StatsSource::Eval);
        Ok(stats)
    }

    /// Run k-fold cross-validation over the whole dataset.
    ///
    /// Each fold trains its own classifier built from the configuration; the
    /// learner's classifier and held split are left untouched.
    pub fn cross_validate(
        &mut self,
        num_folds: usize,
        verbose_level: u8,
        log_errors: bool,
    ) -> Result<CrossValidationResult> {
        let mut validator = CrossValidator::new(num_folds, self.positive.clone())
            .verbose_level(verbose_level)
            .with_error_logging(log_errors);
        if let Some(seed) = self.config.shuffle_seed {
            validator = validator.with_shuffle(seed);
        }
        let classifier_config = self.config.classifier.clone();
        let factory = || build_classifier(&classifier_config);
        let result = if self.config.parallel_folds {
            validator.run_parallel(&self.dataset, factory)?
        } else {
            validator.run(&self.dataset, factory)?
        };

        self.cross_validation = Some(result.clone());
        self.latest = Some(StatsSource::CrossValidation);
        Ok(result)
    }

    pub fn classify(&self, input: &str) -> Result<String> {
        self.classifier.classify(input)
    }

    pub fn back_classify(&self, category: &str) -> Option<String> {
        self.classifier.back_classify(category)
    }

    /// Per-category sample counts on each side of the held split.
    pub fn get_category_partition(&self) -> BTreeMap<String, CategoryPartition> {
        self.dataset.category_partition(&self.split)
    }

    /// Report derived from the most recent micro-level statistics: the
    /// micro average of the last cross-validation, or the last evaluation if
    /// it ran more recently.
    pub fn get_stats(&self) -> Result<LearnerStats> {
        let micro = match self.latest {
            Some(StatsSource::Eval) => self.last_eval.as_ref(),
            Some(StatsSource::CrossValidation) => {
                self.cross_validation.as_ref().map(|r| &r.micro_avg)
            }
            None => None,
        }
        .ok_or(LearnerError::NoStatsAvailable)?;

        Ok(LearnerStats {
            total_count: micro.total_count(),
            tp: micro.counts.tp,
            tn: micro.counts.tn,
            fp: micro.counts.fp,
            fn_: micro.counts.fn_,
            precision: micro.stats.precision,
            recall: micro.stats.recall,
            accuracy: micro.stats.accuracy,
            specificity: micro.stats.specificity,
            f1: micro.stats.f1,
            confusion_matrix: micro.confusion_matrix.clone(),
            category_partition: self.get_category_partition(),
        })
    }

    pub fn serialize_classifier(&self) -> Result<String> {
        serialization::to_string(self.classifier.as_ref(), &self.config.classifier)
    }

    /// Replace the classifier (and its configuration) with a serialized one.
    pub fn deserialize_classifier(&mut self, serialized: &str) -> Result<()> {
        let (classifier, classifier_config) = serialization::from_string(serialized)?;
        self.classifier = classifier;
        self.config.classifier = classifier_config;
        Ok(())
    }

    pub fn serialize_and_save_classifier<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = self.serialize_classifier()?;
        std::fs::write(&path, serialized)?;
        log::info!("Saved classifier to {}", path.as_ref().display());
        Ok(())
    }

    pub fn load_and_deserialize_classifier<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let serialized = std::fs::read_to_string(&path)?;
        self.deserialize_classifier(&serialized)?;
        log::info!("Loaded classifier from {}", path.as_ref().display());
        Ok(())
    }

    /// Serialize the full learner state, classifier included.
    pub fn to_json(&self) -> Result<String> {
        let state = LearnerState {
            classifier: Some(self.serialize_classifier()?),
            config: self.config.clone(),
            dataset: self.dataset.clone(),
            split: self.split.clone(),
            last_eval: self.last_eval.clone(),
            cross_validation: self.cross_validation.clone(),
            latest: self.latest,
            saved_at: Utc::now(),
        };
        serde_json::to_string_pretty(&state)
            .map_err(|e| LearnerError::Serialization(format!("learner: {}", e)))
    }

    /// Rebuild a learner from [`Learner::to_json`] output.
    ///
    /// Fails with `MissingClassifier` when the `classifier` field is absent.
    pub fn from_json(json: &str) -> Result<Self> {
        let state: LearnerState = serde_json::from_str(json)?;
        let serialized = state.classifier.ok_or(LearnerError::MissingClassifier)?;

        if !state.split.is_partition_of(state.dataset.len()) {
            return Err(LearnerError::Deserialization(format!(
                "split of {} training and {} testing indices is not a partition of {} samples",
                state.split.train.len(),
                state.split.test.len(),
                state.dataset.len()
            )));
        }

        let positive = resolve_positive(&state.dataset, &state.config)?;
        let (classifier, classifier_config) = serialization::from_string(&serialized)?;
        let mut config = state.config;
        config.classifier = classifier_config;

        log::debug!("Restored learner saved at {}", state.saved_at);
        Ok(Learner {
            dataset: state.dataset,
            config,
            positive,
            classifier,
            split: state.split,
            last_eval: state.last_eval,
            cross_validation: state.cross_validation,
            latest: state.latest,
        })
    }
}
