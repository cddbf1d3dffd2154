use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{LearnerError, Result};

/// Central configuration for a learner run.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LearnerConfig {
    /// Fraction of the dataset used for training, in (0, 1).
    pub train_split: f64,

    /// Builder configuration for the classifier.
    pub classifier: ClassifierConfig,

    /// Category counted as "positive" in the pooled confusion counts.
    /// Falls back to the first dataset category.
    pub positive_category: Option<String>,

    /// Shuffle samples with this seed before splitting. `None` keeps the
    /// dataset order.
    pub shuffle_seed: Option<u64>,

    /// Train cross-validation folds concurrently.
    pub parallel_folds: bool,
}

/// Supported classifier types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ClassifierConfig {
    NaiveBayes {
        /// Additive (Laplace) smoothing.
        alpha: f64,
        lowercase: bool,
        /// Tokens shorter than this are dropped.
        min_token_len: usize,
    },
    MajorityClass,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig::NaiveBayes {
            alpha: 1.0,
            lowercase: true,
            min_token_len: 1,
        }
    }
}

impl ClassifierConfig {
    pub fn name(&self) -> &'static str {
        match self {
            ClassifierConfig::NaiveBayes { .. } => "naive_bayes",
            ClassifierConfig::MajorityClass => "majority",
        }
    }

    /// Reject hyper-parameters the classifier cannot score with.
    pub fn validate(&self) -> Result<()> {
        match self {
            ClassifierConfig::NaiveBayes { alpha, .. } if !(alpha.is_finite() && *alpha > 0.0) => {
                Err(LearnerError::InvalidSmoothing(*alpha))
            }
            _ => Ok(()),
        }
    }
}

impl FromStr for ClassifierConfig {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "naive_bayes" | "naive-bayes" | "nb" => Ok(ClassifierConfig::default()),
            "majority" | "majority_class" => Ok(ClassifierConfig::MajorityClass),
            _ => Err(format!(
                "Unknown classifier type: {}. Expected one of: naive_bayes, majority",
                s
            )),
        }
    }
}

impl LearnerConfig {
    pub fn new(train_split: f64, classifier: ClassifierConfig) -> Self {
        Self {
            train_split,
            classifier,
            ..Self::default()
        }
    }
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            train_split: 0.8,
            classifier: ClassifierConfig::default(),
            positive_category: None,
            shuffle_seed: None,
            parallel_folds: false,
        }
    }
}
