//! textlearn: train, evaluate and cross-validate supervised text classifiers.
//!
//! The crate partitions a labeled dataset by sample index, trains a
//! classifier on one side and scores it on the other, and aggregates the
//! resulting confusion counts into precision/recall/F1 statistics, both
//! micro-averaged (pooled counts) and macro-averaged (mean of per-fold
//! ratios) across the folds of a cross-validation run.
//!
//! Classifiers are trait objects built from a serializable configuration so
//! a trained model can be written to disk and restored with the same
//! behavior.
pub mod config;
pub mod data_handling;
pub mod error;
pub mod evaluation;
pub mod io;
pub mod learner;
pub mod models;
pub mod partition;
pub mod serialization;
pub mod stats;

pub use config::{ClassifierConfig, LearnerConfig};
pub use data_handling::{Dataset, Sample};
pub use error::LearnerError;
pub use learner::Learner;
