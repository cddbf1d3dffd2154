//! Run helpers for the train, eval, cross-validate and classify commands.
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use textlearn::evaluation::CrossValidationResult;
use textlearn::io::read_dataset;
use textlearn::learner::{Learner, LearnerStats};
use textlearn::serialization;
use textlearn::stats::StatsReport;

use crate::experiment::config::RunConfig;

/// Condensed cross-validation output printed by the CLI.
#[derive(Debug, Serialize)]
pub struct CrossValidationSummary {
    pub num_folds: usize,
    pub micro_avg: StatsReport,
    pub macro_avg: StatsReport,
    /// Mean of the per-category F1 scores over the pooled predictions.
    pub class_macro_f1: f64,
    pub f1_std_dev: f64,
    pub stats: LearnerStats,
}

/// Load the dataset named in `config` and build a learner over it.
pub fn build_learner(config: &RunConfig) -> Result<Learner> {
    let dataset = read_dataset(&config.dataset)?;
    dataset.log_input_data_summary();
    let learner = Learner::new(dataset, config.learner.clone())
        .with_context(|| format!("Failed to set up learner for {}", config.dataset.display()))?;
    Ok(learner)
}

fn save_state(learner: &Learner, config: &RunConfig) -> Result<()> {
    if let Some(path) = &config.state_path {
        std::fs::write(path, learner.to_json()?)
            .with_context(|| format!("Failed to write learner state: {}", path.display()))?;
        log::info!("Wrote learner state to {}", path.display());
    }
    Ok(())
}

/// Train on the held training split and persist the classifier.
pub fn run_train(config: &RunConfig) -> Result<()> {
    let mut learner = build_learner(config)?;
    learner.train();
    learner
        .serialize_and_save_classifier(&config.model_path)
        .with_context(|| format!("Failed to save classifier: {}", config.model_path.display()))?;
    save_state(&learner, config)
}

/// Train, evaluate on the held test split and persist the classifier.
pub fn run_eval(config: &RunConfig) -> Result<LearnerStats> {
    let mut learner = build_learner(config)?;
    learner.eval(config.log_errors)?;
    learner
        .serialize_and_save_classifier(&config.model_path)
        .with_context(|| format!("Failed to save classifier: {}", config.model_path.display()))?;
    save_state(&learner, config)?;
    Ok(learner.get_stats()?)
}

pub fn summarize(result: &CrossValidationResult, stats: LearnerStats) -> CrossValidationSummary {
    CrossValidationSummary {
        num_folds: result.folds.len(),
        micro_avg: result.micro_avg.stats,
        macro_avg: result.macro_avg.stats,
        class_macro_f1: result.micro_avg.class_macro_f1(),
        f1_std_dev: result.f1_std_dev(),
        stats,
    }
}

pub fn run_cross_validate(config: &RunConfig) -> Result<CrossValidationSummary> {
    let mut learner = build_learner(config)?;
    let result = learner.cross_validate(config.num_folds, config.verbose_level, config.log_errors)?;
    save_state(&learner, config)?;
    Ok(summarize(&result, learner.get_stats()?))
}

/// Classify each input with a previously saved classifier.
pub fn run_classify<P: AsRef<Path>>(model_path: P, inputs: &[String]) -> Result<Vec<String>> {
    let serialized = std::fs::read_to_string(&model_path).with_context(|| {
        format!("Failed to read classifier: {}", model_path.as_ref().display())
    })?;
    let (classifier, _) = serialization::from_string(&serialized)?;
    let labels = inputs
        .iter()
        .map(|input| classifier.classify(input))
        .collect::<Result<Vec<String>, _>>()?;
    Ok(labels)
}
