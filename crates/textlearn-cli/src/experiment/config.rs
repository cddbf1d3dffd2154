use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use textlearn::config::LearnerConfig;
use textlearn::learner::{DEFAULT_CLASSIFIER_FILE, DEFAULT_NUM_FOLDS};

/// Parameters for one experiment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Dataset file (.json, .csv or .tsv).
    pub dataset: PathBuf,
    pub learner: LearnerConfig,
    pub num_folds: usize,
    pub verbose_level: u8,
    /// Log every misclassified test sample.
    pub log_errors: bool,
    /// Where the trained classifier is written.
    pub model_path: PathBuf,
    /// Optional path for the full learner state.
    pub state_path: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("dataset.json"),
            learner: LearnerConfig::default(),
            num_folds: DEFAULT_NUM_FOLDS,
            verbose_level: 0,
            log_errors: false,
            model_path: PathBuf::from(DEFAULT_CLASSIFIER_FILE),
            state_path: None,
        }
    }
}

/// Load a run configuration from a JSON file.
pub fn load_run_config<P: AsRef<Path>>(path: P) -> Result<RunConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: RunConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}
