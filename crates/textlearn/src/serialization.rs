//! String round-trip for trained classifiers.
//!
//! The persisted form is a JSON object holding the builder configuration and
//! the classifier's exported state. Reading it back rebuilds a classifier
//! from the configuration and restores the state into it.
use serde::{Deserialize, Serialize};

use crate::config::ClassifierConfig;
use crate::error::{LearnerError, Result};
use crate::models::factory::build_classifier;
use crate::models::Classifier;

#[derive(Debug, Serialize, Deserialize)]
struct SerializedClassifier {
    config: ClassifierConfig,
    state: serde_json::Value,
}

/// Serialize a classifier together with the configuration it was built from.
pub fn to_string(classifier: &dyn Classifier, config: &ClassifierConfig) -> Result<String> {
    let payload = SerializedClassifier {
        config: config.clone(),
        state: classifier.save_state()?,
    };
    serde_json::to_string(&payload)
        .map_err(|e| LearnerError::Serialization(format!("classifier: {}", e)))
}

/// Rebuild a classifier from a string produced by [`to_string`].
pub fn from_string(serialized: &str) -> Result<(Box<dyn Classifier>, ClassifierConfig)> {
    let payload: SerializedClassifier = serde_json::from_str(serialized)?;
    payload.config.validate()?;
    let mut classifier = build_classifier(&payload.config);
    classifier.load_state(payload.state)?;
    log::debug!("Restored {} classifier", classifier.name());
    Ok((classifier, payload.config))
}
