use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data_handling::Sample;
use crate::error::{LearnerError, Result};
use crate::models::classifier_trait::Classifier;

/// Baseline that always predicts the most frequent training category.
///
/// Ties go to the category that sorts first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MajorityClassifier {
    counts: BTreeMap<String, usize>,
    majority: Option<String>,
}

impl MajorityClassifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Classifier for MajorityClassifier {
    fn train_batch(&mut self, samples: &[Sample]) {
        self.counts.clear();
        for sample in samples {
            *self.counts.entry(sample.output.clone()).or_insert(0) += 1;
        }
        // max_by_key keeps the last maximum, so walk in reverse to prefer
        // the first category in sort order
        self.majority = self
            .counts
            .iter()
            .rev()
            .max_by_key(|(_, count)| **count)
            .map(|(category, _)| category.clone());
    }

    fn classify(&self, _input: &str) -> Result<String> {
        self.majority.clone().ok_or(LearnerError::NotTrained)
    }

    fn save_state(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn load_state(&mut self, state: serde_json::Value) -> Result<()> {
        *self = serde_json::from_value(state)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "majority"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicts_majority() {
        let mut clf = MajorityClassifier::new();
        assert!(matches!(clf.classify("x"), Err(LearnerError::NotTrained)));

        clf.train_batch(&[
            Sample::new("1", "b"),
            Sample::new("2", "a"),
            Sample::new("3", "b"),
        ]);
        assert_eq!(clf.classify("anything").unwrap(), "b");
    }

    #[test]
    fn test_tie_goes_to_first_sorted() {
        let mut clf = MajorityClassifier::new();
        clf.train_batch(&[Sample::new("1", "z"), Sample::new("2", "a")]);
        assert_eq!(clf.classify("").unwrap(), "a");
    }

    #[test]
    fn test_retraining_replaces_state() {
        let mut clf = MajorityClassifier::new();
        clf.train_batch(&[Sample::new("1", "a"), Sample::new("2", "a")]);
        clf.train_batch(&[Sample::new("1", "b")]);
        assert_eq!(clf.classify("").unwrap(), "b");
    }
}
