//! Data structures for labeled text datasets.
//!
//! This module defines `Sample` and `Dataset`. A sample is identified by its
//! index in the dataset, so duplicate-valued samples never collide when a
//! dataset is partitioned into train and test subsets.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{LearnerError, Result};
use crate::partition::Split;

/// A single labeled data point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub input: String,
    pub output: String,
}

impl Sample {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Sample {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// Number of samples of one category on each side of a split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPartition {
    pub train: usize,
    pub test: usize,
    pub overall: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    samples: Vec<Sample>,
    categories: Vec<String>,
}

impl Dataset {
    /// Create a dataset over a fixed list of categories.
    ///
    /// Fails with `UnknownCategory` when a sample is labeled outside of
    /// `categories`.
    pub fn new(samples: Vec<Sample>, categories: Vec<String>) -> Result<Self> {
        if let Some(sample) = samples
            .iter()
            .find(|s| !categories.iter().any(|c| *c == s.output))
        {
            return Err(LearnerError::UnknownCategory(sample.output.clone()));
        }
        Ok(Dataset {
            samples,
            categories,
        })
    }

    /// Create a dataset whose categories are inferred in order of first
    /// appearance.
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        let mut categories: Vec<String> = Vec::new();
        for sample in &samples {
            if !categories.contains(&sample.output) {
                categories.push(sample.output.clone());
            }
        }
        Dataset {
            samples,
            categories,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Clone the samples at `indices`, in the order given.
    pub fn select(&self, indices: &[usize]) -> Vec<Sample> {
        indices.iter().map(|&idx| self.samples[idx].clone()).collect()
    }

    /// Count samples per category on the train side, test side and overall.
    pub fn category_partition(&self, split: &Split) -> BTreeMap<String, CategoryPartition> {
        let mut partition: BTreeMap<String, CategoryPartition> = self
            .categories
            .iter()
            .map(|c| (c.clone(), CategoryPartition::default()))
            .collect();

        for &idx in &split.train {
            let entry = partition.entry(self.samples[idx].output.clone()).or_default();
            entry.train += 1;
            entry.overall += 1;
        }
        for &idx in &split.test {
            let entry = partition.entry(self.samples[idx].output.clone()).or_default();
            entry.test += 1;
            entry.overall += 1;
        }
        partition
    }

    pub fn log_input_data_summary(&self) {
        log::info!(
            "Loaded {} samples over {} categories",
            self.samples.len(),
            self.categories.len()
        );
        for category in &self.categories {
            log::debug!(
                "  {}: {} samples",
                category,
                self.samples.iter().filter(|s| s.output == *category).count()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_samples_infers_categories_in_order() {
        let ds = Dataset::from_samples(vec![
            Sample::new("a", "spam"),
            Sample::new("b", "ham"),
            Sample::new("c", "spam"),
        ]);
        assert_eq!(ds.categories(), &["spam".to_string(), "ham".to_string()]);
    }

    #[test]
    fn test_new_rejects_unknown_category() {
        let err = Dataset::new(vec![Sample::new("a", "eggs")], vec!["spam".to_string()]);
        assert!(matches!(err, Err(LearnerError::UnknownCategory(c)) if c == "eggs"));
    }

    #[test]
    fn test_category_partition_counts_duplicates_separately() {
        let ds = Dataset::from_samples(vec![
            Sample::new("same", "x"),
            Sample::new("same", "x"),
            Sample::new("other", "y"),
        ]);
        let split = Split {
            train: vec![0, 2],
            test: vec![1],
        };
        let partition = ds.category_partition(&split);
        assert_eq!(
            partition["x"],
            CategoryPartition {
                train: 1,
                test: 1,
                overall: 2
            }
        );
        assert_eq!(partition["y"].overall, 1);
    }
}
