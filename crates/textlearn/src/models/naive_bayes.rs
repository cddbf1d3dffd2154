use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::data_handling::Sample;
use crate::error::{LearnerError, Result};
use crate::models::classifier_trait::Classifier;

/// Number of tokens joined into the representative input of a category.
const BACK_CLASSIFY_TOKENS: usize = 5;

/// Split text on anything that is not alphanumeric.
pub fn tokenize(text: &str, lowercase: bool, min_token_len: usize) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty() && token.chars().count() >= min_token_len)
        .map(|token| {
            if lowercase {
                token.to_lowercase()
            } else {
                token.to_string()
            }
        })
        .collect()
}

/// Multinomial naive Bayes over bag-of-words token counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaiveBayesClassifier {
    alpha: f64,
    lowercase: bool,
    min_token_len: usize,
    num_docs: usize,
    doc_counts: BTreeMap<String, usize>,
    token_counts: BTreeMap<String, BTreeMap<String, usize>>,
    token_totals: BTreeMap<String, usize>,
    vocabulary: BTreeSet<String>,
}

impl NaiveBayesClassifier {
    pub fn new(alpha: f64, lowercase: bool, min_token_len: usize) -> Self {
        NaiveBayesClassifier {
            alpha,
            lowercase,
            min_token_len,
            num_docs: 0,
            doc_counts: BTreeMap::new(),
            token_counts: BTreeMap::new(),
            token_totals: BTreeMap::new(),
            vocabulary: BTreeSet::new(),
        }
    }

    fn reset(&mut self) {
        self.num_docs = 0;
        self.doc_counts.clear();
        self.token_counts.clear();
        self.token_totals.clear();
        self.vocabulary.clear();
    }

    /// Unnormalized log posterior of every category for `input`.
    pub fn log_scores(&self, input: &str) -> BTreeMap<String, f64> {
        let tokens: Vec<String> = tokenize(input, self.lowercase, self.min_token_len)
            .into_iter()
            .filter(|t| self.vocabulary.contains(t))
            .collect();
        let vocab_size = self.vocabulary.len() as f64;

        self.doc_counts
            .iter()
            .map(|(category, &docs)| {
                let prior = (docs as f64 / self.num_docs as f64).ln();
                let total = self.token_totals.get(category).copied().unwrap_or(0) as f64;
                let counts = self.token_counts.get(category);
                let denominator = total + self.alpha * vocab_size;

                let likelihood: f64 = tokens
                    .iter()
                    .map(|token| {
                        let count = counts
                            .and_then(|c| c.get(token))
                            .copied()
                            .unwrap_or(0) as f64;
                        ((count + self.alpha) / denominator).ln()
                    })
                    .sum();
                (category.clone(), prior + likelihood)
            })
            .collect()
    }
}

impl Classifier for NaiveBayesClassifier {
    fn train_batch(&mut self, samples: &[Sample]) {
        self.reset();
        for sample in samples {
            self.num_docs += 1;
            *self.doc_counts.entry(sample.output.clone()).or_insert(0) += 1;

            let counts = self.token_counts.entry(sample.output.clone()).or_default();
            let total = self.token_totals.entry(sample.output.clone()).or_insert(0);
            for token in tokenize(&sample.input, self.lowercase, self.min_token_len) {
                *total += 1;
                *counts.entry(token.clone()).or_insert(0) += 1;
                self.vocabulary.insert(token);
            }
        }
        log::trace!(
            "Trained naive Bayes on {} documents, {} categories, vocabulary of {}",
            self.num_docs,
            self.doc_counts.len(),
            self.vocabulary.len()
        );
    }

    fn classify(&self, input: &str) -> Result<String> {
        if self.num_docs == 0 {
            return Err(LearnerError::NotTrained);
        }
        let mut best: Option<(String, f64)> = None;
        for (category, score) in self.log_scores(input) {
            // strictly greater, so ties keep the first category in order
            if best.as_ref().map_or(true, |(_, best_score)| score > *best_score) {
                best = Some((category, score));
            }
        }
        best.map(|(category, _)| category)
            .ok_or(LearnerError::NotTrained)
    }

    fn back_classify(&self, category: &str) -> Option<String> {
        let counts = self.token_counts.get(category)?;
        let mut tokens: Vec<(&String, &usize)> = counts.iter().collect();
        tokens.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        if tokens.is_empty() {
            return None;
        }
        Some(
            tokens
                .into_iter()
                .take(BACK_CLASSIFY_TOKENS)
                .map(|(token, _)| token.as_str())
                .collect::<Vec<&str>>()
                .join(" "),
        )
    }

    fn save_state(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn load_state(&mut self, state: serde_json::Value) -> Result<()> {
        *self = serde_json::from_value(state)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "naive_bayes"
    }
}
