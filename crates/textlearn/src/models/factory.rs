use crate::config::ClassifierConfig;
use crate::models::classifier_trait::Classifier;
use crate::models::majority::MajorityClassifier;
use crate::models::naive_bayes::NaiveBayesClassifier;

/// Build a fresh, untrained classifier from a `ClassifierConfig`.
pub fn build_classifier(config: &ClassifierConfig) -> Box<dyn Classifier> {
    match config {
        ClassifierConfig::NaiveBayes {
            alpha,
            lowercase,
            min_token_len,
        } => Box::new(NaiveBayesClassifier::new(*alpha, *lowercase, *min_token_len)),
        ClassifierConfig::MajorityClass => Box::new(MajorityClassifier::new()),
    }
}
