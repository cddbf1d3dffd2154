pub mod classifier_trait;
pub mod factory;
pub mod majority;
pub mod naive_bayes;

pub use classifier_trait::Classifier;
