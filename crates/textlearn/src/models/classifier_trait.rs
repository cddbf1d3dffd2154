use crate::data_handling::Sample;
use crate::error::Result;

/// Contract between the evaluation engine and a text classifier.
///
/// Implementations are `Send` so cross-validation folds can be trained on
/// separate threads, each with its own instance.
pub trait Classifier: Send {
    /// Train on a full batch. Any previously learned state is replaced.
    fn train_batch(&mut self, samples: &[Sample]);

    /// Predict the category of `input`. Fails with `NotTrained` before the
    /// first call to `train_batch`.
    fn classify(&self, input: &str) -> Result<String>;

    /// Best-effort representative input for `category`.
    fn back_classify(&self, _category: &str) -> Option<String> {
        None
    }

    /// Export the learned state for serialization.
    fn save_state(&self) -> Result<serde_json::Value>;

    /// Restore state produced by `save_state` on the same classifier type.
    fn load_state(&mut self, state: serde_json::Value) -> Result<()>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
