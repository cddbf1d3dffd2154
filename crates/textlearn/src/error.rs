use std::error::Error;
use std::fmt;

/// Error type for partitioning, evaluation and persistence failures
#[derive(Debug)]
pub enum LearnerError {
    /// Train split ratio outside of (0, 1)
    InvalidRatio(f64),
    /// Fold count below 2 or above the number of samples
    InvalidFoldCount { k: usize, len: usize },
    /// A cross-validation fold ended up with an empty side
    DegenerateFold { fold: usize, train: usize, test: usize },
    /// Macro averaging asked for a different number of folds than recorded
    FoldMismatch { expected: usize, recorded: usize },
    /// Naive Bayes smoothing must be a positive finite number
    InvalidSmoothing(f64),
    Io(std::io::Error),
    Serialization(String),
    Deserialization(String),
    NoStatsAvailable,
    MissingClassifier,
    UnknownCategory(String),
    NotTrained,
    EmptyDataset,
}

impl fmt::Display for LearnerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LearnerError::InvalidRatio(ratio) => {
                write!(f, "Train split ratio must be in (0, 1), got {}", ratio)
            }
            LearnerError::InvalidFoldCount { k, len } => write!(
                f,
                "Number of folds must be between 2 and the dataset size ({}), got {}",
                len, k
            ),
            LearnerError::DegenerateFold { fold, train, test } => write!(
                f,
                "Fold {} is degenerate: {} training and {} testing samples",
                fold, train, test
            ),
            LearnerError::FoldMismatch { expected, recorded } => write!(
                f,
                "Cannot average over {} folds, {} were recorded",
                expected, recorded
            ),
            LearnerError::InvalidSmoothing(alpha) => {
                write!(f, "Smoothing alpha must be positive and finite, got {}", alpha)
            }
            LearnerError::Io(err) => write!(f, "I/O failure: {}", err),
            LearnerError::Serialization(msg) => write!(f, "Failed to serialize: {}", msg),
            LearnerError::Deserialization(msg) => {
                write!(f, "Failed to deserialize classifier: {}", msg)
            }
            LearnerError::NoStatsAvailable => {
                write!(f, "No statistics available, run eval or cross-validation first")
            }
            LearnerError::MissingClassifier => write!(f, "Saved state has no classifier field"),
            LearnerError::UnknownCategory(category) => {
                write!(f, "Category '{}' is not part of the dataset categories", category)
            }
            LearnerError::NotTrained => write!(f, "Classifier has not been trained"),
            LearnerError::EmptyDataset => write!(f, "Dataset contains no samples"),
        }
    }
}

impl Error for LearnerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LearnerError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LearnerError {
    fn from(err: std::io::Error) -> Self {
        LearnerError::Io(err)
    }
}

impl From<serde_json::Error> for LearnerError {
    fn from(err: serde_json::Error) -> Self {
        LearnerError::Deserialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LearnerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_and_decode_failures_are_distinct() {
        let encode = LearnerError::Serialization("classifier: bad float".to_string());
        let decode = LearnerError::Deserialization("expected value".to_string());
        assert!(encode.to_string().starts_with("Failed to serialize:"));
        assert!(decode.to_string().starts_with("Failed to deserialize"));
    }

    #[test]
    fn test_json_errors_convert_to_deserialization() {
        let err: LearnerError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, LearnerError::Deserialization(_)));
    }
}
