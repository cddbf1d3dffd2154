//! End-to-end tests of the Learner facade: training, evaluation,
//! cross-validation and persistence.

use textlearn::config::{ClassifierConfig, LearnerConfig};
use textlearn::data_handling::{Dataset, Sample};
use textlearn::error::LearnerError;
use textlearn::learner::{Learner, DEFAULT_CLASSIFIER_FILE};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 5 + 5 samples, all of one category first.
fn ten_samples() -> Dataset {
    let mut samples = Vec::new();
    for i in 0..5 {
        samples.push(Sample::new(format!("sunny warm bright day {}", i), "weather"));
    }
    for i in 0..5 {
        samples.push(Sample::new(format!("stocks fell sharply today {}", i), "finance"));
    }
    Dataset::new(samples, vec!["weather".to_string(), "finance".to_string()]).unwrap()
}

fn topic_dataset(n: usize) -> Dataset {
    let samples = (0..n)
        .map(|i| {
            if i % 2 == 0 {
                Sample::new(format!("rain cloud wind storm {}", i % 7), "weather")
            } else {
                Sample::new(format!("market shares bank profit {}", i % 7), "finance")
            }
        })
        .collect();
    Dataset::from_samples(samples)
}

// ---------------------------------------------------------------------------
// Train / eval
// ---------------------------------------------------------------------------

#[test]
fn ten_samples_train_eval_reports_two() {
    init_logging();
    let mut learner = Learner::new(ten_samples(), LearnerConfig::default()).unwrap();
    assert_eq!(learner.train_set().len(), 8);
    assert_eq!(learner.test_set().len(), 2);

    learner.train();
    learner.eval(true).unwrap();
    let stats = learner.get_stats().unwrap();
    assert_eq!(stats.total_count, 2);
    assert_eq!(stats.tp + stats.tn + stats.fp + stats.fn_, 2);

    let partition = &stats.category_partition;
    assert_eq!(partition["weather"].train, 5);
    assert_eq!(partition["finance"].train, 3);
    assert_eq!(partition["finance"].test, 2);
    assert_eq!(partition["finance"].overall, 5);
}

#[test]
fn get_stats_requires_a_run() {
    let mut learner = Learner::new(ten_samples(), LearnerConfig::default()).unwrap();
    learner.train();
    assert!(matches!(learner.get_stats(), Err(LearnerError::NoStatsAvailable)));
}

// ---------------------------------------------------------------------------
// Cross-validation
// ---------------------------------------------------------------------------

#[test]
fn majority_cross_validation_detects_degenerate_classifier() {
    init_logging();
    let config = LearnerConfig::new(0.8, ClassifierConfig::MajorityClass);
    let mut learner = Learner::new(topic_dataset(100), config).unwrap();
    let result = learner.cross_validate(5, 1, false).unwrap();
    assert!((result.micro_avg.stats.accuracy - 0.5).abs() < 1e-9);
    assert_eq!(learner.get_stats().unwrap().total_count, 100);
}

#[test]
fn naive_bayes_cross_validation_separates_topics() {
    let mut learner = Learner::new(topic_dataset(60), LearnerConfig::default()).unwrap();
    let split_before = learner.split().clone();
    let result = learner.cross_validate(3, 0, false).unwrap();
    assert_eq!(result.micro_avg.stats.accuracy, 1.0);
    assert_eq!(result.macro_avg.stats.f1, 1.0);
    assert_eq!(learner.split(), &split_before, "cross-validation must not move the held split");
}

#[test]
fn parallel_folds_match_sequential() {
    let sequential_config = LearnerConfig {
        shuffle_seed: Some(11),
        ..LearnerConfig::default()
    };
    let parallel_config = LearnerConfig {
        parallel_folds: true,
        ..sequential_config.clone()
    };

    let mut sequential = Learner::new(topic_dataset(40), sequential_config).unwrap();
    let mut parallel = Learner::new(topic_dataset(40), parallel_config).unwrap();
    assert_eq!(
        sequential.cross_validate(4, 0, false).unwrap(),
        parallel.cross_validate(4, 0, false).unwrap()
    );
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn classifier_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_CLASSIFIER_FILE);

    let mut learner = Learner::new(topic_dataset(40), LearnerConfig::default()).unwrap();
    learner.train();
    learner.serialize_and_save_classifier(&path).unwrap();

    let mut fresh = Learner::new(topic_dataset(40), LearnerConfig::default()).unwrap();
    fresh.load_and_deserialize_classifier(&path).unwrap();
    for input in ["storm and rain", "bank profit", "unrelated words"] {
        assert_eq!(learner.classify(input).unwrap(), fresh.classify(input).unwrap());
    }
}

#[test]
fn missing_classifier_file_is_io_error() {
    let mut learner = Learner::new(ten_samples(), LearnerConfig::default()).unwrap();
    let err = learner.load_and_deserialize_classifier("/nonexistent/classifier.json");
    assert!(matches!(err, Err(LearnerError::Io(_))));
}

#[test]
fn corrupted_classifier_file_is_deserialization_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("classifier.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut learner = Learner::new(ten_samples(), LearnerConfig::default()).unwrap();
    let err = learner.load_and_deserialize_classifier(&path);
    assert!(matches!(err, Err(LearnerError::Deserialization(_))));
}

#[test]
fn learner_json_round_trip_keeps_state() {
    let config = LearnerConfig {
        shuffle_seed: Some(9),
        ..LearnerConfig::default()
    };
    let mut learner = Learner::new(topic_dataset(30), config).unwrap();
    learner.cross_validate(3, 0, false).unwrap();
    learner.train();

    let json = learner.to_json().unwrap();
    assert!(json.contains("saved_at"));
    let restored = Learner::from_json(&json).unwrap();

    assert_eq!(restored.split(), learner.split());
    assert_eq!(restored.config(), learner.config());
    assert_eq!(restored.dataset(), learner.dataset());
    assert_eq!(restored.cross_validation(), learner.cross_validation());
    assert_eq!(restored.get_stats().unwrap(), learner.get_stats().unwrap());
    assert_eq!(
        restored.classify("wind and clouds").unwrap(),
        learner.classify("wind and clouds").unwrap()
    );
}

#[test]
fn from_json_rejects_garbage() {
    assert!(matches!(
        Learner::from_json("[]"),
        Err(LearnerError::Deserialization(_))
    ));
}

#[test]
fn from_json_rejects_overlapping_split() {
    let mut learner = Learner::new(ten_samples(), LearnerConfig::default()).unwrap();
    learner.train();
    let mut state: serde_json::Value = serde_json::from_str(&learner.to_json().unwrap()).unwrap();
    state["split"]["train"] = serde_json::json!((0..10).collect::<Vec<usize>>());
    state["split"]["test"] = serde_json::json!([8, 9, 9]);

    let err = Learner::from_json(&state.to_string());
    assert!(matches!(err, Err(LearnerError::Deserialization(_))));
}

#[test]
fn from_json_rejects_incomplete_split() {
    let mut learner = Learner::new(ten_samples(), LearnerConfig::default()).unwrap();
    learner.train();
    let mut state: serde_json::Value = serde_json::from_str(&learner.to_json().unwrap()).unwrap();
    state["split"]["test"] = serde_json::json!([9]);

    let err = Learner::from_json(&state.to_string());
    assert!(matches!(err, Err(LearnerError::Deserialization(_))));
}

// ---------------------------------------------------------------------------
// Classifier configuration
// ---------------------------------------------------------------------------

#[test]
fn non_positive_smoothing_is_rejected() {
    let config = LearnerConfig::new(
        0.8,
        ClassifierConfig::NaiveBayes {
            alpha: 0.0,
            lowercase: true,
            min_token_len: 1,
        },
    );
    let err = Learner::new(ten_samples(), config);
    assert!(matches!(err, Err(LearnerError::InvalidSmoothing(_))));
}

#[test]
fn saved_classifier_with_bad_smoothing_is_rejected() {
    let mut learner = Learner::new(ten_samples(), LearnerConfig::default()).unwrap();
    learner.train();
    let mut saved: serde_json::Value =
        serde_json::from_str(&learner.serialize_classifier().unwrap()).unwrap();
    saved["config"]["NaiveBayes"]["alpha"] = serde_json::json!(-1.0);

    let err = learner.deserialize_classifier(&saved.to_string());
    assert!(matches!(err, Err(LearnerError::InvalidSmoothing(_))));
    // the trained classifier is left in place
    assert!(learner.classify("sunny day").is_ok());
}
