use textlearn::config::{ClassifierConfig, LearnerConfig};
use textlearn::data_handling::{Dataset, Sample};
use textlearn::learner::{Learner, DEFAULT_NUM_FOLDS};

fn main() {
    env_logger::init();

    // Tiny synthetic corpus: two topics with mostly disjoint vocabularies
    let sports = ["match goal team", "coach team win", "goal keeper save", "league match final"];
    let cooking = ["oven bake bread", "salt pepper pan", "bake cake oven", "pan fry onion"];

    let mut samples = Vec::new();
    for round in 0..5 {
        for (s, c) in sports.iter().zip(cooking.iter()) {
            samples.push(Sample::new(format!("{} {}", s, round), "sports"));
            samples.push(Sample::new(format!("{} {}", c, round), "cooking"));
        }
    }
    let dataset = Dataset::from_samples(samples);
    println!("Synthetic dataset: {} samples, categories {:?}", dataset.len(), dataset.categories());

    let config = LearnerConfig {
        shuffle_seed: Some(42),
        ..LearnerConfig::new(0.8, ClassifierConfig::default())
    };
    let mut learner = Learner::new(dataset, config).expect("failed to create learner");

    let eval = learner.eval(true).expect("evaluation failed");
    println!("Held-out accuracy={:.3} f1={:.3}", eval.stats.accuracy, eval.stats.f1);

    let cv = learner
        .cross_validate(DEFAULT_NUM_FOLDS, 1, false)
        .expect("cross-validation failed");
    println!(
        "Cross-validation micro f1={:.3} macro f1={:.3} (fold f1 std {:.3})",
        cv.micro_avg.stats.f1,
        cv.macro_avg.stats.f1,
        cv.f1_std_dev()
    );

    println!("Representative sports input: {:?}", learner.back_classify("sports"));
}
