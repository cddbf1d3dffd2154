//! Integration tests for train/test splitting and k-fold partitioning.

use std::collections::HashSet;

use textlearn::partition::{k_fold, split, split_shuffled, Split};

fn assert_partition(split: &Split, len: usize) {
    let train: HashSet<usize> = split.train.iter().copied().collect();
    let test: HashSet<usize> = split.test.iter().copied().collect();
    assert!(train.is_disjoint(&test), "train and test overlap");
    assert_eq!(train.len() + test.len(), len);
    assert_eq!(train.len(), split.train.len(), "duplicate train index");
    assert!(split.train.windows(2).all(|w| w[0] < w[1]));
    assert!(split.test.windows(2).all(|w| w[0] < w[1]));
}

// ---------------------------------------------------------------------------
// Ratio split
// ---------------------------------------------------------------------------

#[test]
fn split_sizes_hold_for_many_ratios() {
    for len in [1usize, 2, 7, 10, 33, 100] {
        for ratio in [0.1, 0.25, 0.5, 0.8, 0.9, 0.99] {
            let s = split(len, ratio).unwrap();
            assert_partition(&s, len);
            assert_eq!(s.train.len(), (ratio * len as f64).round() as usize);

            let shuffled = split_shuffled(len, ratio, 11).unwrap();
            assert_partition(&shuffled, len);
            assert_eq!(shuffled.train.len(), s.train.len());
        }
    }
}

#[test]
fn split_ten_samples_point_eight() {
    let s = split(10, 0.8).unwrap();
    assert_eq!(s.train.len(), 8);
    assert_eq!(s.test.len(), 2);
}

#[test]
fn split_shuffled_depends_on_seed() {
    let a = split_shuffled(200, 0.5, 1).unwrap();
    let b = split_shuffled(200, 0.5, 2).unwrap();
    assert_ne!(a.train, b.train);
}

// ---------------------------------------------------------------------------
// K-fold
// ---------------------------------------------------------------------------

#[test]
fn k_fold_test_sets_partition_dataset() {
    for len in [2usize, 5, 10, 37, 100] {
        for k in 2..=len.min(10) {
            let folds: Vec<Split> = k_fold(len, k).unwrap().collect();
            assert_eq!(folds.len(), k);

            let mut seen = vec![0usize; len];
            for fold in &folds {
                assert_partition(fold, len);
                for &idx in &fold.test {
                    seen[idx] += 1;
                }
            }
            assert!(seen.iter().all(|&count| count == 1));

            let sizes: Vec<usize> = folds.iter().map(|f| f.test.len()).collect();
            let max = *sizes.iter().max().unwrap();
            let min = *sizes.iter().min().unwrap();
            assert!(max - min <= 1, "fold sizes {:?} differ by more than 1", sizes);
        }
    }
}

#[test]
fn k_fold_is_lazy_and_exact_size() {
    let mut folds = k_fold(10, 5).unwrap();
    assert_eq!(folds.len(), 5);
    folds.next();
    assert_eq!(folds.len(), 4);
    assert_eq!(folds.split_for(0).test, vec![0, 1]);
}

#[test]
fn k_fold_invalid_counts() {
    assert!(k_fold(10, 0).is_err());
    assert!(k_fold(10, 1).is_err());
    assert!(k_fold(10, 11).is_err());
    assert!(k_fold(0, 2).is_err());
}
