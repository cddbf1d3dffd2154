//! Train/test partitioning by sample index.
//!
//! `split` produces a single train/test split from a ratio and `k_fold`
//! lazily yields the K splits used for cross-validation. Both work on
//! indices into a `Dataset`, and every index list is kept in ascending order
//! so the relative order of samples is preserved on both sides.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{LearnerError, Result};

/// Disjoint train/test index lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl Split {
    pub fn is_degenerate(&self) -> bool {
        self.train.is_empty() || self.test.is_empty()
    }

    /// True when both sides are strictly ascending and together hold every
    /// index in `0..len` exactly once.
    pub fn is_partition_of(&self, len: usize) -> bool {
        let ascending = |idx: &[usize]| idx.windows(2).all(|w| w[0] < w[1]);
        if !ascending(&self.train)
            || !ascending(&self.test)
            || self.train.len() + self.test.len() != len
        {
            return false;
        }
        let mut seen = vec![false; len];
        for &idx in self.train.iter().chain(self.test.iter()) {
            if idx >= len || seen[idx] {
                return false;
            }
            seen[idx] = true;
        }
        true
    }
}

fn check_ratio(ratio: f64) -> Result<()> {
    if ratio > 0.0 && ratio < 1.0 {
        Ok(())
    } else {
        Err(LearnerError::InvalidRatio(ratio))
    }
}

fn train_size(len: usize, ratio: f64) -> usize {
    ((ratio * len as f64).round() as usize).min(len)
}

fn permutation(len: usize, seed: u64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);
    order
}

/// Split `len` samples into the first `round(ratio * len)` for training and
/// the remainder for testing.
pub fn split(len: usize, ratio: f64) -> Result<Split> {
    check_ratio(ratio)?;
    let n_train = train_size(len, ratio);
    Ok(Split {
        train: (0..n_train).collect(),
        test: (n_train..len).collect(),
    })
}

/// Same sizes as [`split`], with membership drawn from a seeded permutation.
pub fn split_shuffled(len: usize, ratio: f64, seed: u64) -> Result<Split> {
    check_ratio(ratio)?;
    let n_train = train_size(len, ratio);
    let order = permutation(len, seed);

    let mut train = order[..n_train].to_vec();
    let mut test = order[n_train..].to_vec();
    train.sort_unstable();
    test.sort_unstable();
    Ok(Split { train, test })
}

/// Create a lazy K-fold iterator over `len` samples.
///
/// Fails with `InvalidFoldCount` unless `2 <= k <= len`.
pub fn k_fold(len: usize, k: usize) -> Result<KFold> {
    if k < 2 || k > len {
        return Err(LearnerError::InvalidFoldCount { k, len });
    }
    Ok(KFold {
        order: (0..len).collect(),
        k,
        next: 0,
    })
}

/// Iterator over the K splits of a cross-validation run.
///
/// Groups are contiguous runs of `order`; the first `len % k` groups hold one
/// extra sample.
#[derive(Debug, Clone)]
pub struct KFold {
    order: Vec<usize>,
    k: usize,
    next: usize,
}

impl KFold {
    /// Assign samples to groups from a seeded permutation instead of the
    /// dataset order.
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.order = permutation(self.order.len(), seed);
        self
    }

    pub fn num_folds(&self) -> usize {
        self.k
    }

    fn group_bounds(&self, fold: usize) -> (usize, usize) {
        let len = self.order.len();
        let base = len / self.k;
        let rem = len % self.k;
        let start = fold * base + fold.min(rem);
        let size = base + usize::from(fold < rem);
        (start, start + size)
    }

    /// Build the split for `fold` without advancing the iterator.
    pub fn split_for(&self, fold: usize) -> Split {
        let (start, end) = self.group_bounds(fold);
        let mut test = self.order[start..end].to_vec();
        let mut train: Vec<usize> = self.order[..start]
            .iter()
            .chain(self.order[end..].iter())
            .copied()
            .collect();
        test.sort_unstable();
        train.sort_unstable();
        Split { train, test }
    }
}

impl Iterator for KFold {
    type Item = Split;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.k {
            return None;
        }
        let split = self.split_for(self.next);
        self.next += 1;
        Some(split)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.k - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for KFold {}
