//! Stratified train/test splitting.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{MailroomError, Result};

/// Row indices of a train/test partition, each sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl SplitIndices {
    pub fn train_len(&self) -> usize {
        self.train.len()
    }

    pub fn test_len(&self) -> usize {
        self.test.len()
    }
}

/// Label-stratified splitter.
///
/// The test side holds `ceil(test_fraction * n)` rows overall, raised so
/// that every class can keep at least one row on both sides. That total is
/// shared out across classes in proportion to their size, and the rows left
/// over by rounding go to the classes with the largest remainders (earlier
/// classes first on ties). The same seed and labels always give the same
/// partition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StratifiedSplit {
    test_fraction: f64,
    seed: u64,
}

impl StratifiedSplit {
    /// Create a splitter. `test_fraction` must lie strictly between 0 and 1.
    pub fn new(test_fraction: f64, seed: u64) -> Result<Self> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(MailroomError::invalid_config(format!(
                "test_fraction must be in (0, 1), got {test_fraction}"
            )));
        }
        Ok(Self {
            test_fraction,
            seed,
        })
    }

    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Partition row indices `0..labels.len()`.
    ///
    /// Fails with `InsufficientData` when any class has fewer than two rows.
    pub fn split<L>(&self, labels: &[L]) -> Result<SplitIndices>
    where
        L: Ord + Clone + std::fmt::Display,
    {
        if labels.is_empty() {
            return Err(MailroomError::insufficient_data("no rows to split"));
        }

        let mut by_class: BTreeMap<L, Vec<usize>> = BTreeMap::new();
        for (idx, label) in labels.iter().enumerate() {
            by_class.entry(label.clone()).or_default().push(idx);
        }

        if let Some((label, members)) = by_class.iter().find(|(_, m)| m.len() < 2) {
            return Err(MailroomError::insufficient_data(format!(
                "class '{label}' has {} member(s); at least 2 are needed to stratify",
                members.len()
            )));
        }

        let sizes: Vec<usize> = by_class.values().map(Vec::len).collect();
        let allocation = self.allocate(&sizes);

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut train = Vec::with_capacity(labels.len());
        let mut test = Vec::new();

        for (mut members, n_test) in by_class.into_values().zip(allocation) {
            members.shuffle(&mut rng);
            test.extend_from_slice(&members[..n_test]);
            train.extend_from_slice(&members[n_test..]);
        }

        train.sort_unstable();
        test.sort_unstable();

        Ok(SplitIndices { train, test })
    }

    /// Number of test rows per class, for classes of at least two rows.
    fn allocate(&self, sizes: &[usize]) -> Vec<usize> {
        let n: usize = sizes.iter().sum();
        let n_classes = sizes.len();
        let total =
            ((self.test_fraction * n as f64).ceil() as usize).clamp(n_classes, n - n_classes);

        let ideal: Vec<f64> = sizes
            .iter()
            .map(|&size| total as f64 * size as f64 / n as f64)
            .collect();
        let mut counts: Vec<usize> = ideal
            .iter()
            .zip(sizes)
            .map(|(share, &size)| (share.floor() as usize).clamp(1, size - 1))
            .collect();

        // Move one row at a time towards the class furthest from its share.
        let mut assigned: usize = counts.iter().sum();
        while assigned != total {
            let growing = assigned < total;
            let mut best: Option<(usize, f64)> = None;
            for (idx, (&count, &size)) in counts.iter().zip(sizes).enumerate() {
                let gap = ideal[idx] - count as f64;
                let (eligible, score) = if growing {
                    (count < size - 1, gap)
                } else {
                    (count > 1, -gap)
                };
                if eligible && best.is_none_or(|(_, top)| score > top) {
                    best = Some((idx, score));
                }
            }
            let Some((idx, _)) = best else {
                break;
            };
            if growing {
                counts[idx] += 1;
                assigned += 1;
            } else {
                counts[idx] -= 1;
                assigned -= 1;
            }
        }

        counts
    }
}
