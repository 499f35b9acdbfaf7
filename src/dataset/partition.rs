//! Seeded train/test partitioning.
//!
//! The row indices are shuffled with a [`StdRng`] seeded from the configured
//! seed, the first `ceil(n * test_fraction)` shuffled indices form the test
//! partition and the remainder the training partition. The same seed always
//! produces the same partition.

use crate::core::error::{DashboardError, Result};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Disjoint row index sets of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl TrainTestSplit {
    pub fn n_train(&self) -> usize {
        self.train.len()
    }

    pub fn n_test(&self) -> usize {
        self.test.len()
    }
}

/// Number of held-out rows for `n` rows at `test_fraction`.
pub fn test_size(n: usize, test_fraction: f64) -> usize {
    (n as f64 * test_fraction).ceil() as usize
}

/// Partition `0..n` into train and test index sets.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(DashboardError::invalid_parameter(
            "test_fraction",
            test_fraction.to_string(),
            "must be in range (0.0, 1.0)",
        ));
    }

    let n_test = test_size(n, test_fraction);
    if n_test == 0 || n_test >= n {
        return Err(DashboardError::training(format!(
            "Cannot split {} rows with test fraction {}: one partition would be empty",
            n, test_fraction
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    debug!(
        "Split {} rows into {} train / {} test (seed {})",
        n,
        train.len(),
        indices.len(),
        seed
    );

    Ok(TrainTestSplit {
        train,
        test: indices,
    })
}
