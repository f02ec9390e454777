//! Seeded train/validation splitting
//!
//! A split is a random partition of row indices: deterministic for a
//! fixed seed, disjoint, and lossless. The held-out side receives
//! `ceil(n * fraction)` rows, so even tiny fractions hold out at least
//! one row.

use crate::core::{ClassifierError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Split `n` row indices into (train, validation) index sets.
pub fn split_indices(n: usize, holdout_fraction: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    if n == 0 {
        return Err(ClassifierError::EmptyDataset);
    }
    if holdout_fraction <= 0.0 || holdout_fraction >= 1.0 {
        return Err(ClassifierError::InvalidParameter(format!(
            "holdout fraction must be in (0, 1), got {holdout_fraction}"
        )));
    }

    let n_holdout = (n as f64 * holdout_fraction).ceil() as usize;
    if n_holdout == 0 || n_holdout >= n {
        return Err(ClassifierError::InvalidParameter(format!(
            "holdout fraction {holdout_fraction} leaves an empty side for {n} samples"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let validation = indices.split_off(n - n_holdout);
    Ok((indices, validation))
}

/// Gather the items at `indices` into a new vector.
pub fn gather<T: Clone>(items: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| items[i].clone()).collect()
}
