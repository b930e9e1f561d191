//! Seeded train/test partitioning.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Row indices for each side of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with a seeded RNG and hold out `test_size` of the rows.
///
/// The held-out count is rounded up (at least one row when `test_size > 0`
/// and `n > 1`), and at least one row always stays on the training side.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> SplitIndices {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_size = if test_size.is_finite() { test_size.clamp(0.0, 1.0) } else { 0.0 };
    let n_test = ((n as f64) * test_size).ceil() as usize;
    let n_test = n_test.min(n.saturating_sub(1));

    let train = indices.split_off(n_test);
    SplitIndices { train, test: indices }
}

/// Pick the rows named by `indices`.
pub fn take_rows<T: Clone>(rows: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| rows[i].clone()).collect()
}
