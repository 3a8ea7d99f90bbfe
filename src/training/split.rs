//! Stratified train/test split

use crate::error::{Result, TriageError};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Row positions of each side of a split, ascending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split row positions so each class keeps its proportion in both sides.
///
/// Classes are visited in sorted order and shuffled with one seeded RNG,
/// so the same labels, fraction and seed always give the same split. Each
/// class holds out `round(n * test_size)` rows, at least one, and keeps at
/// least one for training.
pub fn stratified_split<S: AsRef<str>>(labels: &[S], test_size: f64, seed: u64) -> Result<SplitIndices> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(TriageError::TrainingError(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let mut by_class: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, label) in labels.iter().enumerate() {
        by_class.entry(label.as_ref()).or_default().push(i);
    }

    if let Some((class, rows)) = by_class.iter().find(|(_, rows)| rows.len() < 2) {
        return Err(TriageError::TrainingError(format!(
            "class '{}' has {} row(s); stratified split needs at least 2",
            class,
            rows.len()
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for rows in by_class.values_mut() {
        rows.shuffle(&mut rng);
        let n = rows.len();
        let n_test = ((n as f64 * test_size).round() as usize).clamp(1, n - 1);
        test.extend_from_slice(&rows[..n_test]);
        train.extend_from_slice(&rows[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(SplitIndices { train, test })
}
