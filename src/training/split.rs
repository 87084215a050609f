//! Seeded train/validation holdout split

use crate::error::{EtaError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Row indices of a holdout split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldoutSplit {
    pub train_indices: Vec<usize>,
    pub validation_indices: Vec<usize>,
}

impl HoldoutSplit {
    /// Shuffle `0..n_samples` with a seeded ChaCha8 generator and hold out
    /// `ceil(n_samples * validation_fraction)` rows.
    ///
    /// The result depends only on `n_samples`, the fraction and the seed.
    pub fn new(n_samples: usize, validation_fraction: f64, seed: u64) -> Result<Self> {
        if !(validation_fraction > 0.0 && validation_fraction < 1.0) {
            return Err(EtaError::InvalidParameter {
                name: "validation_split".to_string(),
                value: validation_fraction.to_string(),
                reason: "must be strictly between 0 and 1".to_string(),
            });
        }

        let n_val = (n_samples as f64 * validation_fraction).ceil() as usize;
        if n_samples < 2 || n_val >= n_samples {
            return Err(EtaError::TrainingError(format!(
                "{} records cannot be split into non-empty training and validation sets",
                n_samples
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let train_indices = indices.split_off(n_val);
        Ok(Self {
            train_indices,
            validation_indices: indices,
        })
    }

    pub fn n_train(&self) -> usize {
        self.train_indices.len()
    }

    pub fn n_validation(&self) -> usize {
        self.validation_indices.len()
    }
}
