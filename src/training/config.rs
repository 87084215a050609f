//! Training configuration

use super::random_forest::MaxFeatures;
use crate::error::{EtaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for pipeline training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of trees in the forest
    pub n_estimators: usize,

    /// Seed for the train/validation split and the forest
    pub random_seed: u64,

    /// Fraction of records held out for validation
    pub validation_split: f64,

    /// Maximum tree depth (None = grow until pure)
    pub max_depth: Option<usize>,

    pub min_samples_split: usize,

    pub min_samples_leaf: usize,

    /// Features considered per split
    pub max_features: MaxFeatures,

    /// Worker threads for tree construction (None = rayon global pool)
    pub n_jobs: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 300,
            random_seed: 42,
            validation_split: 0.2,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            n_jobs: None,
        }
    }
}

impl TrainingConfig {
    /// Create a new training configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a (possibly partial) JSON configuration; absent keys keep defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        Ok(config)
    }

    /// Builder method to set the number of trees
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    /// Builder method to set the random seed
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Builder method to set the validation fraction
    pub fn with_validation_split(mut self, fraction: f64) -> Self {
        self.validation_split = fraction;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_min_samples_split(mut self, n: usize) -> Self {
        self.min_samples_split = n;
        self
    }

    pub fn with_min_samples_leaf(mut self, n: usize) -> Self {
        self.min_samples_leaf = n;
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Builder method to set the number of worker threads
    pub fn with_n_jobs(mut self, n: usize) -> Self {
        self.n_jobs = Some(n);
        self
    }

    /// Reject out-of-range values before any work is done
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(invalid("n_estimators", self.n_estimators, "must be at least 1"));
        }
        if !(self.validation_split > 0.0 && self.validation_split < 1.0) {
            return Err(invalid(
                "validation_split",
                self.validation_split,
                "must be strictly between 0 and 1",
            ));
        }
        if self.min_samples_split < 2 {
            return Err(invalid("min_samples_split", self.min_samples_split, "must be at least 2"));
        }
        if self.min_samples_leaf == 0 {
            return Err(invalid("min_samples_leaf", self.min_samples_leaf, "must be at least 1"));
        }
        if self.max_depth == Some(0) {
            return Err(invalid("max_depth", 0, "must be at least 1 when set"));
        }
        if self.n_jobs == Some(0) {
            return Err(invalid("n_jobs", 0, "must be at least 1 when set"));
        }
        match self.max_features {
            MaxFeatures::Fraction(f) if !(f > 0.0 && f <= 1.0) => {
                return Err(invalid("max_features", f, "fraction must be in (0, 1]"));
            }
            MaxFeatures::Fixed(0) => {
                return Err(invalid("max_features", 0, "must be at least 1"));
            }
            _ => {}
        }
        Ok(())
    }
}

fn invalid(name: &str, value: impl ToString, reason: &str) -> EtaError {
    EtaError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = TrainingConfig::default();
        assert_eq!(config.n_estimators, 300);
        assert_eq!(config.random_seed, 42);
        assert_eq!(config.validation_split, 0.2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = TrainingConfig::new()
            .with_n_estimators(50)
            .with_random_seed(7)
            .with_n_jobs(2);

        assert_eq!(config.n_estimators, 50);
        assert_eq!(config.random_seed, 7);
        assert_eq!(config.n_jobs, Some(2));
    }

    #[test]
    fn test_validate_rejects_bad_split() {
        for split in [0.0, 1.0, -0.5, f64::NAN] {
            let config = TrainingConfig::new().with_validation_split(split);
            assert!(matches!(
                config.validate(),
                Err(EtaError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_validate_rejects_zero_trees() {
        let config = TrainingConfig::new().with_n_estimators(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"n_estimators": 25, "max_depth": 8}}"#).unwrap();

        let config = TrainingConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.n_estimators, 25);
        assert_eq!(config.max_depth, Some(8));
        assert_eq!(config.random_seed, 42);
        assert_eq!(config.validation_split, 0.2);
    }
}
