//! Delivery ETA - Delivery time regression
//!
//! This crate turns raw food-delivery records into a model-ready feature
//! table and trains a reproducible random forest on it:
//! - Tolerant feature derivation from heterogeneous raw columns
//! - Column-type aware preprocessing (scaling, one-hot encoding)
//! - Seeded holdout split, parallel forest fitting, validation metrics
//! - A single JSON artifact that reloads to identical predictions
//!
//! # Modules
//!
//! - [`features`] - Schema negotiation and feature derivation
//! - [`preprocessing`] - Standard scaling and one-hot encoding
//! - [`training`] - Trees, forest, split, metrics and the training pipeline
//! - [`export`] - Pipeline artifact persistence
//! - [`utils`] - Data loading
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core ML modules
pub mod features;
pub mod preprocessing;
pub mod training;

// Persistence and IO
pub mod export;
pub mod utils;

// Services
pub mod cli;

pub use error::{EtaError, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{EtaError, Result};
    pub use crate::export::PipelineArtifact;
    pub use crate::features::{FeatureBuilder, FeatureFrame, FeatureSchema, RealizedSchema, TARGET_COLUMN};
    pub use crate::preprocessing::ColumnTransformer;
    pub use crate::training::{FittedPipeline, RandomForestRegressor, TrainingConfig, TrainingPipeline, ValidationReport};
    pub use crate::utils::DataLoader;
}
