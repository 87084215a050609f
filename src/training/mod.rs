//! Model training module
//!
//! Provides the delivery-time training pipeline:
//! - Regression decision trees and a bagged random forest
//! - Seeded train/validation holdout split
//! - Validation metrics (MAE, RMSE, R²)
//! - The five-stage pipeline (assemble, split, fit, evaluate, persist)

mod config;
mod metrics;
mod pipeline;
mod split;
pub mod decision_tree;
pub mod random_forest;

pub use config::TrainingConfig;
pub use decision_tree::{DecisionTree, TreeNode};
pub use metrics::ValidationReport;
pub use pipeline::{FittedPipeline, TrainingOutcome, TrainingPipeline};
pub use random_forest::{MaxFeatures, RandomForestRegressor};
pub use split::HoldoutSplit;
