//! Data preprocessing module
//!
//! Fit-once, reuse-at-inference transforms over a realized feature schema:
//! - Standard scaling for numeric columns (training-split statistics only)
//! - One-hot encoding for categorical columns, unseen categories as all-zero
//! - A column transformer combining both into the model's input matrix

mod encoder;
mod scaler;
mod transformer;

pub use encoder::{ColumnCategories, OneHotEncoder};
pub use scaler::{ScalerParams, StandardScaler};
pub use transformer::ColumnTransformer;
