//! Error types for delivery-time feature derivation and training

use thiserror::Error;

/// Result type alias for delivery-eta operations
pub type Result<T> = std::result::Result<T, EtaError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum EtaError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Target column '{0}' is not present in the input")]
    MissingTarget(String),

    #[error("Schema mismatch: pipeline was trained on {expected}, input realizes {actual}")]
    SchemaMismatch { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<polars::error::PolarsError> for EtaError {
    fn from(err: polars::error::PolarsError) -> Self {
        EtaError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for EtaError {
    fn from(err: serde_json::Error) -> Self {
        EtaError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for EtaError {
    fn from(err: ndarray::ShapeError) -> Self {
        EtaError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
