//! Column-type aware preprocessing: scaled numerics, one-hot categoricals

use super::encoder::OneHotEncoder;
use super::scaler::StandardScaler;
use crate::error::{EtaError, Result};
use crate::features::RealizedSchema;
use ndarray::{concatenate, Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Applies a standard scaler to the numeric columns and a one-hot encoder to
/// the categorical columns of a realized schema.
///
/// Only the schema's columns are ever read; everything else in the frame is
/// ignored. Output layout is the scaled numeric block followed by the
/// indicator block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnTransformer {
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    scaler: StandardScaler,
    encoder: OneHotEncoder,
    is_fitted: bool,
}

impl ColumnTransformer {
    /// Create an unfitted transformer for the given schema
    pub fn new(schema: &RealizedSchema) -> Self {
        Self {
            numeric_columns: schema.numeric.clone(),
            categorical_columns: schema.categorical.clone(),
            scaler: StandardScaler::new(),
            encoder: OneHotEncoder::new(),
            is_fitted: false,
        }
    }

    /// Fit scaling statistics and category lists on `df`
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let numeric: Vec<&str> = self.numeric_columns.iter().map(|s| s.as_str()).collect();
        let categorical: Vec<&str> = self.categorical_columns.iter().map(|s| s.as_str()).collect();

        self.scaler.fit(df, &numeric)?;
        self.encoder.fit(df, &categorical)?;
        self.is_fitted = true;

        debug!(
            numeric = self.scaler.n_features(),
            one_hot = self.encoder.n_features(),
            rows = df.height(),
            "column transformer fitted"
        );
        Ok(self)
    }

    /// Transform `df` into the model's input matrix
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(EtaError::ModelNotFitted);
        }

        let numeric = self.scaler.transform(df)?;
        let categorical = self.encoder.transform(df)?;
        Ok(concatenate(Axis(1), &[numeric.view(), categorical.view()])?)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Names of the output columns, in matrix order
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.numeric_columns.clone();
        names.extend(self.encoder.feature_names());
        names
    }

    pub fn n_output_features(&self) -> usize {
        self.scaler.n_features() + self.encoder.n_features()
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
