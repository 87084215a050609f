//! Standard (z-score) scaling for numeric feature columns

use crate::error::{EtaError, Result};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Parameters for one fitted column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub column: String,
    /// Training mean; also the imputation value for missing entries
    pub center: f64,
    /// Population standard deviation, 1.0 when degenerate
    pub scale: f64,
    /// Non-missing values seen during fit
    pub n_observed: usize,
}

/// Zero-mean / unit-variance scaler.
///
/// Statistics ignore missing values; at transform time a missing value is
/// replaced by the training mean, i.e. becomes 0 after scaling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl StandardScaler {
    /// Create a new scaler
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the scaler to the given columns, in order
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.params = columns
            .iter()
            .map(|col_name| {
                let values = column_values(df, col_name)?;
                Ok(compute_params(col_name, &values))
            })
            .collect::<Result<Vec<_>>>()?;

        self.is_fitted = true;
        Ok(self)
    }

    /// Scale the fitted columns into a dense `(rows, columns)` block
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(EtaError::ModelNotFitted);
        }

        let n_rows = df.height();
        let mut out = Array2::zeros((n_rows, self.params.len()));

        for (j, params) in self.params.iter().enumerate() {
            let values = column_values(df, &params.column)?;
            for (i, value) in values.into_iter().enumerate() {
                out[[i, j]] = match value {
                    Some(v) => (v - params.center) / params.scale,
                    None => 0.0,
                };
            }
        }

        Ok(out)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<Array2<f64>> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    pub fn params(&self) -> &[ScalerParams] {
        &self.params
    }

    pub fn n_features(&self) -> usize {
        self.params.len()
    }
}

fn compute_params(column: &str, values: &[Option<f64>]) -> ScalerParams {
    let observed: Vec<f64> = values.iter().flatten().copied().collect();
    let n = observed.len();

    if n == 0 {
        return ScalerParams {
            column: column.to_string(),
            center: 0.0,
            scale: 1.0,
            n_observed: 0,
        };
    }

    let mean = observed.iter().sum::<f64>() / n as f64;
    let variance = observed.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    let std = variance.sqrt();

    ScalerParams {
        column: column.to_string(),
        center: mean,
        scale: if std > 0.0 && std.is_finite() { std } else { 1.0 },
        n_observed: n,
    }
}

/// Column as f64 values, treating nulls and NaN as missing
fn column_values(df: &DataFrame, col_name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(col_name)
        .map_err(|_| EtaError::FeatureNotFound(col_name.to_string()))?;
    let casted = column
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|e| EtaError::PreprocessingError(e.to_string()))?;
    let values = casted
        .f64()
        .map_err(|e| EtaError::PreprocessingError(e.to_string()))?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}
