//! One-hot encoding for categorical feature columns

use crate::error::{EtaError, Result};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Known categories of one fitted column, sorted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnCategories {
    pub column: String,
    pub categories: Vec<String>,
}

/// One-hot encoder; categories unseen during fit encode as all zeros.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    columns: Vec<ColumnCategories>,
    is_fitted: bool,
}

impl OneHotEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the encoder to the given columns, in order
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.columns = columns
            .iter()
            .map(|col_name| {
                let categories: BTreeSet<String> = column_strings(df, col_name)?
                    .into_iter()
                    .flatten()
                    .collect();
                Ok(ColumnCategories {
                    column: col_name.to_string(),
                    categories: categories.into_iter().collect(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.is_fitted = true;
        Ok(self)
    }

    /// Encode the fitted columns into a dense indicator block
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(EtaError::ModelNotFitted);
        }

        let n_rows = df.height();
        let mut out = Array2::zeros((n_rows, self.n_features()));
        let mut offset = 0;

        for fitted in &self.columns {
            let index: HashMap<&str, usize> = fitted
                .categories
                .iter()
                .enumerate()
                .map(|(i, c)| (c.as_str(), i))
                .collect();

            for (i, value) in column_strings(df, &fitted.column)?.iter().enumerate() {
                if let Some(&k) = value.as_deref().and_then(|v| index.get(v)) {
                    out[[i, offset + k]] = 1.0;
                }
            }
            offset += fitted.categories.len();
        }

        Ok(out)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<Array2<f64>> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Output names as `<column>_<category>`
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|fitted| {
                fitted
                    .categories
                    .iter()
                    .map(move |c| format!("{}_{}", fitted.column, c))
            })
            .collect()
    }

    pub fn categories(&self) -> &[ColumnCategories] {
        &self.columns
    }

    pub fn n_features(&self) -> usize {
        self.columns.iter().map(|c| c.categories.len()).sum()
    }
}

fn column_strings(df: &DataFrame, col_name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(col_name)
        .map_err(|_| EtaError::FeatureNotFound(col_name.to_string()))?;
    let casted = column
        .as_materialized_series()
        .cast(&DataType::String)
        .map_err(|e| EtaError::PreprocessingError(e.to_string()))?;
    let values = casted
        .str()
        .map_err(|e| EtaError::PreprocessingError(e.to_string()))?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_onehot_sorted_categories() {
        let df = df!("city" => &["urban", "metropolitian", "urban"]).unwrap();

        let mut encoder = OneHotEncoder::new();
        let out = encoder.fit_transform(&df, &["city"]).unwrap();

        assert_eq!(encoder.feature_names(), vec!["city_metropolitian", "city_urban"]);
        assert_eq!(out.row(0).to_vec(), vec![0.0, 1.0]);
        assert_eq!(out.row(1).to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_unknown_category_is_all_zero() {
        let train = df!("city" => &["urban", "semi-urban"]).unwrap();
        let test = df!("city" => &["rural"]).unwrap();

        let mut encoder = OneHotEncoder::new();
        encoder.fit(&train, &["city"]).unwrap();
        let out = encoder.transform(&test).unwrap();

        assert_eq!(out.shape(), &[1, 2]);
        assert!(out.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_multiple_columns_offsets() {
        let df = df!(
            "city" => &["a", "b"],
            "festival" => &["no", "yes"],
        )
        .unwrap();

        let mut encoder = OneHotEncoder::new();
        let out = encoder.fit_transform(&df, &["city", "festival"]).unwrap();

        assert_eq!(encoder.n_features(), 4);
        assert_eq!(out.row(1).to_vec(), vec![0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_missing_column() {
        let df = df!("city" => &["a"]).unwrap();
        let mut encoder = OneHotEncoder::new();
        assert!(matches!(
            encoder.fit(&df, &["festival"]),
            Err(EtaError::FeatureNotFound(_))
        ));
    }
}
