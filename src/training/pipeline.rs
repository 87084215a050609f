//! Training pipeline: assemble, split, fit, evaluate, persist

use super::config::TrainingConfig;
use super::metrics::ValidationReport;
use super::random_forest::RandomForestRegressor;
use super::split::HoldoutSplit;
use crate::error::{EtaError, Result};
use crate::export::PipelineArtifact;
use crate::features::{FeatureBuilder, FeatureFrame, FeatureSchema, RealizedSchema};
use crate::preprocessing::ColumnTransformer;
use ndarray::{Array1, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Fitted preprocessing plus model, reusable for inference.
///
/// Only the columns of `schema` are ever read from an input frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedPipeline {
    /// Schema raw records are derived against at inference
    #[serde(default)]
    feature_schema: FeatureSchema,
    schema: RealizedSchema,
    transformer: ColumnTransformer,
    model: RandomForestRegressor,
}

impl FittedPipeline {
    pub fn schema(&self) -> &RealizedSchema {
        &self.schema
    }

    pub fn feature_schema(&self) -> &FeatureSchema {
        &self.feature_schema
    }

    pub fn transformer(&self) -> &ColumnTransformer {
        &self.transformer
    }

    pub fn model(&self) -> &RandomForestRegressor {
        &self.model
    }

    /// Predict from a frame that carries the realized feature columns
    pub fn predict(&self, features: &DataFrame) -> Result<Array1<f64>> {
        let x = self.transformer.transform(features)?;
        self.model.predict(&x)
    }

    /// Predict from derived features, rejecting a schema that differs from training
    pub fn predict_frame(&self, frame: &FeatureFrame) -> Result<Array1<f64>> {
        if frame.schema != self.schema {
            return Err(EtaError::SchemaMismatch {
                expected: self.schema.to_string(),
                actual: frame.schema.to_string(),
            });
        }
        self.predict(&frame.features)
    }

    /// Derive features from raw records with the training schema, then predict
    pub fn predict_raw(&self, raw: &DataFrame) -> Result<Array1<f64>> {
        let frame = FeatureBuilder::with_schema(self.feature_schema.clone()).derive(raw)?;
        self.predict_frame(&frame)
    }

    /// Expanded feature names paired with normalized importances, highest first
    pub fn feature_importances(&self) -> Vec<(String, f64)> {
        let Some(importances) = self.model.feature_importances() else {
            return Vec::new();
        };
        let mut ranked: Vec<(String, f64)> = self
            .transformer
            .feature_names()
            .into_iter()
            .zip(importances.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

/// Result of a training run
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub pipeline: FittedPipeline,
    pub metrics: ValidationReport,
    pub n_train: usize,
    pub n_validation: usize,
    pub training_time_secs: f64,
}

/// Trains a scaled/one-hot + random forest pipeline on derived features
#[derive(Debug, Clone, Default)]
pub struct TrainingPipeline {
    config: TrainingConfig,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train on the output of [`FeatureBuilder::derive`]
    pub fn train(&self, frame: &FeatureFrame) -> Result<TrainingOutcome> {
        let target = frame.require_target(&frame.source_schema.target)?;
        self.fit(&frame.features, target, &frame.schema, &frame.source_schema)
    }

    /// Train and write the artifact to `path`
    ///
    /// The parent directory of `path` must already exist.
    pub fn run(&self, frame: &FeatureFrame, path: impl AsRef<Path>) -> Result<TrainingOutcome> {
        let outcome = self.train(frame)?;
        let artifact = PipelineArtifact::from_outcome(&outcome, &self.config);
        artifact.save(path.as_ref())?;
        info!(path = %path.as_ref().display(), "pipeline saved");
        Ok(outcome)
    }

    /// Train on explicit features, target and realized schema.
    ///
    /// Raw inference input is derived against the canonical schema.
    pub fn train_on(
        &self,
        features: &DataFrame,
        target: &Array1<f64>,
        schema: &RealizedSchema,
    ) -> Result<TrainingOutcome> {
        self.fit(features, target, schema, &FeatureSchema::canonical())
    }

    fn fit(
        &self,
        features: &DataFrame,
        target: &Array1<f64>,
        schema: &RealizedSchema,
        feature_schema: &FeatureSchema,
    ) -> Result<TrainingOutcome> {
        self.config.validate()?;
        let start = Instant::now();

        if schema.is_empty() {
            return Err(EtaError::TrainingError(
                "no numeric or categorical feature columns were realized".to_string(),
            ));
        }
        if features.height() != target.len() {
            return Err(EtaError::ShapeError {
                expected: format!("{} target values", features.height()),
                actual: format!("{} target values", target.len()),
            });
        }
        let n_missing = target.iter().filter(|v| !v.is_finite()).count();
        if n_missing > 0 {
            return Err(EtaError::ValidationError(format!(
                "target column '{}' has {} missing or non-numeric values",
                feature_schema.target, n_missing
            )));
        }

        // Assemble
        let mut transformer = ColumnTransformer::new(schema);

        // Split
        let split = HoldoutSplit::new(
            target.len(),
            self.config.validation_split,
            self.config.random_seed,
        )?;
        info!(
            train = split.n_train(),
            validation = split.n_validation(),
            seed = self.config.random_seed,
            "split records"
        );
        let train_df = take_rows(features, &split.train_indices)?;
        let val_df = take_rows(features, &split.validation_indices)?;
        let y_train = target.select(Axis(0), &split.train_indices);
        let y_val = target.select(Axis(0), &split.validation_indices);

        // Fit
        let x_train = transformer.fit_transform(&train_df)?;
        let x_val = transformer.transform(&val_df)?;
        debug!(features = x_train.ncols(), "preprocessing fitted on training split");

        let mut model = RandomForestRegressor::new(self.config.n_estimators)
            .with_max_depth(self.config.max_depth)
            .with_min_samples_split(self.config.min_samples_split)
            .with_min_samples_leaf(self.config.min_samples_leaf)
            .with_max_features(self.config.max_features)
            .with_random_state(self.config.random_seed);

        // Evaluate
        let predictions = self.in_pool(|| {
            model.fit(&x_train, &y_train)?;
            model.predict(&x_val)
        })?;
        let metrics = ValidationReport::compute(&y_val, &predictions);

        let training_time_secs = start.elapsed().as_secs_f64();
        info!(
            trees = model.n_trees(),
            mae = metrics.mae,
            rmse = metrics.rmse,
            r2 = metrics.r2,
            secs = training_time_secs,
            "validation complete"
        );

        Ok(TrainingOutcome {
            pipeline: FittedPipeline {
                feature_schema: feature_schema.clone(),
                schema: schema.clone(),
                transformer,
                model,
            },
            metrics,
            n_train: split.n_train(),
            n_validation: split.n_validation(),
            training_time_secs,
        })
    }

    /// Run `f` inside a dedicated pool when `n_jobs` is set
    fn in_pool<T, F>(&self, f: F) -> Result<T>
    where
        T: Send,
        F: FnOnce() -> Result<T> + Send,
    {
        match self.config.n_jobs {
            Some(n_jobs) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n_jobs)
                    .build()
                    .map_err(|e| EtaError::TrainingError(format!("Thread pool error: {}", e)))?;
                pool.install(f)
            }
            None => f(),
        }
    }
}

fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx = IdxCa::from_vec(
        "idx".into(),
        indices.iter().map(|&i| i as IdxSize).collect(),
    );
    Ok(df.take(&idx)?)
}
