//! Delivery ETA CLI Module
//!
//! Command-line interface for training, prediction, and schema inspection.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::export::PipelineArtifact;
use crate::features::{FeatureBuilder, FeatureFrame, TARGET_COLUMN};
use crate::training::{TrainingConfig, TrainingPipeline};
use crate::utils::{DataLoader, DataSaver};

/// Default artifact location for `train`
pub const DEFAULT_MODEL_PATH: &str = "artifacts/model.json";

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
    let _ = std::io::stdout().flush();
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "delivery-eta")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Delivery time feature derivation and random forest training")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train a pipeline and report validation metrics
    Train {
        /// Input records (CSV/TSV with header)
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the fitted pipeline
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// JSON training configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Random seed for the split and the forest
        #[arg(long)]
        seed: Option<u64>,

        /// Number of trees
        #[arg(long)]
        n_estimators: Option<usize>,

        /// Worker threads for tree construction
        #[arg(long)]
        n_jobs: Option<usize>,

        /// Fraction of records held out for validation
        #[arg(long)]
        validation_split: Option<f64>,
    },

    /// Predict delivery times with a saved pipeline
    Predict {
        /// Pipeline artifact written by `train`
        #[arg(short, long)]
        model: PathBuf,

        /// Input records
        #[arg(short, long)]
        input: PathBuf,

        /// Write the input with an added `prediction` column
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the realized feature schema of an input file
    Schema {
        /// Input records
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// Training flags that override the configuration file
#[derive(Debug, Clone, Default)]
pub struct TrainOverrides {
    pub seed: Option<u64>,
    pub n_estimators: Option<usize>,
    pub n_jobs: Option<usize>,
    pub validation_split: Option<f64>,
}

impl TrainOverrides {
    /// Layer the flags over `base`
    pub fn apply(&self, mut base: TrainingConfig) -> TrainingConfig {
        if let Some(seed) = self.seed {
            base.random_seed = seed;
        }
        if let Some(n) = self.n_estimators {
            base.n_estimators = n;
        }
        if let Some(n) = self.n_jobs {
            base.n_jobs = Some(n);
        }
        if let Some(split) = self.validation_split {
            base.validation_split = split;
        }
        base
    }
}

// ─── Data loading ──────────────────────────────────────────────────────────────

pub fn load_data(path: &Path) -> anyhow::Result<DataFrame> {
    DataLoader::new()
        .load_auto(path)
        .with_context(|| format!("failed to load {}", path.display()))
}

fn derive_features(df: &DataFrame) -> anyhow::Result<FeatureFrame> {
    step_run("Deriving features");
    let start = Instant::now();
    let frame = FeatureBuilder::new().derive(df)?;
    step_done(&format!(
        "{} numeric, {} categorical in {:?}",
        frame.numeric_columns().len(),
        frame.categorical_columns().len(),
        start.elapsed()
    ));
    Ok(frame)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(
    data_path: &Path,
    model_path: &Path,
    config_path: Option<&Path>,
    overrides: &TrainOverrides,
) -> anyhow::Result<()> {
    section("Train");

    let base = match config_path {
        Some(path) => TrainingConfig::from_json_file(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => TrainingConfig::default(),
    };
    let config = overrides.apply(base);
    config.validate()?;

    step_run("Loading data");
    let start = Instant::now();
    let df = load_data(data_path)?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    if df.column(TARGET_COLUMN).is_err() {
        anyhow::bail!(
            "{} has no target column '{}'; cannot train",
            data_path.display(),
            TARGET_COLUMN
        );
    }

    let frame = derive_features(&df)?;

    if let Some(parent) = model_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    step_run(&format!("Training {} trees", config.n_estimators.to_string().cyan()));
    let outcome = TrainingPipeline::new(config).run(&frame, model_path)?;
    step_done(&format!(
        "{} train / {} validation in {:.2}s",
        outcome.n_train, outcome.n_validation, outcome.training_time_secs
    ));

    println!();
    println!("Validation -> {}", outcome.metrics);
    println!("Saved pipeline to {}", model_path.display());
    println!();

    Ok(())
}

pub fn cmd_predict(
    model_path: &Path,
    data_path: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    section("Predict");

    step_run("Loading pipeline");
    let artifact = PipelineArtifact::load(model_path)
        .with_context(|| format!("failed to load pipeline {}", model_path.display()))?;
    step_done(&format!("trained {}", artifact.metadata.trained_at));
    let pipeline = artifact.into_pipeline();

    let df = load_data(data_path)?;
    let frame = derive_features(&df)?;

    step_run("Predicting");
    let start = Instant::now();
    let predictions = pipeline.predict_frame(&frame)?;
    step_done(&format!("{} rows in {:?}", predictions.len(), start.elapsed()));

    if !predictions.is_empty() {
        let min = predictions.iter().copied().fold(f64::INFINITY, f64::min);
        let max = predictions.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = predictions.sum() / predictions.len() as f64;

        println!();
        println!("  {:<16} {}", muted("Rows"), predictions.len().to_string().white());
        println!("  {:<16} {}", muted("Mean (min)"), format!("{:.3}", mean).white().bold());
        println!("  {:<16} {}", muted("Range (min)"), format!("{:.3} – {:.3}", min, max).white());
    }

    if let Some(out_path) = output {
        let mut out_df = df.clone();
        out_df.with_column(Series::new("prediction".into(), predictions.to_vec()))?;
        DataSaver::save_csv(&mut out_df, out_path)?;
        step_ok(&format!("Predictions written to {}", out_path.display()));
    }
    println!();

    Ok(())
}

pub fn cmd_schema(data_path: &Path) -> anyhow::Result<()> {
    section("Schema");

    let df = load_data(data_path)?;
    let frame = derive_features(&df)?;

    println!();
    println!("  {:<16} {}", muted("Records"), frame.n_records());
    println!("  {:<16} v{}", muted("Version"), frame.schema.version);
    println!("  {:<16} {}", muted("Numeric"), frame.numeric_columns().join(", "));
    println!("  {:<16} {}", muted("Categorical"), frame.categorical_columns().join(", "));
    println!("  {:<16} {}", muted("Order time"), frame.report.order_time);
    println!("  {:<16} {}", muted("Time to pick"), frame.report.time_to_pick);
    let target = if frame.target.is_some() { "present".green() } else { "absent".yellow() };
    println!("  {:<16} {} ({})", muted("Target"), TARGET_COLUMN, target);
    println!();

    Ok(())
}
