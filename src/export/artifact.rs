//! Pipeline artifact: fitted pipeline plus training metadata, stored as JSON

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{EtaError, Result};
use crate::training::{FittedPipeline, TrainingConfig, TrainingOutcome, ValidationReport};

/// Current on-disk format version
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Provenance recorded alongside the fitted pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Version of the crate that wrote the artifact
    pub crate_version: String,
    /// RFC 3339 timestamp of the training run
    pub trained_at: String,
    pub config: TrainingConfig,
    pub metrics: ValidationReport,
    pub n_train: usize,
    pub n_validation: usize,
}

/// Versioned, self-describing pipeline artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub format_version: u32,
    pub metadata: ArtifactMetadata,
    pub pipeline: FittedPipeline,
}

impl PipelineArtifact {
    /// Wrap a training outcome
    pub fn from_outcome(outcome: &TrainingOutcome, config: &TrainingConfig) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            metadata: ArtifactMetadata {
                crate_version: env!("CARGO_PKG_VERSION").to_string(),
                trained_at: chrono::Utc::now().to_rfc3339(),
                config: config.clone(),
                metrics: outcome.metrics,
                n_train: outcome.n_train,
                n_validation: outcome.n_validation,
            },
            pipeline: outcome.pipeline.clone(),
        }
    }

    /// Write the artifact; a sibling temp file is renamed into place once complete
    pub fn save(&self, path: &Path) -> Result<()> {
        let tmp_path = temp_sibling(path);

        let written = File::create(&tmp_path)
            .map_err(EtaError::from)
            .and_then(|file| {
                let mut writer = BufWriter::new(file);
                serde_json::to_writer(&mut writer, self)?;
                writer.flush()?;
                Ok(())
            })
            .and_then(|_| fs::rename(&tmp_path, path).map_err(EtaError::from));

        if written.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        written
    }

    /// Read an artifact, rejecting unknown format versions
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let artifact: Self = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            EtaError::SerializationError(format!(
                "Failed to read artifact {}: {}",
                path.display(),
                e
            ))
        })?;

        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(EtaError::ValidationError(format!(
                "Unsupported artifact format version {} (expected {})",
                artifact.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }
        Ok(artifact)
    }

    pub fn into_pipeline(self) -> FittedPipeline {
        self.pipeline
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
