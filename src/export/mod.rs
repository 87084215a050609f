//! Pipeline export and serialization module
//!
//! A trained pipeline is persisted as one JSON artifact carrying the realized
//! schema, the fitted preprocessing state, the forest and training metadata.

mod artifact;

pub use artifact::{ArtifactMetadata, PipelineArtifact, ARTIFACT_FORMAT_VERSION};
