//! Feature derivation module
//!
//! Turns heterogeneous raw delivery records into the canonical feature
//! representation:
//! - Order hour / day-of-week from combined or split timestamp fields
//! - Minutes from order to pickup
//! - Categorical normalization (trimmed, lowercase)
//! - Numeric coercion with per-record missing values
//! - Realization of the data-dependent schema

mod builder;
pub mod schema;
pub mod timestamp;

pub use builder::{normalize_category, DerivationReport, DerivationSource, FeatureBuilder, FeatureFrame};
pub use schema::{FeatureSchema, RealizedSchema, CATEGORICAL_FIELDS, NUMERIC_FIELDS, SCHEMA_VERSION, TARGET_COLUMN};
pub use timestamp::{parse_timestamp, parse_timestamps, resolve_convention, DateConvention};
