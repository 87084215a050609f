//! Feature derivation from raw delivery records

use super::schema::{raw, FeatureSchema, RealizedSchema, COERCED_NUMERIC_FIELDS};
use super::timestamp::{minutes_between, parse_timestamps, DateConvention};
use crate::error::{EtaError, Result};
use chrono::{Datelike, NaiveDateTime, Timelike};
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// String form given to a missing categorical cell
const MISSING_CATEGORY: &str = "nan";

/// Which input path produced a derived field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DerivationSource {
    /// The field was already present in the raw input
    Existing,
    /// Parsed from a single combined datetime column
    CombinedDatetime,
    /// Rebuilt from separate date and time columns
    SplitDateTime,
    /// No source columns; the field is defaulted and left out of the schema
    Unavailable,
}

impl fmt::Display for DerivationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DerivationSource::Existing => "existing column",
            DerivationSource::CombinedDatetime => "combined datetime",
            DerivationSource::SplitDateTime => "split date + time",
            DerivationSource::Unavailable => "unavailable",
        };
        f.write_str(s)
    }
}

/// Record of how each derived field was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationReport {
    /// Source of `order_hour` / `order_dow`
    pub order_time: DerivationSource,
    /// Source of `time_to_pick_min`
    pub time_to_pick: DerivationSource,
}

impl DerivationReport {
    /// Whether `column` is a derived field with no source in the input
    pub fn is_unavailable(&self, column: &str) -> bool {
        match column {
            raw::ORDER_HOUR | raw::ORDER_DOW => self.order_time == DerivationSource::Unavailable,
            raw::TIME_TO_PICK_MIN => self.time_to_pick == DerivationSource::Unavailable,
            _ => false,
        }
    }
}

/// Output of feature derivation
#[derive(Debug, Clone)]
pub struct FeatureFrame {
    /// Realized feature columns only, numeric (Float64) then categorical (String)
    pub features: DataFrame,
    /// Target values if the input carried the target column; missing values are NaN
    pub target: Option<Array1<f64>>,
    /// Columns realized from the canonical schema
    pub schema: RealizedSchema,
    /// The full working frame: raw columns plus every derived/normalized field
    pub derived: DataFrame,
    pub report: DerivationReport,
    /// Schema the builder derived against
    pub source_schema: FeatureSchema,
    n_records: usize,
}

impl FeatureFrame {
    pub fn numeric_columns(&self) -> &[String] {
        &self.schema.numeric
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.schema.categorical
    }

    /// Number of input records; also valid when no feature column was realized
    pub fn n_records(&self) -> usize {
        self.n_records
    }

    /// The target, or `MissingTarget` when the input had none
    pub fn require_target(&self, target_column: &str) -> Result<&Array1<f64>> {
        self.target
            .as_ref()
            .ok_or_else(|| EtaError::MissingTarget(target_column.to_string()))
    }
}

/// Derives the canonical feature representation from raw records.
///
/// Every step tolerates absent optional columns; per-record parse failures
/// become missing values for that record only.
#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder {
    schema: FeatureSchema,
}

impl FeatureBuilder {
    /// Create a builder over the canonical schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder over a custom schema
    pub fn with_schema(schema: FeatureSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Derive features, target and realized schema from a raw record set
    pub fn derive(&self, raw_df: &DataFrame) -> Result<FeatureFrame> {
        let n_records = raw_df.height();
        let mut df = raw_df.clone();

        let order_time = derive_order_time(&mut df)?;
        let time_to_pick = derive_time_to_pick(&mut df)?;
        let report = DerivationReport { order_time, time_to_pick };
        debug!(order_time = %report.order_time, time_to_pick = %report.time_to_pick, "derived time features");

        self.normalize_categoricals(&mut df)?;
        coerce_numeric_fields(&mut df)?;

        let schema = self
            .schema
            .realize(|c| has_column(&df, c) && !report.is_unavailable(c));

        let mut columns: Vec<Column> = Vec::with_capacity(schema.len());
        for name in &schema.numeric {
            columns.push(Series::new(name.as_str().into(), numeric_values(&df, name)?).into());
        }
        for name in &schema.categorical {
            columns.push(df.column(name)?.clone());
        }
        let features = DataFrame::new(columns)?;

        let target = if has_column(&df, &self.schema.target) {
            let values: Vec<f64> = numeric_values(&df, &self.schema.target)?
                .into_iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect();
            Some(Array1::from_vec(values))
        } else {
            None
        };

        info!(
            records = n_records,
            schema = %schema,
            has_target = target.is_some(),
            "feature derivation complete"
        );

        Ok(FeatureFrame {
            features,
            target,
            schema,
            derived: df,
            report,
            source_schema: self.schema.clone(),
            n_records,
        })
    }

    /// Trim and lowercase every present categorical field
    fn normalize_categoricals(&self, df: &mut DataFrame) -> Result<()> {
        for name in &self.schema.categorical {
            if !has_column(df, name) {
                continue;
            }
            let normalized: Vec<String> = string_values(df, name)?
                .into_iter()
                .map(|v| normalize_category(v.as_deref().unwrap_or(MISSING_CATEGORY)))
                .collect();
            df.with_column(Series::new(name.as_str().into(), normalized))?;
        }
        Ok(())
    }
}

/// Normalize a categorical value: trimmed and lowercased. Idempotent.
pub fn normalize_category(value: &str) -> String {
    value.trim().to_lowercase()
}

fn derive_order_time(df: &mut DataFrame) -> Result<DerivationSource> {
    let n = df.height();

    if has_column(df, raw::ORDER_HOUR) {
        if !has_column(df, raw::ORDER_DOW) {
            df.with_column(Series::new(raw::ORDER_DOW.into(), vec![0.0f64; n]))?;
        }
        return Ok(DerivationSource::Existing);
    }

    let (source, stamps): (DerivationSource, Vec<Option<NaiveDateTime>>) =
        if has_column(df, raw::DATETIME_ORDER) {
            let stamps = parse_column(df, raw::DATETIME_ORDER, DateConvention::DayFirst)?;
            (DerivationSource::CombinedDatetime, stamps)
        } else if has_column(df, raw::ORDER_DATE) && has_column(df, raw::TIME_ORDERED) {
            let joined = joined_values(df, raw::ORDER_DATE, raw::TIME_ORDERED)?;
            let stamps = parse_timestamps(&joined, DateConvention::MonthFirst);
            (DerivationSource::SplitDateTime, stamps)
        } else {
            (DerivationSource::Unavailable, vec![None; n])
        };

    // Missing timestamps fall back to hour 0 / Monday
    let hours: Vec<f64> = stamps
        .iter()
        .map(|ts| ts.map_or(0.0, |t| t.hour() as f64))
        .collect();
    let dows: Vec<f64> = stamps
        .iter()
        .map(|ts| ts.map_or(0.0, |t| t.weekday().num_days_from_monday() as f64))
        .collect();

    let unparsed = stamps.iter().filter(|ts| ts.is_none()).count();
    if source != DerivationSource::Unavailable && unparsed > 0 {
        debug!(unparsed, "order timestamps missing or unparseable, defaulted to 0");
    }

    df.with_column(Series::new(raw::ORDER_HOUR.into(), hours))?;
    df.with_column(Series::new(raw::ORDER_DOW.into(), dows))?;
    Ok(source)
}

fn derive_time_to_pick(df: &mut DataFrame) -> Result<DerivationSource> {
    let n = df.height();

    if has_column(df, raw::TIME_TO_PICK_MIN) {
        return Ok(DerivationSource::Existing);
    }

    let (source, minutes): (DerivationSource, Vec<Option<f64>>) =
        if has_column(df, raw::DATETIME_ORDER) && has_column(df, raw::DATETIME_PICKED) {
            let ordered = parse_column(df, raw::DATETIME_ORDER, DateConvention::DayFirst)?;
            let picked = parse_column(df, raw::DATETIME_PICKED, DateConvention::DayFirst)?;
            (DerivationSource::CombinedDatetime, pairwise_minutes(&ordered, &picked))
        } else if has_column(df, raw::TIME_ORDERED)
            && has_column(df, raw::TIME_PICKED)
            && has_column(df, raw::ORDER_DATE)
        {
            let ordered = parse_timestamps(
                &joined_values(df, raw::ORDER_DATE, raw::TIME_ORDERED)?,
                DateConvention::DayFirst,
            );
            let picked = parse_timestamps(
                &joined_values(df, raw::ORDER_DATE, raw::TIME_PICKED)?,
                DateConvention::DayFirst,
            );
            (DerivationSource::SplitDateTime, pairwise_minutes(&ordered, &picked))
        } else {
            (DerivationSource::Unavailable, vec![None; n])
        };

    df.with_column(Series::new(raw::TIME_TO_PICK_MIN.into(), minutes))?;
    Ok(source)
}

fn pairwise_minutes(
    ordered: &[Option<NaiveDateTime>],
    picked: &[Option<NaiveDateTime>],
) -> Vec<Option<f64>> {
    ordered
        .iter()
        .zip(picked.iter())
        .map(|(o, p)| minutes_between(*o, *p))
        .collect()
}

fn coerce_numeric_fields(df: &mut DataFrame) -> Result<()> {
    for name in COERCED_NUMERIC_FIELDS {
        if !has_column(df, name) {
            continue;
        }
        let values = numeric_values(df, name)?;
        df.with_column(Series::new(name.into(), values))?;
    }
    Ok(())
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

fn get_series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| EtaError::FeatureNotFound(name.to_string()))
}

/// Column values in string form; nulls stay `None`
fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let casted = get_series(df, name)?.cast(&DataType::String)?;
    let values = casted
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect();
    Ok(values)
}

/// Column values coerced to f64; anything unparseable or non-finite is `None`
fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = get_series(df, name)?;
    let values: Vec<Option<f64>> = if series.dtype() == &DataType::String {
        series
            .str()?
            .into_iter()
            .map(|v| v.and_then(|s| s.trim().parse::<f64>().ok()))
            .collect()
    } else {
        let casted = series.cast(&DataType::Float64)?;
        casted.f64()?.into_iter().collect()
    };
    Ok(values
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect())
}

/// Row-wise `"<left> <right>"`, with missing cells rendered as `nan`
fn joined_values(df: &DataFrame, left: &str, right: &str) -> Result<Vec<Option<String>>> {
    let left = string_values(df, left)?;
    let right = string_values(df, right)?;
    Ok(left
        .into_iter()
        .zip(right)
        .map(|(l, r)| {
            Some(format!(
                "{} {}",
                l.as_deref().unwrap_or(MISSING_CATEGORY),
                r.as_deref().unwrap_or(MISSING_CATEGORY)
            ))
        })
        .collect())
}

fn parse_column(
    df: &DataFrame,
    name: &str,
    convention: DateConvention,
) -> Result<Vec<Option<NaiveDateTime>>> {
    Ok(parse_timestamps(&string_values(df, name)?, convention))
}
