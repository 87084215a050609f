//! Canonical feature schema shared by derivation and training

use serde::{Deserialize, Serialize};
use std::fmt;

/// Version of the canonical field lists below. Bump when either list changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Name of the regression target column
pub const TARGET_COLUMN: &str = "time_taken_min_clean";

/// Numeric feature fields, in canonical order
pub const NUMERIC_FIELDS: [&str; 7] = [
    "dist_km",
    "delivery_person_age",
    "delivery_person_ratings",
    "multiple_deliveries",
    "time_to_pick_min",
    "order_hour",
    "order_dow",
];

/// Categorical feature fields, in canonical order
pub const CATEGORICAL_FIELDS: [&str; 6] = [
    "city",
    "road_traffic_density",
    "weather_conditions",
    "type_of_order",
    "type_of_vehicle",
    "festival",
];

/// Raw numeric columns that are coerced from arbitrary input values
pub const COERCED_NUMERIC_FIELDS: [&str; 4] = [
    "delivery_person_age",
    "delivery_person_ratings",
    "multiple_deliveries",
    "dist_km",
];

/// Raw columns consulted when deriving time-based features
pub mod raw {
    pub const DATETIME_ORDER: &str = "datetime_order";
    pub const DATETIME_PICKED: &str = "datetime_picked";
    pub const ORDER_DATE: &str = "order_date";
    pub const TIME_ORDERED: &str = "time_ordered";
    pub const TIME_PICKED: &str = "time_picked";
    pub const ORDER_HOUR: &str = "order_hour";
    pub const ORDER_DOW: &str = "order_dow";
    pub const TIME_TO_PICK_MIN: &str = "time_to_pick_min";
}

/// Versioned canonical schema configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub version: u32,
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
    pub target: String,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::canonical()
    }
}

impl FeatureSchema {
    /// The built-in schema for delivery records
    pub fn canonical() -> Self {
        Self {
            version: SCHEMA_VERSION,
            numeric: NUMERIC_FIELDS.iter().map(|s| s.to_string()).collect(),
            categorical: CATEGORICAL_FIELDS.iter().map(|s| s.to_string()).collect(),
            target: TARGET_COLUMN.to_string(),
        }
    }

    /// Filter the canonical lists down to the columns `is_present` accepts,
    /// keeping canonical order.
    pub fn realize<F>(&self, is_present: F) -> RealizedSchema
    where
        F: Fn(&str) -> bool,
    {
        RealizedSchema {
            version: self.version,
            numeric: self.numeric.iter().filter(|c| is_present(c)).cloned().collect(),
            categorical: self
                .categorical
                .iter()
                .filter(|c| is_present(c))
                .cloned()
                .collect(),
        }
    }
}

/// The subset of the canonical schema actually present in a record set.
///
/// Training stores this inside the fitted pipeline; inference input must
/// realize exactly the same schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealizedSchema {
    pub version: u32,
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl RealizedSchema {
    /// All realized columns: numeric first, then categorical
    pub fn columns(&self) -> Vec<String> {
        self.numeric
            .iter()
            .chain(self.categorical.iter())
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.categorical.is_empty()
    }

    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }
}

impl fmt::Display for RealizedSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "v{} numeric=[{}] categorical=[{}]",
            self.version,
            self.numeric.join(", "),
            self.categorical.join(", ")
        )
    }
}
