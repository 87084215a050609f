//! Integration tests for feature derivation: time fields, normalization, schema negotiation

use delivery_eta::features::{
    normalize_category, DerivationSource, FeatureBuilder, FeatureSchema, CATEGORICAL_FIELDS,
    NUMERIC_FIELDS, TARGET_COLUMN,
};
use polars::prelude::*;

fn f64_column(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name).unwrap().f64().unwrap().into_iter().collect()
}

// ============================================================================
// Derived time fields
// ============================================================================

#[test]
fn test_parsed_order_datetime_in_range() {
    let df = df!(
        "datetime_order" => &[
            "2024-01-01 10:00", "2024-01-06 00:00", "31-12-2023 23:59",
            "15/02/2022 07:30:15", "2022-03-19T18:05:00", "12.03.2022 13:00",
        ],
    )
    .unwrap();

    let frame = FeatureBuilder::new().derive(&df).unwrap();
    for hour in f64_column(&frame.features, "order_hour") {
        let hour = hour.unwrap();
        assert!((0.0..=23.0).contains(&hour), "hour {}", hour);
    }
    for dow in f64_column(&frame.features, "order_dow") {
        let dow = dow.unwrap();
        assert!((0.0..=6.0).contains(&dow), "dow {}", dow);
    }
    assert_eq!(
        f64_column(&frame.features, "order_hour"),
        vec![Some(10.0), Some(0.0), Some(23.0), Some(7.0), Some(18.0), Some(13.0)]
    );
}

#[test]
fn test_no_timestamp_source_is_midnight_monday() {
    let df = df!(
        "city" => &["Urban", "Metropolitian", "Semi-Urban"],
        "dist_km" => &[1.0, 2.0, 3.0],
    )
    .unwrap();

    let frame = FeatureBuilder::new().derive(&df).unwrap();
    assert_eq!(frame.report.order_time, DerivationSource::Unavailable);
    assert!(f64_column(&frame.derived, "order_hour").iter().all(|v| *v == Some(0.0)));
    assert!(f64_column(&frame.derived, "order_dow").iter().all(|v| *v == Some(0.0)));
    assert!(f64_column(&frame.derived, "time_to_pick_min").iter().all(|v| v.is_none()));
}

#[test]
fn test_time_to_pick_fifteen_minutes() {
    let df = df!(
        "datetime_order" => &["2024-01-01 10:00"],
        "datetime_picked" => &["2024-01-01 10:15"],
    )
    .unwrap();

    let frame = FeatureBuilder::new().derive(&df).unwrap();
    assert_eq!(f64_column(&frame.features, "time_to_pick_min"), vec![Some(15.0)]);
}

#[test]
fn test_unparseable_timestamp_only_affects_its_record() {
    let df = df!(
        "order_date" => &["19-03-2022", "not a date", "20-03-2022"],
        "time_ordered" => &["11:30", "12:00", "09:15:00"],
        "time_picked" => &["11:40", "12:10", "09:30:00"],
    )
    .unwrap();

    let frame = FeatureBuilder::new().derive(&df).unwrap();
    assert_eq!(
        f64_column(&frame.features, "time_to_pick_min"),
        vec![Some(10.0), None, Some(15.0)]
    );
    assert_eq!(
        f64_column(&frame.features, "order_hour"),
        vec![Some(11.0), Some(0.0), Some(9.0)]
    );
}

#[test]
fn test_existing_time_to_pick_is_kept() {
    let df = df!(
        "time_to_pick_min" => &[5i64, 10],
        "datetime_order" => &["2024-01-01 10:00", "2024-01-01 11:00"],
        "datetime_picked" => &["2024-01-01 10:30", "2024-01-01 11:30"],
    )
    .unwrap();

    let frame = FeatureBuilder::new().derive(&df).unwrap();
    assert_eq!(frame.report.time_to_pick, DerivationSource::Existing);
    assert_eq!(frame.report.order_time, DerivationSource::CombinedDatetime);
    assert_eq!(
        f64_column(&frame.features, "time_to_pick_min"),
        vec![Some(5.0), Some(10.0)]
    );
}

// ============================================================================
// Normalization and coercion
// ============================================================================

#[test]
fn test_normalization_idempotent() {
    for value in ["delhi", "Delhi ", "  HIGH  ", "semi-urban", "", "nan"] {
        let once = normalize_category(value);
        assert_eq!(normalize_category(&once), once);
    }
}

#[test]
fn test_whitespace_and_case_collapse() {
    let df = df!("city" => &["Delhi ", "delhi"]).unwrap();
    let frame = FeatureBuilder::new().derive(&df).unwrap();

    let city: Vec<Option<&str>> = frame.features.column("city").unwrap().str().unwrap().into_iter().collect();
    assert_eq!(city, vec![Some("delhi"), Some("delhi")]);
}

#[test]
fn test_unparseable_numeric_is_missing() {
    let df = df!(
        "delivery_person_ratings" => &["4.9", "NaN", "", "six"],
        "dist_km" => &[Some(1.5), None, Some(f64::INFINITY), Some(2.0)],
    )
    .unwrap();

    let frame = FeatureBuilder::new().derive(&df).unwrap();
    assert_eq!(
        f64_column(&frame.features, "delivery_person_ratings"),
        vec![Some(4.9), None, None, None]
    );
    assert_eq!(
        f64_column(&frame.features, "dist_km"),
        vec![Some(1.5), None, None, Some(2.0)]
    );
}

// ============================================================================
// Schema negotiation
// ============================================================================

#[test]
fn test_minimal_record_set() {
    let df = df!(
        "city" => &["Urban", "Metropolitian"],
        "dist_km" => &[3.0, 9.5],
        TARGET_COLUMN => &[21.0, 40.0],
    )
    .unwrap();

    let frame = FeatureBuilder::new().derive(&df).unwrap();
    assert_eq!(frame.numeric_columns(), &["dist_km"]);
    assert_eq!(frame.categorical_columns(), &["city"]);
    assert!(frame.target.is_some());
}

#[test]
fn test_full_record_set_uses_canonical_order() {
    let df = df!(
        "festival" => &["No"],
        "type_of_vehicle" => &["motorcycle"],
        "type_of_order" => &["Snack"],
        "weather_conditions" => &["Sunny"],
        "road_traffic_density" => &["High"],
        "city" => &["Urban"],
        "datetime_picked" => &["2024-01-01 10:15"],
        "datetime_order" => &["2024-01-01 10:00"],
        "multiple_deliveries" => &[1.0],
        "delivery_person_ratings" => &[4.5],
        "delivery_person_age" => &[30.0],
        "dist_km" => &[3.0],
    )
    .unwrap();

    let frame = FeatureBuilder::new().derive(&df).unwrap();
    assert_eq!(frame.numeric_columns(), NUMERIC_FIELDS.as_slice());
    assert_eq!(frame.categorical_columns(), CATEGORICAL_FIELDS.as_slice());

    let names: Vec<String> = frame
        .features
        .get_column_names()
        .into_iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(names, frame.schema.columns());
}

#[test]
fn test_custom_schema() {
    let schema = FeatureSchema {
        numeric: vec!["dist_km".to_string()],
        categorical: Vec::new(),
        ..FeatureSchema::canonical()
    };
    let df = df!(
        "city" => &["Urban"],
        "dist_km" => &[3.0],
    )
    .unwrap();

    let frame = FeatureBuilder::with_schema(schema).derive(&df).unwrap();
    assert_eq!(frame.numeric_columns(), &["dist_km"]);
    assert!(frame.categorical_columns().is_empty());
}
