//! Tests for all-or-nothing vector assembly

use super::*;
use crate::app::services::feature_reconciler::{FeatureValue, VariantSpec, FieldRule};
use crate::Error;
use serde_json::json;

#[test]
fn test_output_follows_manifest_order() {
    let features = reconciler("zinb")
        .reconcile(&request(json!({"subway_distance_m": 300.0, "hour": 8})))
        .unwrap();

    assert_eq!(features.variant(), "zinb");
    assert_eq!(
        features.names(),
        [
            "month",
            "start_hour",
            "end_hour",
            "subway_distance_m",
            "mbta_stops_250m",
            "last_day_in",
            "last_day_out",
            "is_night",
            "precipitation",
            "avg_temp",
        ]
    );
    assert_eq!(
        features.to_vector(),
        vec![6.0, 8.0, 9.0, 300.0, 1.0, 10.0, 10.0, 0.0, 0.0, 20.0]
    );
}

#[test]
fn test_missing_feature_names_every_absent_field() {
    let err = reconciler("nb")
        .reconcile(&request(json!({"station_lat": 42.36, "dist_business": 120.0})))
        .unwrap_err();

    match err {
        Error::MissingFeature { variant, fields } => {
            assert_eq!(variant, "nb");
            assert_eq!(
                fields,
                vec![
                    "station_lng",
                    "dist_subway_m",
                    "dist_bus_m",
                    "dist_university_m",
                    "dist_residential",
                    "restaurant_count",
                ]
            );
        }
        other => panic!("expected MissingFeature, got {:?}", other),
    }
}

#[test]
fn test_unknown_temperature_is_present_but_not_numeric() {
    let features = reconciler("weekhour").reconcile(&request(json!({}))).unwrap();

    assert_eq!(features.get("TMAX"), Some(FeatureValue::Unknown));
    assert!(features.get("TMAX").unwrap().as_f64().is_nan());
    assert_eq!(number(&features, "PRCP"), 0.0);
    assert_eq!(number(&features, "station_id"), 325.0);
    assert_eq!(features.len(), 15);
}

#[test]
fn test_invalid_raw_feature_fails_request() {
    let result = reconciler("zinb").reconcile(&request(json!({"subway_distance_m": "far"})));
    assert!(matches!(result, Err(Error::InvalidNumeric { .. })));
}

#[test]
fn test_rule_default_applies_only_when_source_is_empty() {
    let spec = VariantSpec::new(
        "custom",
        vec![("capacity", FieldRule::raw(&["capacity", "docks"]).with_default(19.0))],
    );
    let reconciler = crate::app::services::feature_reconciler::FeatureReconciler::new(spec);

    let features = reconciler.reconcile(&request(json!({"docks": 31}))).unwrap();
    assert_eq!(number(&features, "capacity"), 31.0);

    let features = reconciler.reconcile(&request(json!({}))).unwrap();
    assert_eq!(number(&features, "capacity"), 19.0);
}

#[test]
fn test_serializes_as_ordered_object() {
    let features = reconciler("weekhour")
        .reconcile(&request(json!({"hour_of_week": 46, "TMAX": 21.5})))
        .unwrap();
    let json = serde_json::to_string(&features).unwrap();

    assert!(json.starts_with(r#"{"variant":"weekhour","features":{"start_hour_of_week":46.0"#));
    assert!(json.contains(r#""TMAX":21.5"#));
    assert!(json.contains(r#""TMIN":null"#));
    let start = json.find("start_hour_of_week").unwrap();
    let end = json.find("weekhour\":").unwrap();
    assert!(start < end);
}

#[test]
fn test_supplied_end_hour_and_night_flag_are_kept() {
    let features = reconciler("zinb")
        .reconcile(&request(json!({
            "start_hour": 23,
            "end_hour": 5,
            "is_night": 0,
            "subway_distance_m": 100.0,
        })))
        .unwrap();

    assert_eq!(features.get("start_hour"), Some(FeatureValue::Number(23.0)));
    assert_eq!(features.get("end_hour"), Some(FeatureValue::Number(5.0)));
    assert_eq!(features.get("is_night"), Some(FeatureValue::Number(0.0)));

    let features = reconciler("zinb")
        .reconcile(&request(json!({"start_hour": 23, "subway_distance_m": 100.0})))
        .unwrap();
    assert_eq!(features.get("end_hour"), Some(FeatureValue::Number(0.0)));
    assert_eq!(features.get("is_night"), Some(FeatureValue::Number(1.0)));
}

#[test]
fn test_supplied_end_hour_of_week_is_kept() {
    let weekhour = reconciler("weekhour");

    let features = weekhour
        .reconcile(&request(json!({"hour_of_week": 10, "end_hour_of_week": 99})))
        .unwrap();
    assert_eq!(features.get("start_hour_of_week"), Some(FeatureValue::Number(10.0)));
    assert_eq!(features.get("end_hour_of_week"), Some(FeatureValue::Number(99.0)));

    let features = weekhour
        .reconcile(&request(json!({"hour_of_week": 10})))
        .unwrap();
    assert_eq!(features.get("end_hour_of_week"), Some(FeatureValue::Number(11.0)));
}
