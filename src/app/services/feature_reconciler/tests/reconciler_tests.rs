//! Tests for the request pipeline and batch reconciliation

use super::*;
use crate::app::models::IssueKind;
use crate::app::services::feature_reconciler::parse_requests;
use serde_json::{Map, Value, json};

#[test]
fn test_hour_of_week_only_request() {
    let features = reconciler("weekhour")
        .reconcile(&request(json!({"hour_of_week": 46})))
        .unwrap();

    assert_eq!(number(&features, "dow"), 1.0);
    assert_eq!(number(&features, "hr"), 22.0);
    assert_eq!(number(&features, "weekend"), 0.0);
    assert_eq!(number(&features, "is_weekend"), 0.0);
    assert_eq!(number(&features, "end_hour_of_week"), 47.0);
}

#[test]
fn test_sunday_request_is_weekend() {
    // Sunday=0: day 0 at 03:00 is a weekend night
    let features = reconciler("nb")
        .reconcile(&request(json!({
            "day_of_week": 0,
            "hour": 3,
            "station_lat": 42.36,
            "station_lng": -71.06,
            "dist_subway_m": 150.0,
            "dist_bus_m": 40.0,
            "dist_university_m": 900.0,
            "dist_business": 50.0,
            "dist_residential": 75.0,
            "restaurant_count": 12
        })))
        .unwrap();

    assert_eq!(number(&features, "is_weekend"), 1.0);
    assert_eq!(number(&features, "day_of_week"), 0.0);
    assert_eq!(number(&features, "hour_of_day"), 3.0);

    let zinb = reconciler("zinb")
        .reconcile(&request(json!({"day_of_week": 0, "hour": 3, "dist_subway_m": 10})))
        .unwrap();
    assert_eq!(number(&zinb, "is_night"), 1.0);
}

#[test]
fn test_aliased_and_derived_inputs_agree() {
    let reconciler = reconciler("weekhour");
    let by_pair = reconciler
        .reconcile(&request(json!({"dow": 2, "hr": 17, "month": 9})))
        .unwrap();
    let by_week_hour = reconciler
        .reconcile(&request(json!({"weekhour": 65, "month": 9})))
        .unwrap();

    assert_eq!(by_pair, by_week_hour);
}

#[test]
fn test_reconciling_own_output_is_idempotent() {
    let reconciler = reconciler("weekhour");
    let first = reconciler
        .reconcile(&request(json!({
            "hour_of_week": 130,
            "month": 2,
            "TMAX": -1.5,
            "PRCP": 3.0,
            "station_id": 77,
            "num_bikes_in": 4
        })))
        .unwrap();

    let mut fields = Map::new();
    for (name, value) in first.iter() {
        let value = value.number().map_or(Value::Null, |n| json!(n));
        fields.insert(name.to_string(), value);
    }
    let second = reconciler.reconcile(&fields.into()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_timestamp_request() {
    let features = reconciler("zinb")
        .reconcile(&request(json!({
            "timestamp": "2024-12-21 23:00:00",
            "subway_distance_m": 120,
            "mbta_stops_250m": 0,
            "rainfall": 0.8
        })))
        .unwrap();

    assert_eq!(number(&features, "month"), 12.0);
    assert_eq!(number(&features, "start_hour"), 23.0);
    assert_eq!(number(&features, "end_hour"), 0.0);
    assert_eq!(number(&features, "is_night"), 1.0);
    assert_eq!(number(&features, "mbta_stops_250m"), 0.0);
    assert_eq!(number(&features, "precipitation"), 0.8);
}

#[test]
fn test_batch_collects_failures_without_aborting() {
    let requests = vec![
        request(json!({"subway_distance_m": 100})),
        request(json!({})),
        request(json!({"subway_distance_m": 250, "hour": "late"})),
        request(json!({"dist_subway_m": 400, "dist_bus_m": 120})),
    ];

    let batch = reconciler("zinb").reconcile_batch(&requests, 2).unwrap();

    assert_eq!(batch.stats.total, 4);
    assert_eq!(batch.stats.reconciled, 2);
    assert_eq!(batch.stats.failed, 2);
    assert!(batch.features[0].is_some());
    assert!(batch.features[1].is_none());
    assert!(batch.features[2].is_none());
    assert_eq!(
        number(batch.features[3].as_ref().unwrap(), "mbta_stops_250m"),
        1.0
    );

    assert_eq!(batch.issues.len(), 2);
    assert_eq!(batch.issues[0].row, 1);
    assert_eq!(batch.issues[0].kind, IssueKind::MissingFeature);
    assert_eq!(batch.issues[1].row, 2);
    assert_eq!(batch.issues[1].kind, IssueKind::InvalidNumeric);
    assert!(batch.stats.summary().contains("2/4"));
}

#[test]
fn test_empty_batch() {
    let batch = reconciler("nb").reconcile_batch(&[], 1).unwrap();
    assert_eq!(batch.stats.success_rate(), 100.0);
    assert!(batch.features.is_empty());
}

#[test]
fn test_unreadable_entries_keep_their_position() {
    let entries = parse_requests(r#"[{"hour_of_week": 3}, 42, {"hour_of_week": 5}]"#).unwrap();

    let batch = reconciler("weekhour").reconcile_entries(&entries, 2).unwrap();

    assert_eq!(batch.stats.total, 3);
    assert_eq!(batch.stats.reconciled, 2);
    assert_eq!(batch.stats.failed, 1);
    assert_eq!(number(batch.features[0].as_ref().unwrap(), "hr"), 3.0);
    assert!(batch.features[1].is_none());
    assert_eq!(number(batch.features[2].as_ref().unwrap(), "hr"), 5.0);
    assert_eq!(batch.issues.len(), 1);
    assert_eq!(batch.issues[0].row, 1);
    assert_eq!(batch.issues[0].kind, IssueKind::Other);
}

#[test]
fn test_huge_day_of_week_fails_only_its_request() {
    let requests = vec![
        request(json!({"day_of_week": 1e300, "hour": 3})),
        request(json!({"hour_of_week": 7})),
    ];

    let batch = reconciler("weekhour").reconcile_batch(&requests, 1).unwrap();

    assert!(batch.features[0].is_none());
    assert_eq!(batch.issues[0].row, 0);
    assert_eq!(batch.issues[0].kind, IssueKind::InvalidNumeric);
    assert_eq!(number(batch.features[1].as_ref().unwrap(), "hr"), 7.0);
}
