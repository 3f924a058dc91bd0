//! Tests for header resolution and row parsing

use crate::app::models::IssueKind;
use crate::app::services::catalog_index::parser::{
    HeaderMap, ReferenceLayout, parse_count, parse_number, parse_reference_record,
};
use crate::config::ReferenceColumns;
use crate::Error;
use csv::StringRecord;

fn aliases(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_header_resolve_prefers_first_alias() {
    let headers = HeaderMap::new(&StringRecord::from(vec!["name", "lat", "station_name"]));
    assert_eq!(headers.resolve(&aliases(&["station_name", "name"])), Some(2));
    assert_eq!(headers.resolve(&aliases(&["latitude", "lat"])), Some(1));
    assert_eq!(headers.resolve(&aliases(&["lng"])), None);
}

#[test]
fn test_header_require_reports_missing_column() {
    let headers = HeaderMap::new(&StringRecord::from(vec!["name"]));
    let err = headers
        .require("latitude", &aliases(&["lat", "latitude"]), "ref.csv")
        .unwrap_err();
    assert!(matches!(err, Error::CsvParsing { .. }));
    assert!(err.to_string().contains("lat, latitude"));
}

#[test]
fn test_parse_number() {
    let record = StringRecord::from(vec![" 42.5 ", "abc", ""]);
    assert_eq!(parse_number(&record, 0, "lat").unwrap(), 42.5);
    assert!(parse_number(&record, 1, "lat").is_err());
    assert!(parse_number(&record, 2, "lat").is_err());
    assert!(parse_number(&record, 9, "lat").is_err());
}

#[test]
fn test_parse_count_accepts_integral_floats() {
    let record = StringRecord::from(vec!["4", "7.0", "2.5", "-1"]);
    assert_eq!(parse_count(&record, 0, "count").unwrap(), 4);
    assert_eq!(parse_count(&record, 1, "count").unwrap(), 7);
    assert!(parse_count(&record, 2, "count").is_err());
    assert!(parse_count(&record, 3, "count").is_err());
}

#[test]
fn test_parse_reference_record_issues() {
    let headers = StringRecord::from(vec![
        "station_name",
        "lat",
        "lng",
        "num_attractions_r500",
        "dist_to_bikelane",
        "dist_to_park",
    ]);
    let layout =
        ReferenceLayout::resolve(&HeaderMap::new(&headers), &ReferenceColumns::default(), "t")
            .unwrap();

    let good = StringRecord::from(vec!["Porter", "42.388", "-71.119", "2", "5.0", "60.0"]);
    let record = parse_reference_record(&good, &layout, 0).unwrap();
    assert_eq!(record.name, "Porter");
    assert_eq!(record.attraction_count, 2);

    let blank = StringRecord::from(vec!["  ", "42.388", "-71.119", "2", "5.0", "60.0"]);
    let issue = parse_reference_record(&blank, &layout, 1).unwrap_err();
    assert_eq!(issue.kind, IssueKind::MissingField);
    assert_eq!(issue.row, 1);

    let bad = StringRecord::from(vec!["Porter", "42.388", "west", "2", "5.0", "60.0"]);
    let issue = parse_reference_record(&bad, &layout, 2).unwrap_err();
    assert_eq!(issue.kind, IssueKind::InvalidNumeric);
    assert!(issue.message.contains("west"));
}
