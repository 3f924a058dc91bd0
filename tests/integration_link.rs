//! End-to-end tests for catalog linkage through the public API
//!
//! Catalogs are written to a temporary directory, loaded with the async
//! loaders, matched, and the enriched CSV is read back and checked cell by
//! cell.

use station_reconciler::app::services::catalog_index::{
    CatalogIndex, load_query_catalog, load_reference_catalog,
};
use station_reconciler::app::services::station_matcher::{
    MatchDiagnostic, MatchReport, StationMatcher, write_enriched_csv, write_report_json,
};
use station_reconciler::config::{Config, MatchStrategy};
use station_reconciler::MatchMethod;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const REFERENCE: &str = "\
station_name,lat,lng,num_attractions_r500,dist_to_bikelane,dist_to_park
Central Square,42.365,-71.103,4,12.5,80
Central Square,42.370,-71.105,8,3.0,20
Kendall/MIT,42.3602,-71.0803,7,1.5,210
Harvard Square,42.3734,-71.1189,9,0.0,55
";

const QUERY: &str = "\
Station_name,Station latitude,Station longitude,Number of tourist attractions nearby,Capacity
Central Square,42.3651,-71.1031,0,19
Unknown St,42.3601,-71.0801,0,15
Far Away Dock,42.3,-71.2,5,11
Broken Coordinates,north,-71.1,2,7
";

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn read_rows(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader.headers().unwrap().iter().map(str::to_string).collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect();
    (headers, rows)
}

fn cell<'a>(headers: &[String], row: &'a [String], column: &str) -> &'a str {
    let index = headers.iter().position(|h| h == column).unwrap();
    &row[index]
}

async fn link(strategy: MatchStrategy, workers: usize) -> (TempDir, MatchReport) {
    let dir = TempDir::new().unwrap();
    let reference_path = write(dir.path(), "reference.csv", REFERENCE);
    let query_path = write(dir.path(), "query.csv", QUERY);

    let mut config = Config::default();
    config.matching.strategy = strategy;
    config.matching.workers = workers;
    config.validate().unwrap();

    let (records, reference_stats) =
        load_reference_catalog(&reference_path, &config.matching.reference_columns)
            .await
            .unwrap();
    assert_eq!(reference_stats.records_loaded, 4);

    let (catalog, query_stats) = load_query_catalog(&query_path, &config.matching.query_columns)
        .await
        .unwrap();
    assert_eq!(query_stats.rows_skipped, 1);

    let index = Arc::new(CatalogIndex::build(
        records,
        config.matching.geo_threshold_degrees,
    ));
    let matcher = StationMatcher::new(Arc::clone(&index), config.matching.clone());
    let report = matcher.match_catalog(&catalog, false).unwrap();

    write_enriched_csv(
        &dir.path().join("enriched.csv"),
        &catalog,
        &report,
        &index,
        &config.matching.output_columns,
    )
    .await
    .unwrap();
    write_report_json(&dir.path().join("report.json"), &report)
        .await
        .unwrap();

    (dir, report)
}

#[tokio::test]
async fn test_link_end_to_end() {
    let (dir, report) = link(MatchStrategy::Grid, 2).await;

    assert_eq!(report.total, 4);
    assert_eq!(report.exact_name, 1);
    assert_eq!(report.geo_fallback, 1);
    assert_eq!(report.unmatched, 2);
    assert_eq!(report.invalid, 1);
    assert_eq!(report.unmatched_names, vec!["Far Away Dock".to_string()]);

    // Name match picks the nearer of the two "Central Square" rows
    assert_eq!(report.results[0].method, MatchMethod::ExactName);
    assert_eq!(report.results[0].reference_id, Some(0));
    assert_eq!(report.results[1].method, MatchMethod::GeoFallback);
    assert_eq!(report.results[1].reference_id, Some(2));

    let (headers, rows) = read_rows(&dir.path().join("enriched.csv"));
    assert_eq!(rows.len(), 4);
    assert!(headers.contains(&"Capacity".to_string()));
    assert!(headers.contains(&"Proximity to parks".to_string()));

    assert_eq!(cell(&headers, &rows[0], "Number of tourist attractions nearby"), "4");
    assert_eq!(cell(&headers, &rows[0], "match_method"), "exact_name");
    assert_eq!(cell(&headers, &rows[0], "Capacity"), "19");

    assert_eq!(cell(&headers, &rows[1], "Number of tourist attractions nearby"), "7");
    assert_eq!(cell(&headers, &rows[1], "matched_station"), "Kendall/MIT");

    // Unmatched rows keep their original enrichment cells
    assert_eq!(cell(&headers, &rows[2], "Number of tourist attractions nearby"), "5");
    assert_eq!(cell(&headers, &rows[2], "match_method"), "unmatched");
    assert_eq!(cell(&headers, &rows[3], "match_method"), "invalid");

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap())
            .unwrap();
    assert_eq!(json["total"], 4);
    assert_eq!(json["results"].as_array().unwrap().len(), 4);
    assert_eq!(json["issues"][0]["row"], 3);
}

#[tokio::test]
async fn test_grid_and_scan_produce_identical_reports() {
    let (_grid_dir, grid) = link(MatchStrategy::Grid, 4).await;
    let (_scan_dir, scan) = link(MatchStrategy::Scan, 1).await;
    assert_eq!(grid, scan);
}

#[tokio::test]
async fn test_ambiguous_name_match_is_reported() {
    let dir = TempDir::new().unwrap();
    let reference = "\
station_name,lat,lng,num_attractions_r500,dist_to_bikelane,dist_to_park
Porter Square,42.3880,-71.1190,1,1,1
Porter Square,42.3880,-71.1190,2,2,2
";
    let query = "Station_name,Station latitude,Station longitude\nporter square,42.39,-71.12\n";
    let reference_path = write(dir.path(), "reference.csv", reference);
    let query_path = write(dir.path(), "query.csv", query);
    let config = Config::default();

    let (records, _) = load_reference_catalog(&reference_path, &config.matching.reference_columns)
        .await
        .unwrap();
    let (catalog, _) = load_query_catalog(&query_path, &config.matching.query_columns)
        .await
        .unwrap();

    let index = Arc::new(CatalogIndex::build(records, 0.001));
    let report = StationMatcher::new(index, config.matching)
        .match_catalog(&catalog, false)
        .unwrap();

    assert_eq!(report.results[0].reference_id, Some(0));
    assert_eq!(report.ambiguous_count(), 1);
    assert!(matches!(
        &report.diagnostics[0],
        MatchDiagnostic::Ambiguous { reference_ids, .. } if reference_ids == &vec![0, 1]
    ));
}
