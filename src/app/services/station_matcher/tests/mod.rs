//! Shared test utilities and fixtures for station matcher tests

use crate::app::models::{ReferenceStationRecord, StationRecord};
use crate::app::services::catalog_index::CatalogIndex;
use crate::app::services::station_matcher::StationMatcher;
use crate::config::{MatchStrategy, MatchingConfig};
use std::sync::Arc;

pub mod geo_fallback_tests;

pub fn reference(name: &str, lat: f64, lng: f64, attractions: u32) -> ReferenceStationRecord {
    ReferenceStationRecord::new(name, lat, lng, attractions, 10.0 + attractions as f64, 100.0)
        .unwrap()
}

pub fn query(name: &str, lat: f64, lng: f64) -> StationRecord {
    StationRecord::new(name, lat, lng).unwrap()
}

/// Reference catalog shared by the scenario tests
pub fn scenario_index() -> CatalogIndex {
    CatalogIndex::build(
        vec![
            reference("Central Square", 42.365, -71.103, 4),
            reference("Central Square", 42.370, -71.105, 8),
            reference("Kendall/MIT", 42.3602, -71.0803, 7),
            reference("Harvard Square", 42.3734, -71.1189, 9),
        ],
        0.001,
    )
}

pub fn matcher_with(index: CatalogIndex, strategy: MatchStrategy, workers: usize) -> StationMatcher {
    let config = MatchingConfig {
        strategy,
        workers,
        ..MatchingConfig::default()
    };
    StationMatcher::new(Arc::new(index), config)
}
