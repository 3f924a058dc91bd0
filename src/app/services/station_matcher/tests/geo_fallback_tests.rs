//! Tests for the distance-bounded fallback

use super::*;
use crate::app::services::station_matcher::GeoFallbackMatcher;
use crate::config::MatchStrategy;

#[test]
fn test_fallback_within_threshold() {
    let index = scenario_index();
    for strategy in [MatchStrategy::Grid, MatchStrategy::Scan] {
        let found = GeoFallbackMatcher::new(&index, strategy)
            .resolve(&query("Unknown St", 42.3601, -71.0801))
            .unwrap();
        assert_eq!(found.0, 2);
        assert!(found.1 < 0.001);
    }
}

#[test]
fn test_fallback_none_beyond_threshold() {
    let index = scenario_index();
    for strategy in [MatchStrategy::Grid, MatchStrategy::Scan] {
        let matcher = GeoFallbackMatcher::new(&index, strategy);
        assert_eq!(matcher.threshold(), 0.001);
        assert!(matcher.resolve(&query("Far Away", 43.0, -70.0)).is_none());
    }
}

#[test]
fn test_fallback_never_returns_distance_at_or_above_threshold() {
    let records: Vec<_> = (0..30)
        .map(|i| reference("Ref", 42.0 + i as f64 * 0.0007, -71.0, 0))
        .collect();
    let index = CatalogIndex::build(records, 0.001);

    for strategy in [MatchStrategy::Grid, MatchStrategy::Scan] {
        let matcher = GeoFallbackMatcher::new(&index, strategy);
        for step in 0..50 {
            let station = query("q", 42.0 + step as f64 * 0.0005, -71.0 + 0.0009);
            if let Some((_, distance)) = matcher.resolve(&station) {
                assert!(distance < 0.001);
            }
        }
    }
}
