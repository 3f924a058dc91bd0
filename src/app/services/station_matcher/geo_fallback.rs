//! Distance-bounded nearest-neighbour fallback
//!
//! Only the threshold and the tie policy are fixed: the nearest reference row
//! strictly closer than the threshold wins, the first in catalog order on
//! equal distances. Grid and scan strategies return identical results.

use crate::app::models::StationRecord;
use crate::app::services::catalog_index::CatalogIndex;
use crate::app::services::geo::scan_nearest_within;
use crate::config::MatchStrategy;

#[derive(Debug, Clone, Copy)]
pub struct GeoFallbackMatcher<'a> {
    index: &'a CatalogIndex,
    strategy: MatchStrategy,
}

impl<'a> GeoFallbackMatcher<'a> {
    pub fn new(index: &'a CatalogIndex, strategy: MatchStrategy) -> Self {
        Self { index, strategy }
    }

    /// Threshold in degrees; the index grid was built for it
    pub fn threshold(&self) -> f64 {
        self.index.grid().threshold()
    }

    /// Nearest reference row strictly within the threshold, with its distance
    pub fn resolve(&self, station: &StationRecord) -> Option<(usize, f64)> {
        let coordinates = self.index.coordinates();
        match self.strategy {
            MatchStrategy::Grid => self
                .index
                .grid()
                .nearest_within(coordinates, &station.coordinate),
            MatchStrategy::Scan => {
                scan_nearest_within(coordinates, &station.coordinate, self.threshold())
            }
        }
    }
}
