//! Reference catalog index for name lookups and bounded nearest-neighbour search
//!
//! The index is built once from the full reference catalog and is read-only
//! afterwards, so a single instance can be shared behind an `Arc` by any
//! number of concurrent matching passes. Rebuilding is the only way to pick
//! up catalog changes.

use crate::app::models::{Coordinate, ReferenceStationRecord};
use crate::app::services::geo::SpatialGrid;
use std::collections::HashMap;
use tracing::debug;

pub mod loader;
pub mod metadata;
pub mod parser;

#[cfg(test)]
pub mod tests;

// Re-export key types for convenience
pub use loader::{QueryCatalog, load_query_catalog, load_reference_catalog};
pub use metadata::{IndexMetadata, LoadStats};

/// Normalize a station name for lookup: surrounding whitespace trimmed, case folded
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Name and spatial index over an ordered reference catalog
///
/// Row identifiers are positions in the catalog as loaded. Every list of
/// identifiers the index hands out is in ascending row order.
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    /// Reference rows in original catalog order
    pub(crate) records: Vec<ReferenceStationRecord>,

    /// Coordinates of `records`, same order, for distance scans
    pub(crate) coordinates: Vec<Coordinate>,

    /// Normalized name to ascending row identifiers sharing it
    pub(crate) by_name: HashMap<String, Vec<usize>>,

    /// Grid bucketing of `coordinates` sized for the geo fallback threshold
    pub(crate) grid: SpatialGrid,
}

impl CatalogIndex {
    /// Build the index in one pass over the catalog
    pub fn build(records: Vec<ReferenceStationRecord>, threshold: f64) -> Self {
        let coordinates: Vec<Coordinate> = records.iter().map(|r| r.coordinate).collect();

        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (id, record) in records.iter().enumerate() {
            by_name.entry(normalize_name(&record.name)).or_default().push(id);
        }

        let grid = SpatialGrid::build(&coordinates, threshold);

        debug!(
            "Built catalog index: {} rows, {} distinct names, {} grid cells",
            records.len(),
            by_name.len(),
            grid.occupied_cells()
        );

        Self {
            records,
            coordinates,
            by_name,
            grid,
        }
    }

    /// Row identifiers whose normalized name equals the normalized `name`
    pub fn candidates(&self, name: &str) -> &[usize] {
        self.by_name
            .get(&normalize_name(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Reference row by identifier
    pub fn record(&self, id: usize) -> Option<&ReferenceStationRecord> {
        self.records.get(id)
    }

    pub fn records(&self) -> &[ReferenceStationRecord] {
        &self.records
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Normalized names shared by more than one reference row, sorted
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .by_name
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Summary of index contents
    pub fn metadata(&self) -> IndexMetadata {
        IndexMetadata {
            record_count: self.records.len(),
            distinct_names: self.by_name.len(),
            duplicate_names: self.duplicate_names().len(),
            occupied_cells: self.grid.occupied_cells(),
            threshold: self.grid.threshold(),
        }
    }
}
