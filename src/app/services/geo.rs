//! Shared distance metric and spatial bucketing
//!
//! Distances are plain Euclidean over raw (latitude, longitude) in decimal
//! degrees. This is only meaningful as a local proxy at city scale: one degree
//! of longitude is shorter than one degree of latitude away from the equator,
//! and nothing here corrects for that.

use crate::app::models::Coordinate;
use crate::constants::GRID_CELL_FACTOR;
use std::collections::HashMap;

/// Euclidean distance between two coordinates in decimal degrees
pub fn euclidean_distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat_diff = a.latitude - b.latitude;
    let lon_diff = a.longitude - b.longitude;
    (lat_diff * lat_diff + lon_diff * lon_diff).sqrt()
}

/// Keep the better of two (row, distance) candidates.
///
/// Smaller distance wins; equal distances go to the lower row index, which is
/// the first row in catalog order.
fn closer(best: Option<(usize, f64)>, candidate: (usize, f64)) -> Option<(usize, f64)> {
    match best {
        None => Some(candidate),
        Some((best_id, best_distance)) => {
            if candidate.1 < best_distance || (candidate.1 == best_distance && candidate.0 < best_id)
            {
                Some(candidate)
            } else {
                best
            }
        }
    }
}

/// Nearest coordinate strictly closer than `threshold`, by full linear scan
pub fn scan_nearest_within(
    coordinates: &[Coordinate],
    target: &Coordinate,
    threshold: f64,
) -> Option<(usize, f64)> {
    let mut best = None;
    for (id, coordinate) in coordinates.iter().enumerate() {
        let distance = euclidean_distance(coordinate, target);
        if distance < threshold {
            best = closer(best, (id, distance));
        }
    }
    best
}

/// Uniform grid over degree space for bounded nearest-neighbour queries
///
/// The grid answers "nearest point closer than the threshold it was built
/// for" with the same result, including tie order, as [`scan_nearest_within`].
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    /// Threshold the cell size was derived from
    threshold: f64,

    /// Edge length of one cell in degrees
    cell_size: f64,

    /// Row indices per occupied cell, in ascending order
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl SpatialGrid {
    /// Bucket every coordinate into cells sized for `threshold`
    pub fn build(coordinates: &[Coordinate], threshold: f64) -> Self {
        let cell_size = threshold * GRID_CELL_FACTOR;
        let mut cells: HashMap<(i64, i64), Vec<usize>> = HashMap::new();

        for (id, coordinate) in coordinates.iter().enumerate() {
            cells
                .entry(Self::cell_of(coordinate, cell_size))
                .or_default()
                .push(id);
        }

        Self {
            threshold,
            cell_size,
            cells,
        }
    }

    fn cell_of(coordinate: &Coordinate, cell_size: f64) -> (i64, i64) {
        (
            (coordinate.latitude / cell_size).floor() as i64,
            (coordinate.longitude / cell_size).floor() as i64,
        )
    }

    /// Threshold this grid was built for
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Number of occupied cells
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Nearest coordinate strictly closer than the grid threshold
    ///
    /// `coordinates` must be the slice the grid was built from.
    pub fn nearest_within(
        &self,
        coordinates: &[Coordinate],
        target: &Coordinate,
    ) -> Option<(usize, f64)> {
        let (row, col) = Self::cell_of(target, self.cell_size);
        let mut best = None;

        for d_row in -1..=1 {
            for d_col in -1..=1 {
                let cell = (row.saturating_add(d_row), col.saturating_add(d_col));
                let Some(ids) = self.cells.get(&cell) else {
                    continue;
                };
                for &id in ids {
                    let distance = euclidean_distance(&coordinates[id], target);
                    if distance < self.threshold {
                        best = closer(best, (id, distance));
                    }
                }
            }
        }

        best
    }
}
