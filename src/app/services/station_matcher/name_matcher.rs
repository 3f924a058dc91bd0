//! Exact-name resolution with geographic tie-breaking

use crate::app::models::StationRecord;
use crate::app::services::catalog_index::CatalogIndex;
use crate::app::services::geo::euclidean_distance;

/// Outcome of a normalized-name lookup
#[derive(Debug, Clone, PartialEq)]
pub enum NameMatch {
    /// No reference row shares the name
    Miss,
    /// Closest same-named reference row
    Match {
        reference_id: usize,
        distance: f64,
        /// Other same-named rows at exactly the same distance, in catalog order
        tied: Vec<usize>,
    },
}

/// Resolves query stations against the name side of a [`CatalogIndex`]
#[derive(Debug, Clone, Copy)]
pub struct NameMatcher<'a> {
    index: &'a CatalogIndex,
}

impl<'a> NameMatcher<'a> {
    pub fn new(index: &'a CatalogIndex) -> Self {
        Self { index }
    }

    /// Pick the same-named candidate closest to the query coordinate
    ///
    /// A single candidate is returned as is, with its distance computed for
    /// reporting. Among several, the first minimum in catalog order wins.
    pub fn resolve(&self, station: &StationRecord) -> NameMatch {
        let candidates = self.index.candidates(&station.name);
        let coordinates = self.index.coordinates();

        let mut best: Option<(usize, f64)> = None;
        let mut tied = Vec::new();

        for &id in candidates {
            let distance = euclidean_distance(&coordinates[id], &station.coordinate);
            match best {
                None => best = Some((id, distance)),
                Some((_, best_distance)) if distance < best_distance => {
                    best = Some((id, distance));
                    tied.clear();
                }
                Some((_, best_distance)) if distance == best_distance => tied.push(id),
                Some(_) => {}
            }
        }

        match best {
            None => NameMatch::Miss,
            Some((reference_id, distance)) => NameMatch::Match {
                reference_id,
                distance,
                tied,
            },
        }
    }
}
