//! Station linkage between a query catalog and the reference catalog
//!
//! Each query row is resolved independently:
//!
//! 1. [`name_matcher`] looks up reference rows with the same normalized name
//!    and picks the geographically closest, first in catalog order on ties
//! 2. On a name miss, [`geo_fallback`] picks the nearest reference row
//!    strictly within the distance threshold
//! 3. Anything left is recorded as unmatched in the [`report`]
//!
//! [`processor`] drives a whole batch across a worker pool and
//! [`enrichment`] writes the matched values back onto the query catalog by
//! column name.

pub mod enrichment;
pub mod geo_fallback;
pub mod name_matcher;
pub mod processor;
pub mod report;

#[cfg(test)]
pub mod tests;

// Re-export main types for convenience
pub use enrichment::{write_enriched_catalog, write_enriched_csv, write_report_json};
pub use geo_fallback::GeoFallbackMatcher;
pub use name_matcher::{NameMatch, NameMatcher};
pub use processor::StationMatcher;
pub use report::{MatchDiagnostic, MatchReport, RowOutcome};
