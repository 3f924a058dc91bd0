//! Batch station matching across a worker pool

use super::geo_fallback::GeoFallbackMatcher;
use super::name_matcher::{NameMatch, NameMatcher};
use super::report::{MatchDiagnostic, MatchReport, RowOutcome};
use crate::app::models::{IssueKind, MatchResult, RowIssue, StationRecord};
use crate::app::services::catalog_index::{CatalogIndex, QueryCatalog};
use crate::config::MatchingConfig;
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// Links query stations to a shared, read-only reference index
///
/// ```rust
/// use std::sync::Arc;
/// use station_reconciler::app::services::catalog_index::CatalogIndex;
/// use station_reconciler::app::services::station_matcher::StationMatcher;
/// use station_reconciler::config::MatchingConfig;
/// use station_reconciler::{ReferenceStationRecord, StationRecord};
///
/// # fn example() -> station_reconciler::Result<()> {
/// let reference = vec![ReferenceStationRecord::new("Porter", 42.388, -71.119, 2, 5.0, 60.0)?];
/// let index = Arc::new(CatalogIndex::build(reference, 0.001));
/// let matcher = StationMatcher::new(index, MatchingConfig::default());
///
/// let outcome = matcher.match_station(0, &StationRecord::new("porter", 42.3881, -71.1191)?);
/// assert!(outcome.result.is_matched());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct StationMatcher {
    index: Arc<CatalogIndex>,
    config: MatchingConfig,
}

impl StationMatcher {
    pub fn new(index: Arc<CatalogIndex>, config: MatchingConfig) -> Self {
        Self { index, config }
    }

    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    /// Resolve one query station: name first, then the geo fallback
    pub fn match_station(&self, query_id: usize, station: &StationRecord) -> RowOutcome {
        let name = Some(station.name.clone());

        match NameMatcher::new(&self.index).resolve(station) {
            NameMatch::Match {
                reference_id,
                distance,
                tied,
            } => {
                let diagnostic = if tied.is_empty() {
                    None
                } else {
                    debug!(
                        "Ambiguous name match for '{}': rows {:?} tie at {}",
                        station.name, tied, distance
                    );
                    let mut reference_ids = vec![reference_id];
                    reference_ids.extend(tied);
                    Some(MatchDiagnostic::Ambiguous {
                        query_id,
                        name: station.name.clone(),
                        reference_ids,
                        distance,
                    })
                };
                RowOutcome {
                    result: MatchResult::exact_name(query_id, reference_id, distance),
                    diagnostic,
                    issue: None,
                    name,
                }
            }
            NameMatch::Miss => {
                let fallback = GeoFallbackMatcher::new(&self.index, self.config.strategy);
                match fallback.resolve(station) {
                    Some((reference_id, distance)) => RowOutcome {
                        result: MatchResult::geo_fallback(query_id, reference_id, distance),
                        diagnostic: None,
                        issue: None,
                        name,
                    },
                    None => RowOutcome {
                        result: MatchResult::unmatched(query_id),
                        diagnostic: Some(MatchDiagnostic::Unresolved {
                            query_id,
                            name: station.name.clone(),
                        }),
                        issue: None,
                        name,
                    },
                }
            }
        }
    }

    /// Outcome for a query row whose coordinates could not be parsed
    fn invalid_row(query_id: usize) -> RowOutcome {
        RowOutcome {
            result: MatchResult::unmatched(query_id),
            diagnostic: None,
            issue: Some(RowIssue::new(
                query_id,
                IssueKind::InvalidNumeric,
                "Query row has unusable coordinates",
            )),
            name: None,
        }
    }

    /// Match every query row; `None` entries are rows that failed to parse
    ///
    /// Rows are processed in parallel on `workers` threads and the report
    /// keeps query order.
    pub fn match_batch(
        &self,
        stations: &[Option<StationRecord>],
        show_progress: bool,
    ) -> Result<MatchReport> {
        info!(
            "Matching {} query rows against {} reference rows ({:?} fallback, {} workers)",
            stations.len(),
            self.index.len(),
            self.config.strategy,
            self.config.workers
        );

        let progress_bar = if show_progress {
            Some(Self::create_progress_bar(stations.len() as u64))
        } else {
            None
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()
            .map_err(|e| Error::configuration(format!("Failed to build worker pool: {}", e)))?;

        let outcomes: Vec<RowOutcome> = pool.install(|| {
            stations
                .par_iter()
                .enumerate()
                .map(|(query_id, station)| {
                    let outcome = match station {
                        Some(station) => self.match_station(query_id, station),
                        None => Self::invalid_row(query_id),
                    };
                    if let Some(pb) = &progress_bar {
                        pb.inc(1);
                    }
                    outcome
                })
                .collect()
        });

        let report = MatchReport::from_outcomes(outcomes);

        if let Some(pb) = progress_bar {
            pb.finish_with_message("Matching complete");
        }
        info!("{}", report.summary());

        Ok(report)
    }

    /// Match a loaded query catalog
    pub fn match_catalog(&self, catalog: &QueryCatalog, show_progress: bool) -> Result<MatchReport> {
        self.match_batch(&catalog.stations, show_progress)
    }

    fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("Matching stations...");
        pb
    }
}
