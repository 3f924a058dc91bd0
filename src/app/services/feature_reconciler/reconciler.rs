//! Request reconciliation pipeline
//!
//! Each request flows through temporal derivation, weather normalization and
//! derived features, then is assembled against one variant's manifest.
//! Requests are independent, so a batch is reconciled in parallel.

use super::assembler::{CanonicalFeatures, ResolvedRequest, assemble};
use super::derived::calculate_derived;
use super::raw_request::{RawRequest, RequestEntry};
use super::temporal::{TemporalInput, reconcile_temporal};
use super::variants::VariantSpec;
use super::weather::normalize_weather;
use crate::app::models::RowIssue;
use crate::{Error, Result};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

type Outcome = std::result::Result<CanonicalFeatures, RowIssue>;

/// Counts from a batch reconciliation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileStats {
    pub total: usize,
    pub reconciled: usize,
    pub failed: usize,
}

impl ReconcileStats {
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.reconciled as f64 / self.total as f64) * 100.0
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Reconciled {}/{} requests ({:.1}%), {} failed",
            self.reconciled,
            self.total,
            self.success_rate(),
            self.failed
        )
    }
}

/// Result of reconciling a batch; `features` keeps request order
#[derive(Debug, Clone)]
pub struct BatchReconciliation {
    pub features: Vec<Option<CanonicalFeatures>>,
    pub issues: Vec<RowIssue>,
    pub stats: ReconcileStats,
}

/// Reconciles requests against one variant's manifest
#[derive(Debug, Clone)]
pub struct FeatureReconciler {
    spec: VariantSpec,
}

impl FeatureReconciler {
    pub fn new(spec: VariantSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &VariantSpec {
        &self.spec
    }

    /// Produce the complete feature vector for one request
    pub fn reconcile(&self, request: &RawRequest) -> Result<CanonicalFeatures> {
        let temporal = reconcile_temporal(&TemporalInput::from_request(request)?);
        let weather = normalize_weather(request)?;
        let derived = calculate_derived(request, &temporal, &weather)?;

        assemble(
            &self.spec,
            &ResolvedRequest {
                raw: request,
                temporal: &temporal,
                weather: &weather,
                derived: &derived,
            },
        )
    }

    /// Reconcile every request; a failing request is recorded, never fatal
    pub fn reconcile_batch(&self, requests: &[RawRequest], workers: usize) -> Result<BatchReconciliation> {
        let outcomes: Vec<Outcome> = in_pool(workers, || {
            requests
                .par_iter()
                .enumerate()
                .map(|(row, r)| self.reconcile(r).map_err(|e| row_issue(row, &e)))
                .collect()
        })?;
        Ok(self.tally(outcomes))
    }

    /// Reconcile parsed request entries, carrying unreadable entries through
    /// as issues at their position
    pub fn reconcile_entries(&self, entries: &[RequestEntry], workers: usize) -> Result<BatchReconciliation> {
        let outcomes: Vec<Outcome> = in_pool(workers, || {
            entries
                .par_iter()
                .enumerate()
                .map(|(row, entry)| match entry {
                    Ok(r) => self.reconcile(r).map_err(|e| row_issue(row, &e)),
                    Err(issue) => {
                        warn!("Request {} is unreadable: {}", row, issue.message);
                        Err(issue.clone())
                    }
                })
                .collect()
        })?;
        Ok(self.tally(outcomes))
    }

    fn tally(&self, outcomes: Vec<Outcome>) -> BatchReconciliation {
        let mut stats = ReconcileStats {
            total: outcomes.len(),
            ..ReconcileStats::default()
        };
        let mut features = Vec::with_capacity(outcomes.len());
        let mut issues = Vec::new();

        for outcome in outcomes {
            match outcome {
                Ok(vector) => {
                    stats.reconciled += 1;
                    features.push(Some(vector));
                }
                Err(issue) => {
                    stats.failed += 1;
                    issues.push(issue);
                    features.push(None);
                }
            }
        }

        info!("Variant '{}': {}", self.spec.name, stats.summary());

        BatchReconciliation {
            features,
            issues,
            stats,
        }
    }
}

fn row_issue(row: usize, error: &Error) -> RowIssue {
    warn!("Request {} could not be reconciled: {}", row, error);
    RowIssue::from_error(row, error)
}

fn in_pool<T, F>(workers: usize, op: F) -> Result<T>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| Error::configuration(format!("Failed to build worker pool: {}", e)))?;
    Ok(pool.install(op))
}
