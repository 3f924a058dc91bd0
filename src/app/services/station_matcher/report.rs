//! Match report aggregation
//!
//! The report is assembled sequentially from per-row outcomes in query order,
//! so a parallel pass and a sequential pass produce the same report.

use crate::app::models::{MatchMethod, MatchResult, RowIssue};
use serde::Serialize;

/// Reporting-only findings that never fail a row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchDiagnostic {
    /// Neither name nor geo fallback produced a candidate
    Unresolved { query_id: usize, name: String },

    /// Several same-named reference rows sat at exactly the chosen distance;
    /// `reference_ids` lists all of them, the chosen one first
    Ambiguous {
        query_id: usize,
        name: String,
        reference_ids: Vec<usize>,
        distance: f64,
    },
}

/// Everything one query row contributes to the report
#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    pub result: MatchResult,
    pub diagnostic: Option<MatchDiagnostic>,
    pub issue: Option<RowIssue>,
    pub name: Option<String>,
}

/// Aggregate outcome of one linkage pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    /// Query rows in the pass
    pub total: usize,
    pub exact_name: usize,
    pub geo_fallback: usize,
    pub unmatched: usize,

    /// Rows that could not be matched because their coordinates were unusable
    pub invalid: usize,

    /// One result per query row, in query order
    pub results: Vec<MatchResult>,

    /// Names of unmatched valid rows, in query order, for operator review
    pub unmatched_names: Vec<String>,

    pub diagnostics: Vec<MatchDiagnostic>,
    pub issues: Vec<RowIssue>,
}

impl MatchReport {
    /// Fold per-row outcomes, in query order, into a report
    pub fn from_outcomes(outcomes: Vec<RowOutcome>) -> Self {
        let mut report = Self {
            total: outcomes.len(),
            exact_name: 0,
            geo_fallback: 0,
            unmatched: 0,
            invalid: 0,
            results: Vec::with_capacity(outcomes.len()),
            unmatched_names: Vec::new(),
            diagnostics: Vec::new(),
            issues: Vec::new(),
        };

        for outcome in outcomes {
            match outcome.result.method {
                MatchMethod::ExactName => report.exact_name += 1,
                MatchMethod::GeoFallback => report.geo_fallback += 1,
                MatchMethod::Unmatched => report.unmatched += 1,
            }

            if let Some(issue) = outcome.issue {
                report.invalid += 1;
                report.issues.push(issue);
            } else if outcome.result.method == MatchMethod::Unmatched {
                report
                    .unmatched_names
                    .push(outcome.name.unwrap_or_default());
            }

            if let Some(diagnostic) = outcome.diagnostic {
                report.diagnostics.push(diagnostic);
            }
            report.results.push(outcome.result);
        }

        report
    }

    /// Rows linked by either strategy
    pub fn matched(&self) -> usize {
        self.exact_name + self.geo_fallback
    }

    /// Percentage of rows linked by either strategy
    pub fn match_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.matched() as f64 / self.total as f64) * 100.0
        }
    }

    /// Number of ambiguous exact-name resolutions
    pub fn ambiguous_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, MatchDiagnostic::Ambiguous { .. }))
            .count()
    }

    pub fn summary(&self) -> String {
        format!(
            "Matched {}/{} rows ({:.1}%): {} by name, {} by location, {} unmatched ({} invalid)",
            self.matched(),
            self.total,
            self.match_rate(),
            self.exact_name,
            self.geo_fallback,
            self.unmatched,
            self.invalid
        )
    }
}
