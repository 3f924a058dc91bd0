//! Catalog loading statistics and index metadata

use crate::app::models::{IssueKind, RowIssue};
use serde::Serialize;

/// Statistics about loading one catalog file
#[derive(Debug, Clone, Serialize)]
pub struct LoadStats {
    /// Data rows read from the file, excluding the header
    pub total_rows: usize,

    /// Rows turned into station records
    pub records_loaded: usize,

    /// Rows left out because of a row-level problem
    pub rows_skipped: usize,

    /// One entry per skipped row
    pub issues: Vec<RowIssue>,

    /// Time taken to load the file
    #[serde(skip)]
    pub load_duration: std::time::Duration,
}

impl LoadStats {
    /// Create new empty load statistics
    pub fn new() -> Self {
        Self {
            total_rows: 0,
            records_loaded: 0,
            rows_skipped: 0,
            issues: Vec::new(),
            load_duration: std::time::Duration::ZERO,
        }
    }

    /// Record a skipped row
    pub fn skip(&mut self, issue: RowIssue) {
        self.rows_skipped += 1;
        self.issues.push(issue);
    }

    /// Count skipped rows of one kind
    pub fn count_kind(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|issue| issue.kind == kind).count()
    }

    /// Percentage of rows that were skipped
    pub fn skip_rate(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            (self.rows_skipped as f64 / self.total_rows as f64) * 100.0
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Get a summary string of the loading process
    pub fn summary(&self) -> String {
        format!(
            "Read {} rows, loaded {} records, skipped {} ({:.1}%) in {:.2}s",
            self.total_rows,
            self.records_loaded,
            self.rows_skipped,
            self.skip_rate(),
            self.load_duration.as_secs_f64()
        )
    }
}

impl Default for LoadStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Metadata about a built catalog index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexMetadata {
    /// Reference rows in the index
    pub record_count: usize,

    /// Distinct normalized names
    pub distinct_names: usize,

    /// Normalized names shared by more than one row
    pub duplicate_names: usize,

    /// Occupied spatial grid cells
    pub occupied_cells: usize,

    /// Geo fallback threshold the grid was built for
    pub threshold: f64,
}

impl IndexMetadata {
    pub fn summary(&self) -> String {
        format!(
            "Index with {} reference rows, {} distinct names ({} duplicated), {} grid cells at {}°",
            self.record_count,
            self.distinct_names,
            self.duplicate_names,
            self.occupied_cells,
            self.threshold
        )
    }
}
