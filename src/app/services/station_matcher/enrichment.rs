//! Writing matched enrichment values back onto the query catalog
//!
//! Output columns are addressed by header name. Columns missing from the
//! query header are appended; existing ones are overwritten in place for
//! matched rows and left untouched for the rest. Rows wider than the header
//! keep their extra cells under blank header names.

use super::report::MatchReport;
use crate::app::models::MatchMethod;
use crate::app::services::catalog_index::{CatalogIndex, QueryCatalog};
use crate::config::OutputColumns;
use crate::{Error, Result};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Marker written for rows skipped because their coordinates were unusable
pub const INVALID_MARKER: &str = "invalid";

/// Resolved output positions within the enriched header
#[derive(Debug, Clone, Copy)]
struct OutputLayout {
    attraction_count: usize,
    dist_to_bikelane: usize,
    dist_to_park: usize,
    match_method: usize,
    matched_station: usize,
}

fn position_or_append(headers: &mut Vec<String>, name: &str) -> usize {
    match headers.iter().position(|h| h.trim() == name) {
        Some(index) => index,
        None => {
            headers.push(name.to_string());
            headers.len() - 1
        }
    }
}

impl OutputLayout {
    fn resolve(headers: &mut Vec<String>, columns: &OutputColumns) -> Self {
        Self {
            attraction_count: position_or_append(headers, &columns.attraction_count),
            dist_to_bikelane: position_or_append(headers, &columns.dist_to_bikelane),
            dist_to_park: position_or_append(headers, &columns.dist_to_park),
            match_method: position_or_append(headers, &columns.match_method),
            matched_station: position_or_append(headers, &columns.matched_station),
        }
    }
}

/// Write the enriched query catalog as CSV
///
/// `report` must come from matching `catalog` against `index`.
pub fn write_enriched_catalog<W: Write>(
    writer: W,
    catalog: &QueryCatalog,
    report: &MatchReport,
    index: &CatalogIndex,
    columns: &OutputColumns,
) -> Result<()> {
    if report.results.len() != catalog.len() {
        return Err(Error::catalog(format!(
            "Report has {} results for {} query rows",
            report.results.len(),
            catalog.len()
        )));
    }

    let mut headers: Vec<String> = catalog.headers.iter().map(str::to_string).collect();
    let widest = catalog.rows.iter().map(|row| row.len()).max().unwrap_or(0);
    if widest > headers.len() {
        warn!(
            "Query rows hold up to {} cells for {} headers; extra cells kept under blank headers",
            widest,
            headers.len()
        );
        headers.resize(widest, String::new());
    }
    let layout = OutputLayout::resolve(&mut headers, columns);

    let mut csv_writer = csv::WriterBuilder::new().flexible(false).from_writer(writer);
    csv_writer.write_record(&headers)?;

    for (row, result) in catalog.rows.iter().zip(&report.results) {
        let mut cells: Vec<String> = row.iter().map(str::to_string).collect();
        cells.resize(headers.len(), String::new());

        let matched = result.reference_id.and_then(|id| index.record(id));
        match matched {
            Some(reference) => {
                cells[layout.attraction_count] = reference.attraction_count.to_string();
                cells[layout.dist_to_bikelane] = reference.dist_to_bikelane.to_string();
                cells[layout.dist_to_park] = reference.dist_to_park.to_string();
                cells[layout.match_method] = result.method.to_string();
                cells[layout.matched_station] = reference.name.clone();
            }
            None => {
                let invalid = catalog
                    .stations
                    .get(result.query_id)
                    .is_some_and(Option::is_none);
                cells[layout.match_method] = if invalid {
                    INVALID_MARKER.to_string()
                } else {
                    MatchMethod::Unmatched.to_string()
                };
                cells[layout.matched_station] = String::new();
            }
        }

        csv_writer.write_record(&cells)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write the enriched query catalog to a CSV file
pub async fn write_enriched_csv(
    path: &Path,
    catalog: &QueryCatalog,
    report: &MatchReport,
    index: &CatalogIndex,
    columns: &OutputColumns,
) -> Result<()> {
    let mut buffer = Vec::new();
    write_enriched_catalog(&mut buffer, catalog, report, index, columns)?;
    tokio::fs::write(path, buffer).await.map_err(|e| {
        Error::io(format!("Failed to create output file '{}'", path.display()), e)
    })?;
    info!("Enriched catalog written: {}", path.display());
    Ok(())
}

/// Write the match report as pretty-printed JSON
pub async fn write_report_json(path: &Path, report: &MatchReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| Error::json("Failed to serialize match report", e))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| Error::io(format!("Failed to write report '{}'", path.display()), e))?;
    info!("Match report written: {}", path.display());
    Ok(())
}
