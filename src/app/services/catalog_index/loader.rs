//! Catalog CSV loading
//!
//! Both catalogs are header-addressed CSV files. Rows that fail to parse or
//! cannot be read at all are skipped and recorded in [`LoadStats`]; only a
//! missing file, an unreadable header or a missing required column fails the
//! load as a whole.

use super::metadata::LoadStats;
use super::parser::{
    HeaderMap, QueryLayout, ReferenceLayout, parse_query_record, parse_reference_record,
};
use crate::app::models::{IssueKind, ReferenceStationRecord, RowIssue, StationRecord};
use crate::config::{QueryColumns, ReferenceColumns};
use crate::{Error, Result};
use csv::StringRecord;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Query catalog as loaded, with every original cell preserved
#[derive(Debug, Clone)]
pub struct QueryCatalog {
    /// Original header row
    pub headers: StringRecord,

    /// Original data rows in file order
    pub rows: Vec<StringRecord>,

    /// Parsed station per row; `None` where the coordinates were unusable
    pub stations: Vec<Option<StationRecord>>,
}

impl QueryCatalog {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows with a usable station record
    pub fn valid_count(&self) -> usize {
        self.stations.iter().filter(|s| s.is_some()).count()
    }
}

fn reader_for<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source)
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| Error::io(format!("Failed to open catalog '{}'", path.display()), e))
}

fn unreadable_row(row: usize, error: &csv::Error) -> RowIssue {
    RowIssue::new(row, IssueKind::Other, format!("Unreadable row: {}", error))
}

/// Load the reference catalog from a CSV file
///
/// # Errors
/// * `Error::Io` if the file cannot be opened
/// * `Error::CsvParsing` if the header is unreadable or a required column is absent
pub async fn load_reference_catalog(
    path: &Path,
    columns: &ReferenceColumns,
) -> Result<(Vec<ReferenceStationRecord>, LoadStats)> {
    info!("Loading reference catalog: {}", path.display());
    let bytes = read_file(path).await?;
    read_reference_catalog(bytes.as_slice(), &path.display().to_string(), columns)
}

/// Read a reference catalog from any CSV source
pub fn read_reference_catalog<R: Read>(
    source: R,
    file_name: &str,
    columns: &ReferenceColumns,
) -> Result<(Vec<ReferenceStationRecord>, LoadStats)> {
    let start_time = Instant::now();
    let mut reader = reader_for(source);
    let headers = reader
        .headers()
        .map_err(|e| Error::csv_parsing(file_name, "Failed to read header row", Some(e)))?
        .clone();
    let layout = ReferenceLayout::resolve(&HeaderMap::new(&headers), columns, file_name)?;

    let mut records = Vec::new();
    let mut stats = LoadStats::new();

    for (row, result) in reader.records().enumerate() {
        stats.total_rows += 1;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping unreadable reference row {} in {}: {}", row, file_name, e);
                stats.skip(unreadable_row(row, &e));
                continue;
            }
        };

        match parse_reference_record(&record, &layout, row) {
            Ok(station) => {
                records.push(station);
                stats.records_loaded += 1;
            }
            Err(issue) => {
                debug!("Skipping reference row {}: {}", row, issue.message);
                stats.skip(issue);
            }
        }
    }

    stats.load_duration = start_time.elapsed();
    if stats.has_errors() {
        warn!(
            "Skipped {} of {} reference rows in {}",
            stats.rows_skipped, stats.total_rows, file_name
        );
    }
    info!("Reference catalog loaded: {}", stats.summary());

    Ok((records, stats))
}

/// Load the query catalog from a CSV file
pub async fn load_query_catalog(
    path: &Path,
    columns: &QueryColumns,
) -> Result<(QueryCatalog, LoadStats)> {
    info!("Loading query catalog: {}", path.display());
    let bytes = read_file(path).await?;
    read_query_catalog(bytes.as_slice(), &path.display().to_string(), columns)
}

/// Read a query catalog from any CSV source
pub fn read_query_catalog<R: Read>(
    source: R,
    file_name: &str,
    columns: &QueryColumns,
) -> Result<(QueryCatalog, LoadStats)> {
    let start_time = Instant::now();
    let mut reader = reader_for(source);
    let headers = reader
        .headers()
        .map_err(|e| Error::csv_parsing(file_name, "Failed to read header row", Some(e)))?
        .clone();
    let layout = QueryLayout::resolve(&HeaderMap::new(&headers), columns, file_name)?;

    let mut rows = Vec::new();
    let mut stations = Vec::new();
    let mut stats = LoadStats::new();

    for (row, result) in reader.records().enumerate() {
        stats.total_rows += 1;
        // An unreadable row keeps its position as an empty, invalid row
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Query row {} in {} is unreadable: {}", row, file_name, e);
                stats.skip(unreadable_row(row, &e));
                stations.push(None);
                rows.push(StringRecord::new());
                continue;
            }
        };

        match parse_query_record(&record, &layout, row) {
            Ok(station) => {
                stations.push(Some(station));
                stats.records_loaded += 1;
            }
            Err(issue) => {
                debug!("Query row {} has unusable coordinates: {}", row, issue.message);
                stations.push(None);
                stats.skip(issue);
            }
        }
        rows.push(record);
    }

    stats.load_duration = start_time.elapsed();
    if stats.has_errors() {
        warn!(
            "{} of {} query rows are unreadable or have unusable coordinates in {}",
            stats.rows_skipped, stats.total_rows, file_name
        );
    }
    info!("Query catalog loaded: {}", stats.summary());

    Ok((
        QueryCatalog {
            headers,
            rows,
            stations,
        },
        stats,
    ))
}
