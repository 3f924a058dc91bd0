//! Header resolution and row parsing for catalog CSV files
//!
//! Columns are addressed by header name, never by position. Each logical
//! column may accept several header spellings; the first one present in the
//! file wins.

use crate::app::models::{IssueKind, ReferenceStationRecord, RowIssue, StationRecord};
use crate::config::{QueryColumns, ReferenceColumns};
use crate::{Error, Result};
use csv::StringRecord;
use std::collections::HashMap;

/// Header name to column index lookup for one CSV file
#[derive(Debug, Clone)]
pub struct HeaderMap {
    pub name_to_index: HashMap<String, usize>,
}

impl HeaderMap {
    pub fn new(headers: &StringRecord) -> Self {
        let mut name_to_index = HashMap::new();
        for (index, name) in headers.iter().enumerate() {
            // Keep the first occurrence of a repeated header
            name_to_index.entry(name.trim().to_string()).or_insert(index);
        }
        Self { name_to_index }
    }

    /// Index of the first accepted spelling present in the header
    pub fn resolve(&self, aliases: &[String]) -> Option<usize> {
        aliases
            .iter()
            .find_map(|alias| self.name_to_index.get(alias.trim()).copied())
    }

    /// Like [`HeaderMap::resolve`], failing the whole file when no spelling is present
    pub fn require(&self, label: &str, aliases: &[String], file: &str) -> Result<usize> {
        self.resolve(aliases).ok_or_else(|| {
            Error::csv_parsing(
                file,
                format!(
                    "Required column '{}' not found (accepted headers: {})",
                    label,
                    aliases.join(", ")
                ),
                None,
            )
        })
    }
}

/// Resolved column indices for the reference catalog
#[derive(Debug, Clone, Copy)]
pub struct ReferenceLayout {
    pub name: usize,
    pub latitude: usize,
    pub longitude: usize,
    pub attraction_count: usize,
    pub dist_to_bikelane: usize,
    pub dist_to_park: usize,
}

impl ReferenceLayout {
    pub fn resolve(headers: &HeaderMap, columns: &ReferenceColumns, file: &str) -> Result<Self> {
        Ok(Self {
            name: headers.require("name", &columns.name, file)?,
            latitude: headers.require("latitude", &columns.latitude, file)?,
            longitude: headers.require("longitude", &columns.longitude, file)?,
            attraction_count: headers.require(
                "attraction_count",
                &columns.attraction_count,
                file,
            )?,
            dist_to_bikelane: headers.require(
                "dist_to_bikelane",
                &columns.dist_to_bikelane,
                file,
            )?,
            dist_to_park: headers.require("dist_to_park", &columns.dist_to_park, file)?,
        })
    }
}

/// Resolved column indices for the query catalog
#[derive(Debug, Clone, Copy)]
pub struct QueryLayout {
    pub name: usize,
    pub latitude: usize,
    pub longitude: usize,
}

impl QueryLayout {
    pub fn resolve(headers: &HeaderMap, columns: &QueryColumns, file: &str) -> Result<Self> {
        Ok(Self {
            name: headers.require("name", std::slice::from_ref(&columns.name), file)?,
            latitude: headers.require("latitude", std::slice::from_ref(&columns.latitude), file)?,
            longitude: headers.require(
                "longitude",
                std::slice::from_ref(&columns.longitude),
                file,
            )?,
        })
    }
}

fn cell<'a>(record: &'a StringRecord, index: usize) -> &'a str {
    record.get(index).unwrap_or("").trim()
}

/// Parse a numeric cell; blank and unparseable cells are both invalid
pub fn parse_number(record: &StringRecord, index: usize, field: &str) -> Result<f64> {
    let value = cell(record, index);
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(Error::invalid_numeric(field, value)),
    }
}

/// Parse a count cell, accepting integral floats such as `4.0`
pub fn parse_count(record: &StringRecord, index: usize, field: &str) -> Result<u32> {
    let number = parse_number(record, index, field)?;
    if number < 0.0 || number.fract() != 0.0 || number > u32::MAX as f64 {
        return Err(Error::invalid_numeric(field, cell(record, index)));
    }
    Ok(number as u32)
}

/// Parse one reference catalog row
pub fn parse_reference_record(
    record: &StringRecord,
    layout: &ReferenceLayout,
    row: usize,
) -> std::result::Result<ReferenceStationRecord, RowIssue> {
    let name = cell(record, layout.name);
    if name.is_empty() {
        return Err(RowIssue::new(
            row,
            IssueKind::MissingField,
            "Reference station name is blank",
        ));
    }

    let parsed = (|| -> Result<ReferenceStationRecord> {
        ReferenceStationRecord::new(
            name,
            parse_number(record, layout.latitude, "latitude")?,
            parse_number(record, layout.longitude, "longitude")?,
            parse_count(record, layout.attraction_count, "attraction_count")?,
            parse_number(record, layout.dist_to_bikelane, "dist_to_bikelane")?,
            parse_number(record, layout.dist_to_park, "dist_to_park")?,
        )
    })();

    parsed.map_err(|e| RowIssue::from_error(row, &e))
}

/// Parse one query catalog row
///
/// Blank names are kept: such a row can still link through the geo fallback.
pub fn parse_query_record(
    record: &StringRecord,
    layout: &QueryLayout,
    row: usize,
) -> std::result::Result<StationRecord, RowIssue> {
    let parsed = (|| -> Result<StationRecord> {
        StationRecord::new(
            cell(record, layout.name),
            parse_number(record, layout.latitude, "latitude")?,
            parse_number(record, layout.longitude, "longitude")?,
        )
    })();

    parsed.map_err(|e| RowIssue::from_error(row, &e))
}
