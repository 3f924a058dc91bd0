//! Data models for station catalog linkage
//!
//! This module contains the core data structures for representing query and
//! reference station records and the per-row outcome of matching one against
//! the other.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// =============================================================================
// Coordinates
// =============================================================================

/// Raw latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::invalid_numeric("latitude", latitude.to_string()));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::invalid_numeric("longitude", longitude.to_string()));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

// =============================================================================
// Station Records
// =============================================================================

/// Station on the query side of a linkage pass
///
/// Built from one row of the query catalog and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StationRecord {
    /// Display name as it appears in the query catalog
    pub name: String,

    /// Station location
    pub coordinate: Coordinate,
}

impl StationRecord {
    /// Create a query station record with validation
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            coordinate: Coordinate::new(latitude, longitude)?,
        })
    }
}

/// Station in the reference catalog, carrying the enrichment values that
/// a successful match copies onto the query row
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReferenceStationRecord {
    /// Station name as published by the reference source
    pub name: String,

    /// Station location
    pub coordinate: Coordinate,

    /// Number of tourist attractions within 500 m
    pub attraction_count: u32,

    /// Distance to the nearest bike lane in metres
    pub dist_to_bikelane: f64,

    /// Distance to the nearest park in metres
    pub dist_to_park: f64,
}

impl ReferenceStationRecord {
    /// Create a reference station record with validation
    pub fn new(
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        attraction_count: u32,
        dist_to_bikelane: f64,
        dist_to_park: f64,
    ) -> Result<Self> {
        let record = Self {
            name: name.into(),
            coordinate: Coordinate::new(latitude, longitude)?,
            attraction_count,
            dist_to_bikelane,
            dist_to_park,
        };

        record.validate()?;
        Ok(record)
    }

    /// Validate enrichment values
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::catalog("Reference station name cannot be empty"));
        }

        if !self.dist_to_bikelane.is_finite() {
            return Err(Error::invalid_numeric(
                "dist_to_bikelane",
                self.dist_to_bikelane.to_string(),
            ));
        }

        if !self.dist_to_park.is_finite() {
            return Err(Error::invalid_numeric(
                "dist_to_park",
                self.dist_to_park.to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Match Results
// =============================================================================

/// How a query row was linked to the reference catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Normalized names are equal
    ExactName,
    /// Nearest reference row within the distance threshold
    GeoFallback,
    /// Neither strategy produced a candidate
    Unmatched,
}

impl MatchMethod {
    /// Label used in CSV output and reports
    pub fn as_str(self) -> &'static str {
        match self {
            MatchMethod::ExactName => "exact_name",
            MatchMethod::GeoFallback => "geo_fallback",
            MatchMethod::Unmatched => "unmatched",
        }
    }
}

impl FromStr for MatchMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "exact_name" => Ok(MatchMethod::ExactName),
            "geo_fallback" => Ok(MatchMethod::GeoFallback),
            "unmatched" => Ok(MatchMethod::Unmatched),
            other => Err(Error::configuration(format!(
                "Unknown match method: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of linking one query row
///
/// Exactly one result exists per query row. `reference_id` and `distance`
/// are both present unless the method is [`MatchMethod::Unmatched`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Position of the row in the query catalog
    pub query_id: usize,

    /// Position of the chosen row in the reference catalog
    pub reference_id: Option<usize>,

    /// Euclidean degree distance between the two coordinates
    pub distance: Option<f64>,

    pub method: MatchMethod,
}

impl MatchResult {
    pub fn exact_name(query_id: usize, reference_id: usize, distance: f64) -> Self {
        Self {
            query_id,
            reference_id: Some(reference_id),
            distance: Some(distance),
            method: MatchMethod::ExactName,
        }
    }

    pub fn geo_fallback(query_id: usize, reference_id: usize, distance: f64) -> Self {
        Self {
            query_id,
            reference_id: Some(reference_id),
            distance: Some(distance),
            method: MatchMethod::GeoFallback,
        }
    }

    pub fn unmatched(query_id: usize) -> Self {
        Self {
            query_id,
            reference_id: None,
            distance: None,
            method: MatchMethod::Unmatched,
        }
    }

    /// Check whether a reference row was chosen
    pub fn is_matched(&self) -> bool {
        self.reference_id.is_some()
    }
}

// =============================================================================
// Row Issues
// =============================================================================

/// Category of a per-row problem collected during a batch pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A numeric cell or field could not be parsed
    InvalidNumeric,
    /// A required feature had no value, derivation or default
    MissingFeature,
    /// A required text field was blank
    MissingField,
    /// Anything else that failed a single row
    Other,
}

/// A problem confined to one input row; the batch carries on without it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowIssue {
    /// Zero-based position of the row in its input
    pub row: usize,
    pub kind: IssueKind,
    pub message: String,
}

impl RowIssue {
    pub fn new(row: usize, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            row,
            kind,
            message: message.into(),
        }
    }

    /// Classify a crate error raised while handling a single row
    pub fn from_error(row: usize, error: &Error) -> Self {
        let kind = match error {
            Error::InvalidNumeric { .. } => IssueKind::InvalidNumeric,
            Error::MissingFeature { .. } => IssueKind::MissingFeature,
            _ => IssueKind::Other,
        };
        Self::new(row, kind, error.to_string())
    }
}
