//! Station Reconciler Library
//!
//! Prepares inputs for a bike-share demand model from two loosely related
//! sources of truth:
//!
//! - Linking a query station catalog against a reference catalog that shares
//!   no stable key, by normalized name with geographic tie-breaking and a
//!   distance-bounded nearest-neighbour fallback
//! - Reconciling partially populated prediction requests into the complete,
//!   ordered feature vector a given model variant expects
//! - Loading the model artifact at startup, with an explicit heuristic fallback
//!
//! All matching and reconciliation work is pure over its inputs. Catalog and
//! request I/O happens in the loaders and CLI commands around it.

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod catalog_index;
        pub mod feature_reconciler;
        pub mod geo;
        pub mod predictor;
        pub mod station_matcher;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{Coordinate, MatchMethod, MatchResult, ReferenceStationRecord, StationRecord};
pub use config::Config;

/// Result type alias for reconciliation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for catalog linkage, feature reconciliation and prediction
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error
    #[error("CSV parsing error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// JSON encoding or decoding error
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A coordinate, distance, temperature or time field could not be read as a number
    #[error("Invalid numeric value for '{field}': '{value}'")]
    InvalidNumeric { field: String, value: String },

    /// Required features have no value and no derivation or default applies
    #[error("Missing features for model variant '{variant}': {}", fields.join(", "))]
    MissingFeature { variant: String, fields: Vec<String> },

    /// Model variant is not defined
    #[error("Unknown model variant: {name}")]
    UnknownVariant { name: String },

    /// Model artifact could not be loaded or does not fit the feature manifest
    #[error("Model artifact error: {message}")]
    ModelArtifact { message: String },

    /// Catalog content is unusable as a whole
    #[error("Catalog error: {message}")]
    Catalog { message: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a JSON error with context
    pub fn json(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid numeric error
    pub fn invalid_numeric(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidNumeric {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a missing feature error naming every absent field
    pub fn missing_feature(variant: impl Into<String>, fields: Vec<String>) -> Self {
        Self::MissingFeature {
            variant: variant.into(),
            fields,
        }
    }

    /// Create an unknown variant error
    pub fn unknown_variant(name: impl Into<String>) -> Self {
        Self::UnknownVariant { name: name.into() }
    }

    /// Create a model artifact error
    pub fn model_artifact(message: impl Into<String>) -> Self {
        Self::ModelArtifact {
            message: message.into(),
        }
    }

    /// Create a catalog error
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Json {
            message: "JSON processing failed".to_string(),
            source: error,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration {
            message: format!("Invalid TOML: {}", error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_feature_names_every_field() {
        let error = Error::missing_feature(
            "nb",
            vec!["station_lat".to_string(), "station_lng".to_string()],
        );
        let message = error.to_string();
        assert!(message.contains("'nb'"));
        assert!(message.contains("station_lat, station_lng"));
    }

    #[test]
    fn test_invalid_numeric_display() {
        let error = Error::invalid_numeric("lat", "north-ish");
        assert_eq!(
            error.to_string(),
            "Invalid numeric value for 'lat': 'north-ish'"
        );
    }
}
