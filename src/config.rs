//! Configuration management and validation.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables, then command-line overrides applied by the CLI.
//! [`Config::validate`] runs last and rejects combinations that cannot work.

use crate::app::services::feature_reconciler::VariantSpec;
use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_GEO_THRESHOLD_DEGREES, DEFAULT_VARIANT, ENV_MODEL,
    ENV_THRESHOLD, ENV_VARIANT, MIN_GEO_THRESHOLD_DEGREES, output_columns, query_columns,
    reference_columns,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog linkage settings
    pub matching: MatchingConfig,

    /// Request reconciliation settings
    pub reconciler: ReconcilerConfig,

    /// Model artifact settings
    pub model: ModelConfig,
}

/// How the geo fallback searches the reference catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Bucket reference rows into a uniform grid and search neighbouring cells
    Grid,
    /// Compare against every reference row
    Scan,
}

/// Catalog linkage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Geo fallback acceptance threshold in decimal degrees (exclusive)
    pub geo_threshold_degrees: f64,

    /// Geo fallback search strategy
    pub strategy: MatchStrategy,

    /// Number of worker threads for batch matching and reconciliation
    pub workers: usize,

    /// Reference catalog column names
    pub reference_columns: ReferenceColumns,

    /// Query catalog column names
    pub query_columns: QueryColumns,

    /// Enrichment column names written to the query catalog
    pub output_columns: OutputColumns,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            geo_threshold_degrees: DEFAULT_GEO_THRESHOLD_DEGREES,
            strategy: MatchStrategy::Grid,
            workers: num_cpus::get(),
            reference_columns: ReferenceColumns::default(),
            query_columns: QueryColumns::default(),
            output_columns: OutputColumns::default(),
        }
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Reference catalog columns; each entry lists accepted header names in
/// priority order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceColumns {
    pub name: Vec<String>,
    pub latitude: Vec<String>,
    pub longitude: Vec<String>,
    pub attraction_count: Vec<String>,
    pub dist_to_bikelane: Vec<String>,
    pub dist_to_park: Vec<String>,
}

impl Default for ReferenceColumns {
    fn default() -> Self {
        Self {
            name: owned(reference_columns::NAME),
            latitude: owned(reference_columns::LATITUDE),
            longitude: owned(reference_columns::LONGITUDE),
            attraction_count: owned(reference_columns::ATTRACTION_COUNT),
            dist_to_bikelane: owned(reference_columns::DIST_TO_BIKELANE),
            dist_to_park: owned(reference_columns::DIST_TO_PARK),
        }
    }
}

/// Query catalog columns
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryColumns {
    pub name: String,
    pub latitude: String,
    pub longitude: String,
}

impl Default for QueryColumns {
    fn default() -> Self {
        Self {
            name: query_columns::NAME.to_string(),
            latitude: query_columns::LATITUDE.to_string(),
            longitude: query_columns::LONGITUDE.to_string(),
        }
    }
}

/// Output columns receiving matched enrichment values, addressed by name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputColumns {
    pub attraction_count: String,
    pub dist_to_bikelane: String,
    pub dist_to_park: String,
    pub match_method: String,
    pub matched_station: String,
}

impl Default for OutputColumns {
    fn default() -> Self {
        Self {
            attraction_count: output_columns::ATTRACTION_COUNT.to_string(),
            dist_to_bikelane: output_columns::DIST_TO_BIKELANE.to_string(),
            dist_to_park: output_columns::DIST_TO_PARK.to_string(),
            match_method: output_columns::MATCH_METHOD.to_string(),
            matched_station: output_columns::MATCHED_STATION.to_string(),
        }
    }
}

impl OutputColumns {
    fn names(&self) -> [&str; 5] {
        [
            &self.attraction_count,
            &self.dist_to_bikelane,
            &self.dist_to_park,
            &self.match_method,
            &self.matched_station,
        ]
    }
}

/// Request reconciliation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Model variant whose feature manifest requests are reconciled against
    pub variant: String,

    /// Additional variants, or replacements for built-in ones with the same name
    pub variants: Vec<VariantSpec>,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            variant: DEFAULT_VARIANT.to_string(),
            variants: Vec::new(),
        }
    }
}

/// Model artifact configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the primary model artifact (JSON)
    pub artifact_path: Option<PathBuf>,

    /// Use the heuristic predictor when the primary cannot be constructed
    pub allow_fallback: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: None,
            allow_fallback: true,
        }
    }
}

impl Config {
    /// Default configuration file location (`<config dir>/station-reconciler/config.toml`)
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| Error::configuration("Could not determine user config directory"))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(
                format!("Failed to read config file '{}'", path.display()),
                e,
            )
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Build configuration from defaults, an optional file and the process environment
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => {
                debug!("Loading configuration file: {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides(std::env::vars())?;
        Ok(config)
    }

    /// Apply recognised environment variables from an iterator of (key, value)
    pub fn apply_env_overrides<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                ENV_THRESHOLD => {
                    self.matching.geo_threshold_degrees =
                        value.trim().parse::<f64>().map_err(|_| {
                            Error::configuration(format!(
                                "{} must be a number, got '{}'",
                                ENV_THRESHOLD, value
                            ))
                        })?;
                    debug!("Threshold overridden from environment: {}", value);
                }
                ENV_VARIANT => {
                    self.reconciler.variant = value.trim().to_string();
                    debug!("Variant overridden from environment: {}", value);
                }
                ENV_MODEL => {
                    self.model.artifact_path = Some(PathBuf::from(value.trim()));
                    debug!("Model artifact overridden from environment: {}", value);
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Validate configuration for consistency
    pub fn validate(&self) -> Result<()> {
        let threshold = self.matching.geo_threshold_degrees;
        if !threshold.is_finite() || threshold < MIN_GEO_THRESHOLD_DEGREES {
            return Err(Error::configuration(format!(
                "Geo threshold must be at least {} degrees, got {}",
                MIN_GEO_THRESHOLD_DEGREES, threshold
            )));
        }

        if self.matching.workers == 0 {
            return Err(Error::configuration(
                "Number of workers must be greater than 0",
            ));
        }

        let reference = &self.matching.reference_columns;
        for (label, names) in [
            ("name", &reference.name),
            ("latitude", &reference.latitude),
            ("longitude", &reference.longitude),
            ("attraction_count", &reference.attraction_count),
            ("dist_to_bikelane", &reference.dist_to_bikelane),
            ("dist_to_park", &reference.dist_to_park),
        ] {
            if names.iter().all(|name| name.trim().is_empty()) {
                return Err(Error::configuration(format!(
                    "Reference column '{}' needs at least one header name",
                    label
                )));
            }
        }

        let outputs = self.matching.output_columns.names();
        for (i, name) in outputs.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(Error::configuration("Output column names cannot be empty"));
            }
            if outputs[..i].contains(name) {
                return Err(Error::configuration(format!(
                    "Output column '{}' is assigned twice",
                    name
                )));
            }
        }

        if self.reconciler.variant.trim().is_empty() {
            return Err(Error::configuration("Model variant cannot be empty"));
        }

        for variant in &self.reconciler.variants {
            variant.validate()?;
        }

        Ok(())
    }
}
