//! Command-line argument definitions for the station reconciler
//!
//! This module defines the CLI interface using the clap derive API. Every
//! subcommand flattens [`CommonArgs`] so `--config`, `-v` and `--quiet` behave
//! the same everywhere.

use crate::config::{Config, MatchStrategy};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the station reconciler
///
/// Links bike-share station catalogs and turns partial prediction requests
/// into the feature vectors a demand model expects.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "station-reconciler",
    version,
    about = "Link bike-share station catalogs and reconcile demand model features",
    long_about = "Links a query station catalog to a reference catalog that shares no stable key, \
                  by normalized name with a distance-bounded geographic fallback, and reconciles \
                  partially populated prediction requests into the complete, ordered feature \
                  vector a model variant expects."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Enrich a query catalog with attributes from a reference catalog
    Link(LinkArgs),
    /// Reconcile prediction requests into canonical feature vectors
    Reconcile(ReconcileArgs),
    /// Reconcile requests and predict arrivals and departures
    Predict(PredictArgs),
}

/// Flags shared by every subcommand
#[derive(Debug, Clone, ClapArgs)]
pub struct CommonArgs {
    /// Configuration file (TOML)
    ///
    /// When omitted, the user config directory is checked for
    /// station-reconciler/config.toml and used if it exists.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Configuration file (TOML)"
    )]
    pub config_file: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Verbose output (-v info, -vv debug, -vvv trace)"
    )]
    pub verbose: u8,

    /// Quiet mode: errors only, no progress bars
    #[arg(
        short = 'q',
        long = "quiet",
        conflicts_with = "verbose",
        help = "Quiet mode (errors only)"
    )]
    pub quiet: bool,
}

impl CommonArgs {
    /// Map -v/-q flags onto a tracing level name
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Spatial lookup used by the geo fallback, as a CLI value
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Uniform grid around the query cell
    Grid,
    /// Full linear scan of the reference catalog
    Scan,
}

impl From<StrategyArg> for MatchStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Grid => MatchStrategy::Grid,
            StrategyArg::Scan => MatchStrategy::Scan,
        }
    }
}

/// Arguments for the link command
#[derive(Debug, Clone, Parser)]
pub struct LinkArgs {
    /// Reference catalog CSV carrying the enrichment attributes
    #[arg(
        short = 'r',
        long = "reference",
        value_name = "CSV",
        help = "Reference catalog CSV"
    )]
    pub reference: PathBuf,

    /// Query catalog CSV to enrich
    ///
    /// All columns are preserved in the output; the enrichment columns are
    /// overwritten for matched rows and appended when absent.
    #[arg(
        short = 'i',
        long = "query",
        value_name = "CSV",
        help = "Query catalog CSV to enrich"
    )]
    pub query: PathBuf,

    /// Enriched catalog output path
    #[arg(
        short = 'o',
        long = "output",
        value_name = "CSV",
        help = "Enriched catalog output path"
    )]
    pub output: PathBuf,

    /// Optional match report output (JSON)
    #[arg(long = "report", value_name = "JSON", help = "Write the match report as JSON")]
    pub report: Option<PathBuf>,

    /// Geo fallback threshold in decimal degrees (overrides config)
    #[arg(long = "threshold", value_name = "DEGREES")]
    pub threshold: Option<f64>,

    /// Geo fallback lookup strategy (overrides config)
    #[arg(long = "strategy", value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Number of worker threads (overrides config)
    #[arg(short = 'w', long = "workers", value_name = "N")]
    pub workers: Option<usize>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the reconcile command
#[derive(Debug, Clone, Parser)]
pub struct ReconcileArgs {
    /// Request file: one JSON object or an array of objects
    #[arg(
        short = 'i',
        long = "input",
        value_name = "JSON",
        help = "Request file (object or array of objects)"
    )]
    pub input: PathBuf,

    /// Model variant whose feature manifest to reconcile against
    #[arg(long = "variant", value_name = "NAME")]
    pub variant: Option<String>,

    /// Write the result here instead of stdout
    #[arg(short = 'o', long = "output", value_name = "JSON")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the predict command
#[derive(Debug, Clone, Parser)]
pub struct PredictArgs {
    /// Request file: one JSON object or an array of objects
    #[arg(
        short = 'i',
        long = "input",
        value_name = "JSON",
        help = "Request file (object or array of objects)"
    )]
    pub input: PathBuf,

    /// Model variant whose feature manifest to reconcile against
    #[arg(long = "variant", value_name = "NAME")]
    pub variant: Option<String>,

    /// Model artifact (JSON); falls back to the heuristic predictor if unusable
    #[arg(short = 'm', long = "model", value_name = "JSON")]
    pub model: Option<PathBuf>,

    /// Fail instead of falling back when the model artifact cannot be used
    #[arg(long = "no-fallback")]
    pub no_fallback: bool,

    /// Write the result here instead of stdout
    #[arg(short = 'o', long = "output", value_name = "JSON")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl LinkArgs {
    /// Apply command-line overrides on top of the layered configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(threshold) = self.threshold {
            config.matching.geo_threshold_degrees = threshold;
        }
        if let Some(strategy) = self.strategy {
            config.matching.strategy = strategy.into();
        }
        if let Some(workers) = self.workers {
            config.matching.workers = workers;
        }
    }
}

impl ReconcileArgs {
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(variant) = &self.variant {
            config.reconciler.variant = variant.clone();
        }
    }
}

impl PredictArgs {
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(variant) = &self.variant {
            config.reconciler.variant = variant.clone();
        }
        if let Some(model) = &self.model {
            config.model.artifact_path = Some(model.clone());
        }
        if self.no_fallback {
            config.model.allow_fallback = false;
        }
    }
}
