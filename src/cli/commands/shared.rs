//! Shared components for CLI commands
//!
//! Logging setup, layered configuration loading and the request/response file
//! handling used by more than one command.

use crate::app::services::feature_reconciler::{RequestEntry, VariantRegistry, VariantSpec, parse_requests};
use crate::cli::args::CommonArgs;
use crate::config::Config;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Set up tracing for the binary
///
/// `RUST_LOG` wins when set; otherwise the crate logs at the level chosen by
/// `-v`/`-q`.
pub fn setup_logging(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("station_reconciler={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using layered approach (file -> env -> args)
///
/// `apply_cli` receives the file/environment result and applies the
/// command's own flags before validation.
pub fn load_configuration<F>(common: &CommonArgs, apply_cli: F) -> Result<Config>
where
    F: FnOnce(&mut Config),
{
    info!("Loading configuration");

    let default_config_path = if common.config_file.is_none() {
        Config::default_config_path().ok()
    } else {
        None
    };

    let config_file = match &common.config_file {
        Some(path) => Some(path.as_path()),
        None => default_config_path
            .as_ref()
            .filter(|path| path.exists())
            .map(|path| path.as_path()),
    };

    match config_file {
        Some(path) => info!("Using config file: {}", path.display()),
        None => info!("No config file found, using defaults and environment variables"),
    }

    let mut config = Config::load_layered(config_file)?;
    apply_cli(&mut config);
    config.validate()?;

    Ok(config)
}

/// Look up the configured variant, honouring variants declared in config
pub fn resolve_variant(config: &Config) -> Result<VariantSpec> {
    let registry = VariantRegistry::with_overrides(&config.reconciler.variants)?;
    let spec = registry.get(&config.reconciler.variant)?;
    debug!(
        "Variant '{}' expects {} features",
        spec.name,
        spec.manifest.len()
    );
    Ok(spec.clone())
}

/// Read a request file holding one JSON object or an array of objects
///
/// Array elements that are not objects come back as per-row issues.
pub async fn read_requests(path: &Path) -> Result<Vec<RequestEntry>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read request file '{}'", path.display()))?;
    let requests = parse_requests(&content)
        .with_context(|| format!("Failed to parse request file '{}'", path.display()))?;
    let unreadable = requests.iter().filter(|entry| entry.is_err()).count();
    info!("Read {} requests from {}", requests.len(), path.display());
    if unreadable > 0 {
        warn!("{} requests in {} are not JSON objects", unreadable, path.display());
    }
    Ok(requests)
}

/// Pretty-print `value` as JSON to `output`, or to stdout when absent
pub async fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to encode output JSON")?;
    match output {
        Some(path) => {
            tokio::fs::write(path, format!("{}\n", json))
                .await
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// One-line status for stderr, so stdout stays clean JSON
pub fn print_status(failed: usize, message: &str) {
    if failed == 0 {
        eprintln!("{} {}", "✓".green().bold(), message);
    } else {
        eprintln!("{} {}", "!".yellow().bold(), message);
    }
}
