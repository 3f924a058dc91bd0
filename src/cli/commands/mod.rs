//! Command implementations for the station reconciler CLI
//!
//! Each command lives in its own module:
//! - `link`: catalog linkage and enrichment
//! - `reconcile`: canonical feature vectors as JSON
//! - `predict`: feature reconciliation followed by demand prediction

pub mod link;
pub mod predict;
pub mod reconcile;
pub mod shared;

use crate::cli::args::Commands;
use anyhow::Result;

/// Main command runner
///
/// Logging is set up from the subcommand's own verbosity flags before it runs.
pub async fn run(command: Commands) -> Result<()> {
    let common = match &command {
        Commands::Link(link) => &link.common,
        Commands::Reconcile(reconcile) => &reconcile.common,
        Commands::Predict(predict) => &predict.common,
    };
    shared::setup_logging(common.get_log_level())?;

    match command {
        Commands::Link(link_args) => link::run_link(link_args).await,
        Commands::Reconcile(reconcile_args) => reconcile::run_reconcile(reconcile_args).await,
        Commands::Predict(predict_args) => predict::run_predict(predict_args).await,
    }
}
