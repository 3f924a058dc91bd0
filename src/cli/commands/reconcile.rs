//! Reconcile command: print canonical feature vectors as JSON

use super::shared::{load_configuration, print_status, read_requests, resolve_variant, write_json};
use crate::app::models::RowIssue;
use crate::app::services::feature_reconciler::{CanonicalFeatures, FeatureReconciler, ReconcileStats};
use crate::cli::args::ReconcileArgs;
use anyhow::Result;
use serde::Serialize;

/// JSON document written by the reconcile command
///
/// `features` has one entry per request in input order; a request that could
/// not be reconciled is `null` there and listed in `issues`.
#[derive(Debug, Serialize)]
pub struct ReconcileOutput {
    pub variant: String,
    pub manifest: Vec<String>,
    pub features: Vec<Option<CanonicalFeatures>>,
    pub issues: Vec<RowIssue>,
    pub stats: ReconcileStats,
}

/// Run the reconcile command
pub async fn run_reconcile(args: ReconcileArgs) -> Result<()> {
    let config = load_configuration(&args.common, |config| args.apply_overrides(config))?;
    let spec = resolve_variant(&config)?;
    let requests = read_requests(&args.input).await?;

    let reconciler = FeatureReconciler::new(spec);
    let batch = reconciler.reconcile_entries(&requests, config.matching.workers)?;

    if !args.common.quiet {
        print_status(batch.stats.failed, &batch.stats.summary());
    }

    let output = ReconcileOutput {
        variant: reconciler.spec().name.clone(),
        manifest: reconciler.spec().manifest.clone(),
        features: batch.features,
        issues: batch.issues,
        stats: batch.stats,
    };
    write_json(&output, args.output.as_deref()).await
}
