//! Link command: enrich a query catalog from a reference catalog

use super::shared::load_configuration;
use crate::app::services::catalog_index::{CatalogIndex, load_query_catalog, load_reference_catalog};
use crate::app::services::station_matcher::{
    MatchDiagnostic, MatchReport, StationMatcher, write_enriched_csv, write_report_json,
};
use crate::cli::args::LinkArgs;
use anyhow::{Context, Result, bail};
use colored::Colorize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Number of unmatched names listed in the console summary
const UNMATCHED_PREVIEW: usize = 10;

/// Run the link command
pub async fn run_link(args: LinkArgs) -> Result<()> {
    let start_time = Instant::now();
    let config = load_configuration(&args.common, |config| args.apply_overrides(config))?;
    let matching = &config.matching;

    let (records, reference_stats) =
        load_reference_catalog(&args.reference, &matching.reference_columns)
            .await
            .with_context(|| {
                format!("Failed to load reference catalog '{}'", args.reference.display())
            })?;
    info!("Reference catalog: {}", reference_stats.summary());
    if records.is_empty() {
        bail!(
            "Reference catalog '{}' has no usable rows",
            args.reference.display()
        );
    }

    let (catalog, query_stats) = load_query_catalog(&args.query, &matching.query_columns)
        .await
        .with_context(|| format!("Failed to load query catalog '{}'", args.query.display()))?;
    info!("Query catalog: {}", query_stats.summary());
    if query_stats.rows_skipped > 0 {
        warn!(
            "{} query rows are unreadable or have unusable coordinates and will be marked invalid",
            query_stats.rows_skipped
        );
    }

    let index = Arc::new(CatalogIndex::build(records, matching.geo_threshold_degrees));
    info!("{}", index.metadata().summary());

    let matcher = StationMatcher::new(Arc::clone(&index), matching.clone());
    let report = matcher.match_catalog(&catalog, args.common.show_progress())?;

    write_enriched_csv(
        &args.output,
        &catalog,
        &report,
        &index,
        &matching.output_columns,
    )
    .await
    .with_context(|| format!("Failed to write enriched catalog '{}'", args.output.display()))?;

    if let Some(report_path) = &args.report {
        write_report_json(report_path, &report)
            .await
            .with_context(|| format!("Failed to write match report '{}'", report_path.display()))?;
    }

    if !args.common.quiet {
        print_link_summary(&report, &args, start_time.elapsed().as_secs_f64());
    }

    Ok(())
}

fn print_link_summary(report: &MatchReport, args: &LinkArgs, seconds: f64) {
    println!("\n{}", "Station linkage complete".green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   • Query rows: {}", report.total);
    println!("   • Matched by name: {}", report.exact_name);
    println!("   • Matched by location: {}", report.geo_fallback);
    println!(
        "   • Match rate: {}",
        format!("{:.1}%", report.match_rate()).bold()
    );
    println!("   • Processing time: {:.2}s", seconds);

    if report.unmatched > 0 {
        println!(
            "{}",
            format!(
                "⚠️  Unmatched rows: {} ({} invalid)",
                report.unmatched, report.invalid
            )
            .yellow()
        );
        for name in report.unmatched_names.iter().take(UNMATCHED_PREVIEW) {
            println!("     - {}", name);
        }
        if report.unmatched_names.len() > UNMATCHED_PREVIEW {
            println!(
                "     ... and {} more",
                report.unmatched_names.len() - UNMATCHED_PREVIEW
            );
        }
    }

    let ambiguous = report.ambiguous_count();
    if ambiguous > 0 {
        println!(
            "{}",
            format!("⚠️  Ambiguous name matches: {}", ambiguous).yellow()
        );
        for diagnostic in &report.diagnostics {
            if let MatchDiagnostic::Ambiguous {
                name, reference_ids, ..
            } = diagnostic
            {
                println!("     - {} (reference rows {:?})", name, reference_ids);
            }
        }
    }

    println!("\n📁 Output Files:");
    println!("   • {}", args.output.display());
    if let Some(report_path) = &args.report {
        println!("   • {}", report_path.display());
    }
    println!();
}
