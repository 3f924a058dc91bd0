use clap::Parser;
use station_reconciler::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    // No subcommand: show help and available commands
    let Some(command) = args.command else {
        show_help_and_commands();
        process::exit(0);
    };

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    match runtime.block_on(commands::run(command)) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Station Reconciler - bike-share catalog linkage and feature reconciliation");
    println!("==========================================================================");
    println!();
    println!("USAGE:");
    println!("    station-reconciler <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    link        Enrich a query catalog with attributes from a reference catalog");
    println!("    reconcile   Reconcile prediction requests into canonical feature vectors");
    println!("    predict     Reconcile requests and predict arrivals and departures");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Link the ridership catalog against the station attribute catalog:");
    println!("    station-reconciler link --reference stations.csv --query ridership.csv \\");
    println!("                            --output enriched.csv --report report.json");
    println!();
    println!("    # Reconcile requests for the weekhour variant:");
    println!("    station-reconciler reconcile --input requests.json --variant weekhour");
    println!();
    println!("    # Predict with a model artifact, falling back to the heuristic:");
    println!("    station-reconciler predict --input requests.json --model model.json");
    println!();
    println!("For detailed help on any command, use:");
    println!("    station-reconciler <COMMAND> --help");
}
