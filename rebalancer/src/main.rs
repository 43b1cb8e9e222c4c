//! CLI entry point for the weightbook rebalancer.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use weightbook::BreakdownBy;
use weightbook_rebalancer::commands::{self, SuggestOptions};
use weightbook_rebalancer::config::Config;
use weightbook_rebalancer::error::Error;

#[derive(Parser)]
#[command(name = "rebalancer")]
#[command(about = "Rebalancing suggestions: target weights + snapshot -> lot-rounded trades")]
#[command(version)]
struct Cli {
    /// Path to config.toml
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Path to snapshot.json (holdings, quotes, FX, classifications, candidates)
    #[arg(long, global = true, default_value = "snapshot.json")]
    snapshot: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute and display rebalance suggestions
    Suggest {
        /// Path to the request JSON (ticker or bucket targets)
        request: PathBuf,

        /// Print the response JSON instead of the plan table
        #[arg(long)]
        json: bool,

        /// Also write the response JSON to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Overwrite --output without asking
        #[arg(long)]
        force: bool,
    },

    /// Show the current allocation by ticker, sector or region
    Breakdown {
        #[arg(long, default_value = "ticker")]
        by: BreakdownBy,
    },

    /// Compare current weights against a request's targets
    Reconcile {
        /// Path to the request JSON
        request: PathBuf,
    },

    /// Show current positions valued at snapshot prices
    Positions,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Suggest {
            request,
            json,
            output,
            force,
        } => {
            let opts = SuggestOptions {
                snapshot_file: cli.snapshot,
                json,
                output,
                force,
            };
            commands::suggest(&config, &request, &opts).map(|_| ())
        }
        Command::Breakdown { by } => commands::show_breakdown(&config, &cli.snapshot, by),
        Command::Reconcile { request } => {
            commands::run_reconcile(&config, &request, &cli.snapshot).map(|_| ())
        }
        Command::Positions => commands::show_positions(&config, &cli.snapshot),
    };

    if let Err(e) = result {
        match &e {
            Error::Engine(inner) => {
                eprintln!("Rejected ({}): {inner}", inner.field());
                process::exit(2);
            }
            Error::Aborted(msg) => {
                eprintln!("{msg}");
                process::exit(0);
            }
            _ => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }
}
