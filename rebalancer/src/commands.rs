//! Command workflows: load → compute → display → audit.
//!
//! Each CLI subcommand is one function here; `main` only parses arguments
//! and maps errors to exit codes.

use std::path::{Path, PathBuf};

use log::{info, warn};
use weightbook::target::{TargetKind, normalize};
use weightbook::{
    BreakdownBy, RebalanceRequest, RebalanceResult, Snapshot, Valuation, breakdown, rebalance,
    value_holdings,
};

use crate::audit::{self, AuditLog};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::plan::Plan;
use crate::reconcile;
use crate::snapshot_file::SnapshotFile;

/// Options for a `suggest` run.
pub struct SuggestOptions {
    pub snapshot_file: PathBuf,
    /// Print the wire JSON instead of the plan table.
    pub json: bool,
    /// Also write the wire JSON to this file.
    pub output: Option<PathBuf>,
    /// Overwrite `output` without asking.
    pub force: bool,
}

/// Load a request file, filling omitted fields from the config defaults.
pub fn load_request(path: &Path, config: &Config) -> Result<RebalanceRequest> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::RequestRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let request = RebalanceRequest::from_json_with_defaults(&contents, &config.request_defaults())?;
    Ok(request)
}

/// Load a snapshot file and freeze it.
pub fn load_snapshot(path: &Path, config: &Config) -> Result<Snapshot> {
    let file = SnapshotFile::load(path, &config.portfolio.base_currency)?;
    Ok(file.snapshot())
}

/// Compute suggestions for one request, audited end to end.
///
/// A run that fails after the audit log is open is recorded as `run_failed`.
pub fn suggest(config: &Config, request_file: &Path, opts: &SuggestOptions) -> Result<RebalanceResult> {
    let mut audit = AuditLog::open(&config.audit_path())?;
    audit::log_run_started(
        &mut audit,
        "suggest",
        Some(&request_file.display().to_string()),
        &opts.snapshot_file.display().to_string(),
    )?;

    match run_suggest(config, request_file, opts, &mut audit) {
        Ok(result) => Ok(result),
        Err(e) => {
            audit::log_run_failed(&mut audit, &e)?;
            Err(e)
        }
    }
}

fn run_suggest(
    config: &Config,
    request_file: &Path,
    opts: &SuggestOptions,
    audit: &mut AuditLog,
) -> Result<RebalanceResult> {
    let request = load_request(request_file, config)?;
    let snapshot = load_snapshot(&opts.snapshot_file, config)?;
    audit::log_snapshot_loaded(audit, &snapshot)?;
    info!(
        "snapshot: {} holdings, {} quotes, base {}",
        snapshot.holdings.len(),
        snapshot.quotes.len(),
        snapshot.base_currency
    );

    let result = rebalance(&request, &snapshot)?;

    for omission in &result.omissions {
        warn!("omitted: {omission}");
    }
    audit::log_targets_omitted(audit, &result.omissions)?;
    audit::log_suggestions(audit, &result)?;

    let json = result
        .to_json()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    if opts.json {
        println!("{json}");
    } else {
        let valuation = value_holdings(&snapshot, request.constraints().extra_cash)?;
        display_positions(&valuation);
        println!();
        print!("{}", Plan::new(&result, &config.cost));
    }

    if let Some(path) = &opts.output {
        write_output(path, &json, opts.force)?;
        info!("suggestions written to {}", path.display());
    }

    audit::log_run_completed(audit, result.suggestions.len(), result.turnover())?;
    info!(
        "{} suggestions, turnover {:.2}. Audit logged to {}",
        result.suggestions.len(),
        result.turnover(),
        config.audit_path().display()
    );
    Ok(result)
}

/// Show the current breakdown by ticker, sector or region.
pub fn show_breakdown(config: &Config, snapshot_file: &Path, by: BreakdownBy) -> Result<()> {
    let snapshot = load_snapshot(snapshot_file, config)?;
    let valuation = value_holdings(&snapshot, 0.0)?;
    let b = breakdown(&valuation, &snapshot, by);

    println!("BREAKDOWN BY {} ({}):", by.to_string().to_uppercase(), b.base_currency);
    if b.items.is_empty() {
        println!("  No positions.");
        return Ok(());
    }
    for item in &b.items {
        println!(
            "  {:24} {:>14.2}  ({:>5.1}%)",
            item.label,
            item.value,
            item.weight * 100.0
        );
    }
    Ok(())
}

/// Show current positions valued at snapshot prices.
pub fn show_positions(config: &Config, snapshot_file: &Path) -> Result<()> {
    let snapshot = load_snapshot(snapshot_file, config)?;
    let valuation = value_holdings(&snapshot, 0.0)?;
    display_positions(&valuation);
    Ok(())
}

/// Compare current weights against a request's targets.
///
/// Ticker requests compare per ticker; bucket requests compare per bucket
/// label, with unclassified holdings under "Unknown".
pub fn run_reconcile(
    config: &Config,
    request_file: &Path,
    snapshot_file: &Path,
) -> Result<reconcile::ReconcileReport> {
    let request = load_request(request_file, config)?;
    let snapshot = load_snapshot(snapshot_file, config)?;
    let valuation = value_holdings(&snapshot, request.constraints().extra_cash)?;

    let (targets, actual) = match request.mode() {
        None => {
            let targets = normalize(request.targets(), TargetKind::Ticker)?;
            let actual: Vec<(String, f64)> = valuation
                .positions
                .iter()
                .map(|p| (p.ticker.to_string(), p.value))
                .collect();
            (targets, actual)
        }
        Some(mode) => {
            let targets = normalize(request.targets(), TargetKind::Bucket)?;
            let actual: Vec<(String, f64)> = breakdown(&valuation, &snapshot, mode.into())
                .items
                .into_iter()
                .map(|i| (i.label, i.value))
                .collect();
            (targets, actual)
        }
    };

    let report = reconcile::reconcile(&actual, &targets, valuation.nav_with_cash);
    print!("{report}");
    Ok(report)
}

// === Helpers ===

fn display_positions(valuation: &Valuation) {
    if valuation.positions.is_empty() {
        println!("No positions.");
        return;
    }

    println!("CURRENT PORTFOLIO ({}):", valuation.base_currency);
    for pos in &valuation.positions {
        let weight = valuation.weight_of(&pos.ticker);
        println!(
            "  {:8} {:>10} @ {:>9.2} (avg {:>9.2}) = {:>12.2}  ({:.1}%)",
            pos.ticker,
            pos.quantity,
            pos.price,
            pos.avg_price,
            pos.value,
            weight * 100.0,
        );
    }
    println!(
        "  NAV {:.2} (with cash {:.2})",
        valuation.nav, valuation.nav_with_cash
    );
}

/// Write the result JSON, asking before replacing an existing file.
pub fn write_output(path: &Path, json: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("{} exists. Overwrite?", path.display()))
            .default(false)
            .interact()
            .map_err(|e| Error::Aborted(format!("confirmation prompt failed: {e}")))?;
        if !confirmed {
            return Err(Error::Aborted(format!("{} left unchanged", path.display())));
        }
    }
    std::fs::write(path, format!("{json}\n")).map_err(|e| Error::Output {
        path: path.to_path_buf(),
        source: e,
    })
}
