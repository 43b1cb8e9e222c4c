//! JSONL audit trail logging.
//!
//! Each rebalancer run appends events to an audit.jsonl file,
//! one JSON object per line.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use weightbook::{Omission, RebalanceResult, Snapshot};

use crate::error::{Error, Result};

/// An audit event written to the JSONL trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event: &'static str,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub data: serde_json::Value,
}

/// Append-only audit logger.
pub struct AuditLog {
    writer: BufWriter<std::fs::File>,
}

impl AuditLog {
    /// Open (or create) the audit log file for appending.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Log an event with arbitrary JSON data.
    pub fn log(&mut self, event: &'static str, data: serde_json::Value) -> Result<()> {
        let entry = AuditEvent {
            event,
            ts: Utc::now(),
            data,
        };
        let json = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(self.writer, "{json}")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Log a simple event with no additional data.
    pub fn log_simple(&mut self, event: &'static str) -> Result<()> {
        self.log(event, serde_json::json!({}))
    }
}

/// Convenience: log a run start event.
pub fn log_run_started(
    audit: &mut AuditLog,
    command: &str,
    request_file: Option<&str>,
    snapshot_file: &str,
) -> Result<()> {
    audit.log(
        "run_started",
        serde_json::json!({
            "command": command,
            "request_file": request_file,
            "snapshot_file": snapshot_file,
        }),
    )
}

/// Convenience: log the frozen snapshot's holdings and universe size.
pub fn log_snapshot_loaded(audit: &mut AuditLog, snapshot: &Snapshot) -> Result<()> {
    let holdings: Vec<_> = snapshot
        .holdings
        .iter()
        .map(|h| {
            serde_json::json!({
                "ticker": h.ticker.as_str(),
                "qty": h.quantity,
                "avg_price": h.avg_price,
            })
        })
        .collect();

    audit.log(
        "snapshot_loaded",
        serde_json::json!({
            "base_currency": snapshot.base_currency,
            "holdings": holdings,
            "quotes": snapshot.quotes.len(),
            "watchlist": snapshot.watchlist.len(),
            "buy_signals": snapshot.buy_signals.len(),
        }),
    )
}

/// Convenience: log targets and holdings the engine left out.
///
/// Nothing is written when there are no omissions.
pub fn log_targets_omitted(audit: &mut AuditLog, omissions: &[Omission]) -> Result<()> {
    if omissions.is_empty() {
        return Ok(());
    }
    audit.log(
        "targets_omitted",
        serde_json::json!({ "omissions": omissions }),
    )
}

/// Convenience: log computed suggestions.
pub fn log_suggestions(audit: &mut AuditLog, result: &RebalanceResult) -> Result<()> {
    audit.log(
        "suggestions_computed",
        serde_json::json!({
            "mode": result.mode,
            "nav_with_cash": result.nav_with_cash,
            "suggestions": result.suggestions,
        }),
    )
}

/// Convenience: log run completion.
pub fn log_run_completed(audit: &mut AuditLog, suggestions: usize, turnover: f64) -> Result<()> {
    audit.log(
        "run_completed",
        serde_json::json!({
            "suggestions": suggestions,
            "turnover": turnover,
        }),
    )
}

/// Convenience: log a run that was rejected or could not finish.
pub fn log_run_failed(audit: &mut AuditLog, error: &Error) -> Result<()> {
    let field = match error {
        Error::Engine(inner) => Some(inner.field()),
        _ => None,
    };
    audit.log(
        "run_failed",
        serde_json::json!({
            "error": error.to_string(),
            "field": field,
        }),
    )
}
