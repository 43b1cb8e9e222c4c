//! Drift report: compare current weights against the request's targets.

use rustc_hash::FxHashMap;
use serde::Serialize;
use weightbook::target::TargetWeights;

/// Drift report comparing actual vs target weights.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub nav_with_cash: f64,
    pub entries: Vec<ReconcileEntry>,
    pub tracking_error_pct: f64,
}

/// One ticker's (or bucket's) drift.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileEntry {
    pub label: String,
    pub target_weight: f64,
    pub actual_weight: f64,
    /// `actual - target`
    pub drift: f64,
    pub actual_value: f64,
    pub target_value: f64,
}

/// Compare current values (by label) against target weights.
///
/// Weights are relative to `nav_with_cash`. Labels held but not targeted
/// show a target of zero. Entries are sorted by label.
pub fn reconcile(
    actual_values: &[(String, f64)],
    targets: &TargetWeights,
    nav_with_cash: f64,
) -> ReconcileReport {
    let mut actual_map: FxHashMap<&str, f64> = FxHashMap::default();
    for (label, value) in actual_values {
        *actual_map.entry(label.as_str()).or_insert(0.0) += value;
    }

    let mut labels: Vec<&str> = targets.iter().map(|(k, _)| k).collect();
    labels.extend(actual_map.keys().copied());
    labels.sort_unstable();
    labels.dedup();

    let mut entries = Vec::with_capacity(labels.len());
    let mut sum_sq_diff = 0.0_f64;

    for label in &labels {
        let target_weight = targets.get(label).unwrap_or(0.0);
        let actual_value = actual_map.get(label).copied().unwrap_or(0.0);
        let actual_weight = if nav_with_cash > 0.0 {
            actual_value / nav_with_cash
        } else {
            0.0
        };

        let drift = actual_weight - target_weight;
        sum_sq_diff += drift * drift;

        entries.push(ReconcileEntry {
            label: label.to_string(),
            target_weight,
            actual_weight,
            drift,
            actual_value,
            target_value: target_weight * nav_with_cash,
        });
    }

    let tracking_error_pct = (sum_sq_diff / labels.len().max(1) as f64).sqrt() * 100.0;

    ReconcileReport {
        nav_with_cash,
        entries,
        tracking_error_pct,
    }
}

impl std::fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "DRIFT (NAV with cash {:.2}):", self.nav_with_cash)?;
        writeln!(
            f,
            "  {:16} {:>10} {:>10} {:>10} {:>14} {:>14}",
            "Label", "Target%", "Actual%", "Drift%", "TargetValue", "ActualValue"
        )?;
        for e in &self.entries {
            writeln!(
                f,
                "  {:16} {:>9.2}% {:>9.2}% {:>+9.2}% {:>14.2} {:>14.2}",
                e.label,
                e.target_weight * 100.0,
                e.actual_weight * 100.0,
                e.drift * 100.0,
                e.target_value,
                e.actual_value,
            )?;
        }
        writeln!(f, "\n  Tracking error: {:.3}%", self.tracking_error_pct)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weightbook::RawTarget;
    use weightbook::target::{TargetKind, normalize};

    fn targets(pairs: &[(&str, f64)]) -> TargetWeights {
        let raw: Vec<RawTarget> = pairs.iter().map(|(k, w)| RawTarget::new(k, *w)).collect();
        normalize(&raw, TargetKind::Ticker).unwrap()
    }

    #[test]
    fn perfect_match() {
        let report = reconcile(&[("AAPL".into(), 500.0)], &targets(&[("AAPL", 0.5)]), 1000.0);
        assert!(report.tracking_error_pct < 1e-9);
        assert_eq!(report.entries[0].target_value, 500.0);
    }

    #[test]
    fn missing_position() {
        let report = reconcile(&[], &targets(&[("AAPL", 0.5)]), 1000.0);
        assert!((report.tracking_error_pct - 50.0).abs() < 1e-9);
        assert_eq!(report.entries[0].actual_value, 0.0);
    }

    #[test]
    fn extra_position() {
        let actual = vec![("AAPL".to_string(), 500.0), ("MSFT".to_string(), 250.0)];
        let report = reconcile(&actual, &targets(&[("AAPL", 0.5)]), 1000.0);
        let msft = report.entries.iter().find(|e| e.label == "MSFT").unwrap();
        assert_eq!(msft.target_weight, 0.0);
        assert_eq!(msft.actual_weight, 0.25);
        assert_eq!(msft.drift, 0.25);
    }

    #[test]
    fn zero_nav_reports_zero_weights() {
        let report = reconcile(&[("AAPL".into(), 0.0)], &targets(&[]), 0.0);
        assert_eq!(report.entries[0].actual_weight, 0.0);
        assert_eq!(report.tracking_error_pct, 0.0);
    }

    #[test]
    fn display_format() {
        let report = reconcile(&[("AAPL".into(), 490.0)], &targets(&[("AAPL", 0.5)]), 1000.0);
        let s = format!("{report}");
        assert!(s.contains("AAPL"));
        assert!(s.contains("-1.00%"));
        assert!(s.contains("Tracking error"));
    }
}
