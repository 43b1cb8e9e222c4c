//! Target weight validation and normalization.

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::request::RawTarget;

/// What the target keys name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetKind {
    /// Keys are tickers: trimmed and upper-cased.
    Ticker,
    /// Keys are sector/region labels: trimmed, case preserved.
    Bucket,
}

/// Validated target weights in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetWeights {
    entries: Vec<(String, f64)>,
}

impl TargetWeights {
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, w)| (k.as_str(), *w))
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, w)| *w)
    }

    /// Sum of weights. May exceed 1.0; the remainder below 1.0 is cash.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    /// Fraction of capital left in cash (0 when over-allocated).
    pub fn cash_weight(&self) -> f64 {
        (1.0 - self.total()).max(0.0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_weight(key: &str, raw: &Value) -> Result<f64> {
    let invalid = |reason: String| Error::InvalidTarget {
        key: key.to_string(),
        reason,
    };
    let weight = match raw {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| invalid(format!("weight {n} is not representable")))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(format!("weight '{s}' is not a number")))?,
        other => return Err(invalid(format!("weight {other} is not a number"))),
    };
    if !weight.is_finite() {
        return Err(invalid(format!("weight {weight} is not finite")));
    }
    if weight < 0.0 {
        return Err(invalid(format!("weight {weight} is negative")));
    }
    Ok(weight)
}

fn normalize_key(key: &str, kind: TargetKind) -> String {
    match kind {
        TargetKind::Ticker => key.trim().to_ascii_uppercase(),
        TargetKind::Bucket => key.trim().to_string(),
    }
}

/// Validate raw targets into a weight map.
///
/// Duplicate keys: the last weight wins and the key keeps the position of
/// its first declaration. Sums above 1.0 are passed through unscaled.
pub fn normalize(raw: &[RawTarget], kind: TargetKind) -> Result<TargetWeights> {
    let mut entries: Vec<(String, f64)> = Vec::with_capacity(raw.len());
    let mut index: FxHashMap<String, usize> = FxHashMap::default();

    for target in raw {
        let key = normalize_key(&target.key, kind);
        if key.is_empty() {
            return Err(Error::InvalidTarget {
                key: target.key.clone(),
                reason: "key is empty".into(),
            });
        }
        let weight = parse_weight(&key, &target.weight)?;
        match index.get(&key) {
            Some(&i) => {
                log::warn!(
                    "duplicate target '{key}': {} replaced by {weight}",
                    entries[i].1
                );
                entries[i].1 = weight;
            }
            None => {
                index.insert(key.clone(), entries.len());
                entries.push((key, weight));
            }
        }
    }

    let weights = TargetWeights { entries };
    let total = weights.total();
    if total > 1.0 + 1e-9 {
        log::warn!(
            "target weights sum to {total:.4} (> 1.0); buys will be trimmed to available cash"
        );
    } else {
        log::debug!(
            "{} targets, sum {total:.4}, implicit cash {:.4}",
            weights.len(),
            weights.cash_weight()
        );
    }
    Ok(weights)
}
