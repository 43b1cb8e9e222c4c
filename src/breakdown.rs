//! Current allocation breakdown by ticker, sector or region.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::Error;
use crate::source::Snapshot;
use crate::types::BucketMode;
use crate::valuation::Valuation;

/// Label used for tickers without a classification.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Aggregation key for a breakdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakdownBy {
    #[default]
    Ticker,
    Sector,
    Region,
}

impl FromStr for BreakdownBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ticker" => Ok(BreakdownBy::Ticker),
            other => other.parse::<BucketMode>().map(BreakdownBy::from),
        }
    }
}

impl From<BucketMode> for BreakdownBy {
    fn from(mode: BucketMode) -> Self {
        match mode {
            BucketMode::Sector => BreakdownBy::Sector,
            BucketMode::Region => BreakdownBy::Region,
        }
    }
}

impl fmt::Display for BreakdownBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakdownBy::Ticker => write!(f, "ticker"),
            BreakdownBy::Sector => write!(f, "sector"),
            BreakdownBy::Region => write!(f, "region"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BreakdownItem {
    pub label: String,
    pub value: f64,
    pub weight: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Breakdown {
    pub base_currency: String,
    pub mode: BreakdownBy,
    pub items: Vec<BreakdownItem>,
}

/// Aggregate current values by label; weights are relative to invested NAV.
///
/// Items are sorted by weight descending, ties by label.
pub fn breakdown(valuation: &Valuation, snapshot: &Snapshot, by: BreakdownBy) -> Breakdown {
    let mut totals: FxHashMap<String, f64> = FxHashMap::default();
    for pos in &valuation.positions {
        let class = snapshot.classification(&pos.ticker);
        let label = match by {
            BreakdownBy::Ticker => pos.ticker.as_str(),
            BreakdownBy::Sector => class.map_or(UNKNOWN_LABEL, |c| c.sector.as_str()),
            BreakdownBy::Region => class.map_or(UNKNOWN_LABEL, |c| c.region.as_str()),
        };
        *totals.entry(label.to_string()).or_insert(0.0) += pos.value;
    }

    let total: f64 = totals.values().sum();
    let mut items: Vec<BreakdownItem> = totals
        .into_iter()
        .map(|(label, value)| BreakdownItem {
            weight: if total > 0.0 { value / total } else { 0.0 },
            label,
            value,
        })
        .collect();
    items.sort_by(|a, b| {
        b.weight
            .total_cmp(&a.weight)
            .then_with(|| a.label.cmp(&b.label))
    });

    Breakdown {
        base_currency: valuation.base_currency.clone(),
        mode: by,
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::value_holdings;

    fn snap() -> Snapshot {
        Snapshot::new("USD")
            .with_holding("AAPL", 10.0, 100.0)
            .with_holding("MSFT", 10.0, 100.0)
            .with_holding("XOM", 10.0, 100.0)
            .with_holding("GLD", 10.0, 100.0)
            .with_quote("AAPL", 100.0, "USD")
            .with_quote("MSFT", 200.0, "USD")
            .with_quote("XOM", 300.0, "USD")
            .with_quote("GLD", 400.0, "USD")
            .with_classification("AAPL", "Technology", "United States")
            .with_classification("MSFT", "Technology", "United States")
            .with_classification("XOM", "Energy", "United States")
    }

    #[test]
    fn by_ticker() {
        let s = snap();
        let v = value_holdings(&s, 0.0).unwrap();
        let b = breakdown(&v, &s, BreakdownBy::Ticker);
        assert_eq!(b.items.len(), 4);
        assert_eq!(b.items[0].label, "GLD");
        assert!((b.items[0].weight - 0.4).abs() < 1e-12);
    }

    #[test]
    fn by_sector_with_unknown_bucket() {
        let s = snap();
        let v = value_holdings(&s, 0.0).unwrap();
        let b = breakdown(&v, &s, BreakdownBy::Sector);
        let labels: Vec<&str> = b.items.iter().map(|i| i.label.as_str()).collect();
        // Unknown 4000, Energy 3000, Technology 3000 (tie broken by label)
        assert_eq!(labels, vec!["Unknown", "Energy", "Technology"]);
        let sum: f64 = b.items.iter().map(|i| i.weight).sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn by_region() {
        let s = snap();
        let v = value_holdings(&s, 0.0).unwrap();
        let b = breakdown(&v, &s, BreakdownBy::Region);
        assert_eq!(b.items[0].label, "United States");
        assert!((b.items[0].value - 6000.0).abs() < 1e-9);
    }

    #[test]
    fn empty_portfolio() {
        let s = Snapshot::new("USD");
        let v = value_holdings(&s, 100.0).unwrap();
        let b = breakdown(&v, &s, BreakdownBy::Sector);
        assert!(b.items.is_empty());
    }

    #[test]
    fn parse_by() {
        assert_eq!("ticker".parse::<BreakdownBy>().unwrap(), BreakdownBy::Ticker);
        assert_eq!("Region".parse::<BreakdownBy>().unwrap(), BreakdownBy::Region);
        assert!("industry".parse::<BreakdownBy>().is_err());
    }
}
