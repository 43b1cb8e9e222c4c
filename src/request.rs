//! Rebalance request parsing.
//!
//! The wire payload comes in two shapes that differ only in how targets are
//! keyed (`ticker` vs `bucket`) and in the presence of `mode`. It is resolved
//! once, here, into the tagged [`RebalanceRequest`]; nothing downstream
//! inspects raw JSON again.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::{BucketMode, SeedSource};

/// One caller-supplied target: key plus the weight exactly as sent.
///
/// The weight stays unparsed until normalization so that a malformed entry
/// is reported against its key instead of failing the whole payload.
#[derive(Clone, Debug, PartialEq)]
pub struct RawTarget {
    pub key: String,
    pub weight: Value,
}

impl RawTarget {
    pub fn new(key: &str, weight: f64) -> Self {
        Self {
            key: key.to_string(),
            weight: serde_json::json!(weight),
        }
    }
}

/// Trading constraints shared by both request shapes.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraints {
    /// Cash added to investable capital, in base currency.
    pub extra_cash: f64,
    /// Orders with a smaller absolute notional (base currency) are dropped.
    pub min_order_value: f64,
    /// Quantity grid; every order is a whole number of lots.
    pub lot_size: i64,
    pub seed_source: SeedSource,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            extra_cash: 0.0,
            min_order_value: 0.0,
            lot_size: 1,
            seed_source: SeedSource::Watchlist,
        }
    }
}

impl Constraints {
    pub fn validate(&self) -> Result<()> {
        if self.lot_size <= 0 {
            return Err(Error::InvalidLotSize(self.lot_size as f64));
        }
        if !self.min_order_value.is_finite() || self.min_order_value < 0.0 {
            return Err(Error::InvalidMinOrder(self.min_order_value));
        }
        if !self.extra_cash.is_finite() || self.extra_cash < 0.0 {
            return Err(Error::InvalidCash(self.extra_cash));
        }
        Ok(())
    }
}

/// Values applied when a request omits an optional field.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestDefaults {
    pub min_order_value: f64,
    pub lot_size: i64,
    pub seed_source: SeedSource,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        let c = Constraints::default();
        Self {
            min_order_value: c.min_order_value,
            lot_size: c.lot_size,
            seed_source: c.seed_source,
        }
    }
}

/// A rebalance request, resolved into ticker or bucket mode.
#[derive(Clone, Debug, PartialEq)]
pub enum RebalanceRequest {
    Ticker {
        targets: Vec<RawTarget>,
        constraints: Constraints,
    },
    Bucket {
        mode: BucketMode,
        targets: Vec<RawTarget>,
        constraints: Constraints,
    },
}

#[derive(Deserialize)]
struct TickerTargetWire {
    ticker: String,
    target_weight: Value,
}

#[derive(Deserialize)]
struct BucketTargetWire {
    bucket: String,
    target_weight: Value,
}

#[derive(Deserialize)]
struct TickerWire {
    targets: Vec<TickerTargetWire>,
    cash: Option<f64>,
    min_order_value: Option<f64>,
    lot_size: Option<f64>,
    seed_source: Option<String>,
}

#[derive(Deserialize)]
struct BucketWire {
    mode: String,
    targets: Vec<BucketTargetWire>,
    cash: Option<f64>,
    min_order_value: Option<f64>,
    lot_size: Option<f64>,
    seed_source: Option<String>,
}

fn constraints(
    cash: Option<f64>,
    min_order_value: Option<f64>,
    lot_size: Option<f64>,
    seed_source: Option<String>,
    defaults: &RequestDefaults,
) -> Result<Constraints> {
    let seed_source = match seed_source {
        Some(s) => s.parse()?,
        None => defaults.seed_source,
    };
    let c = Constraints {
        extra_cash: cash.unwrap_or(0.0),
        min_order_value: min_order_value.unwrap_or(defaults.min_order_value),
        lot_size: match lot_size {
            Some(n) => whole_lot_size(n)?,
            None => defaults.lot_size,
        },
        seed_source,
    };
    c.validate()?;
    Ok(c)
}

/// Wire lot sizes arrive as JSON numbers; only positive whole numbers pass.
fn whole_lot_size(n: f64) -> Result<i64> {
    if n.is_finite() && n >= 1.0 && n.fract() == 0.0 && n <= i64::MAX as f64 {
        Ok(n as i64)
    } else {
        Err(Error::InvalidLotSize(n))
    }
}

impl RebalanceRequest {
    pub fn ticker(targets: Vec<RawTarget>, constraints: Constraints) -> Self {
        RebalanceRequest::Ticker {
            targets,
            constraints,
        }
    }

    pub fn bucket(mode: BucketMode, targets: Vec<RawTarget>, constraints: Constraints) -> Self {
        RebalanceRequest::Bucket {
            mode,
            targets,
            constraints,
        }
    }

    /// Parse a wire payload with the built-in defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_json_with_defaults(json, &RequestDefaults::default())
    }

    pub fn from_json_with_defaults(json: &str, defaults: &RequestDefaults) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value, defaults)
    }

    /// Resolve a parsed payload. The presence of `mode` selects bucket mode.
    pub fn from_value(value: Value, defaults: &RequestDefaults) -> Result<Self> {
        let is_bucket = value.get("mode").is_some_and(|m| !m.is_null());
        if is_bucket {
            let wire: BucketWire = serde_json::from_value(value)?;
            let mode = wire.mode.parse()?;
            let constraints = constraints(
                wire.cash,
                wire.min_order_value,
                wire.lot_size,
                wire.seed_source,
                defaults,
            )?;
            let targets = wire
                .targets
                .into_iter()
                .map(|t| RawTarget {
                    key: t.bucket,
                    weight: t.target_weight,
                })
                .collect();
            Ok(RebalanceRequest::Bucket {
                mode,
                targets,
                constraints,
            })
        } else {
            let wire: TickerWire = serde_json::from_value(value)?;
            let constraints = constraints(
                wire.cash,
                wire.min_order_value,
                wire.lot_size,
                wire.seed_source,
                defaults,
            )?;
            let targets = wire
                .targets
                .into_iter()
                .map(|t| RawTarget {
                    key: t.ticker,
                    weight: t.target_weight,
                })
                .collect();
            Ok(RebalanceRequest::Ticker {
                targets,
                constraints,
            })
        }
    }

    pub fn targets(&self) -> &[RawTarget] {
        match self {
            RebalanceRequest::Ticker { targets, .. } | RebalanceRequest::Bucket { targets, .. } => {
                targets
            }
        }
    }

    pub fn constraints(&self) -> &Constraints {
        match self {
            RebalanceRequest::Ticker { constraints, .. }
            | RebalanceRequest::Bucket { constraints, .. } => constraints,
        }
    }

    pub fn mode(&self) -> Option<BucketMode> {
        match self {
            RebalanceRequest::Ticker { .. } => None,
            RebalanceRequest::Bucket { mode, .. } => Some(*mode),
        }
    }
}
