//! Suggestion emission: the externally visible result of a computation.

use serde::Serialize;

use crate::side::Side;
use crate::solver::Order;
use crate::types::{BucketMode, Omission, Ticker};
use crate::valuation::Valuation;

/// One suggested trade.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Suggestion {
    pub ticker: Ticker,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    pub side: Side,
    /// Signed quantity change; a multiple of the lot size.
    pub qty_delta: i64,
    /// Signed base-currency value of `qty_delta`.
    pub notional_delta: f64,
    /// Native-currency last price used.
    pub price: f64,
}

/// Ordered suggestions with portfolio context.
///
/// Serializes to the wire response: `mode` appears only in bucket mode and
/// omissions are never serialized.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RebalanceResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<BucketMode>,
    pub base_currency: String,
    pub nav_with_cash: f64,
    pub suggestions: Vec<Suggestion>,
    #[serde(skip)]
    pub omissions: Vec<Omission>,
}

impl RebalanceResult {
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }

    pub fn buy_notional(&self) -> f64 {
        self.side_notional(Side::Buy)
    }

    pub fn sell_notional(&self) -> f64 {
        self.side_notional(Side::Sell)
    }

    /// Sum of absolute notionals.
    pub fn turnover(&self) -> f64 {
        self.suggestions.iter().map(|s| s.notional_delta.abs()).sum()
    }

    fn side_notional(&self, side: Side) -> f64 {
        self.suggestions
            .iter()
            .filter(|s| s.side == side)
            .map(|s| s.notional_delta.abs())
            .sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Assemble the result: sells first, then buys, each in solver order.
pub fn emit(
    orders: Vec<Order>,
    valuation: &Valuation,
    mode: Option<BucketMode>,
    omissions: Vec<Omission>,
) -> RebalanceResult {
    let (sells, buys): (Vec<Order>, Vec<Order>) =
        orders.into_iter().partition(|o| o.side == Side::Sell);

    let suggestions: Vec<Suggestion> = sells
        .into_iter()
        .chain(buys)
        .map(|o| Suggestion {
            ticker: o.ticker,
            bucket: if mode.is_some() { o.bucket } else { None },
            side: o.side,
            qty_delta: o.qty_delta,
            notional_delta: o.notional_delta,
            price: o.price,
        })
        .collect();

    RebalanceResult {
        mode,
        base_currency: valuation.base_currency.clone(),
        nav_with_cash: valuation.nav_with_cash,
        suggestions,
        omissions,
    }
}
