//! Portfolio valuation in the base currency.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::source::Snapshot;
use crate::types::Ticker;

/// Native price and FX multiplier resolved for one ticker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PricePoint {
    pub price: f64,
    pub fx_rate: f64,
}

impl PricePoint {
    /// Base-currency value of one unit.
    #[inline]
    pub fn unit_value(&self) -> f64 {
        self.price * self.fx_rate
    }
}

/// Look up a usable quote and its FX rate.
pub fn resolve_price(snapshot: &Snapshot, ticker: &Ticker) -> Result<PricePoint> {
    let quote = snapshot
        .quotes
        .get(ticker)
        .ok_or_else(|| Error::MissingPrice {
            ticker: ticker.clone(),
        })?;
    if !quote.price.is_finite() || quote.price <= 0.0 {
        return Err(Error::InvalidQuote {
            ticker: ticker.clone(),
            price: quote.price,
        });
    }
    let fx_rate = snapshot.fx_rate(&quote.currency)?;
    Ok(PricePoint {
        price: quote.price,
        fx_rate,
    })
}

/// One held position, valued.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionValue {
    pub ticker: Ticker,
    pub quantity: f64,
    pub avg_price: f64,
    pub price: f64,
    pub fx_rate: f64,
    /// quantity x price x fx_rate
    pub value: f64,
}

/// Holdings valued at the snapshot's prices.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Valuation {
    pub base_currency: String,
    pub positions: Vec<PositionValue>,
    pub nav: f64,
    pub nav_with_cash: f64,
    #[serde(skip)]
    index: FxHashMap<Ticker, usize>,
}

impl Valuation {
    /// Current base-currency value of a ticker (0 when not held).
    pub fn value_of(&self, ticker: &Ticker) -> f64 {
        self.position(ticker).map_or(0.0, |p| p.value)
    }

    pub fn position(&self, ticker: &Ticker) -> Option<&PositionValue> {
        self.index.get(ticker).map(|&i| &self.positions[i])
    }

    /// Current weight of a ticker relative to NAV including extra cash.
    pub fn weight_of(&self, ticker: &Ticker) -> f64 {
        if self.nav_with_cash > 0.0 {
            self.value_of(ticker) / self.nav_with_cash
        } else {
            0.0
        }
    }
}

/// Value every holding in the base currency and add `extra_cash` to NAV.
///
/// Fails on the first held ticker without a usable quote or FX rate. Repeated
/// rows for one ticker are merged by summing quantities.
pub fn value_holdings(snapshot: &Snapshot, extra_cash: f64) -> Result<Valuation> {
    let mut positions: Vec<PositionValue> = Vec::with_capacity(snapshot.holdings.len());
    let mut index: FxHashMap<Ticker, usize> = FxHashMap::default();

    for holding in &snapshot.holdings {
        let point = resolve_price(snapshot, &holding.ticker)?;
        match index.get(&holding.ticker) {
            Some(&i) => {
                let pos = &mut positions[i];
                pos.quantity += holding.quantity;
                pos.value = pos.quantity * point.unit_value();
            }
            None => {
                index.insert(holding.ticker.clone(), positions.len());
                positions.push(PositionValue {
                    ticker: holding.ticker.clone(),
                    quantity: holding.quantity,
                    avg_price: holding.avg_price,
                    price: point.price,
                    fx_rate: point.fx_rate,
                    value: holding.quantity * point.unit_value(),
                });
            }
        }
    }

    let nav: f64 = positions.iter().map(|p| p.value).sum();
    log::debug!(
        "valued {} positions: nav={nav:.2} extra_cash={extra_cash:.2} {}",
        positions.len(),
        snapshot.base_currency
    );

    Ok(Valuation {
        base_currency: snapshot.base_currency.clone(),
        positions,
        nav,
        nav_with_cash: nav + extra_cash,
        index,
    })
}
