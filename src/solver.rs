//! Allocation solver: dollar targets into lot-rounded, cash-feasible orders.
//!
//! For every allocation:
//!
//! 1. `delta = target - current` (base currency)
//! 2. `native_delta = delta / fx`
//! 3. `raw_qty = native_delta / price`
//! 4. truncate `raw_qty` toward zero onto the lot grid
//! 5. `notional = qty * price * fx`, recomputed from the rounded quantity
//! 6. drop orders with `|notional| < min_order_value`
//! 7. side from the sign of `qty`; zero emits nothing
//!
//! Then cash sequencing: total BUY notional may not exceed
//! `extra_cash + total SELL notional`. When it does, buys are trimmed greedily,
//! largest notional first (ties by ticker), a whole number of lots at a time.

use crate::error::Result;
use crate::request::Constraints;
use crate::seed::Universe;
use crate::side::Side;
use crate::source::Snapshot;
use crate::target::TargetWeights;
use crate::types::Ticker;
use crate::valuation::{Valuation, resolve_price};

/// Quantities within this many lots of a whole lot snap to it.
const LOT_EPSILON: f64 = 1e-9;

/// Cash shortfall below this (base currency) counts as funded.
const CASH_EPSILON: f64 = 1e-9;

/// Target dollar value for one ticker.
#[derive(Clone, Debug, PartialEq)]
pub struct Allocation {
    pub ticker: Ticker,
    /// Bucket label in bucket mode.
    pub bucket: Option<String>,
    /// Target base-currency value.
    pub target_value: f64,
}

/// A solved order before emission.
#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    pub ticker: Ticker,
    pub bucket: Option<String>,
    pub side: Side,
    /// Signed, multiple of the lot size.
    pub qty_delta: i64,
    /// Signed, base currency.
    pub notional_delta: f64,
    /// Native-currency price used.
    pub price: f64,
    pub fx_rate: f64,
}

impl Order {
    fn reprice(&mut self, qty_delta: i64) {
        self.qty_delta = qty_delta;
        self.notional_delta = qty_delta as f64 * self.price * self.fx_rate;
    }
}

/// Ticker-mode allocations: every universe ticker that is targeted gets
/// `weight * nav_with_cash`; held tickers nobody targets get zero.
pub fn direct_allocations(
    targets: &TargetWeights,
    universe: &Universe,
    nav_with_cash: f64,
) -> Vec<Allocation> {
    universe
        .iter()
        .filter_map(|m| match targets.get(m.ticker.as_str()) {
            Some(weight) => Some(Allocation {
                ticker: m.ticker.clone(),
                bucket: None,
                target_value: weight * nav_with_cash,
            }),
            None if m.held => Some(Allocation {
                ticker: m.ticker.clone(),
                bucket: None,
                target_value: 0.0,
            }),
            None => None,
        })
        .collect()
}

/// Truncate a raw quantity toward zero onto the `lot_size` grid.
///
/// Quantities too large for an `i64` saturate at the largest whole number
/// of lots that fits.
pub fn round_to_lots(raw_qty: f64, lot_size: i64) -> i64 {
    let lots = raw_qty / lot_size as f64;
    let nearest = lots.round();
    let whole = if (lots - nearest).abs() < LOT_EPSILON {
        nearest
    } else {
        lots.trunc()
    };
    let max_lots = i64::MAX / lot_size;
    (whole as i64).clamp(-max_lots, max_lots) * lot_size
}

/// Solve allocations into orders, in allocation order.
pub fn solve(
    allocations: &[Allocation],
    valuation: &Valuation,
    snapshot: &Snapshot,
    constraints: &Constraints,
) -> Result<Vec<Order>> {
    constraints.validate()?;
    let lot = constraints.lot_size;
    let mut orders = Vec::with_capacity(allocations.len());

    for alloc in allocations {
        let current = valuation.value_of(&alloc.ticker);
        if alloc.target_value == 0.0 && current == 0.0 {
            continue;
        }
        let point = resolve_price(snapshot, &alloc.ticker)?;
        let delta = alloc.target_value - current;
        let native_delta = delta / point.fx_rate;
        let raw_qty = native_delta / point.price;
        let qty = round_to_lots(raw_qty, lot);

        let Some(side) = Side::from_delta(qty) else {
            continue;
        };
        let notional = qty as f64 * point.unit_value();
        if notional.abs() < constraints.min_order_value {
            log::debug!(
                "{}: {side} {} ({notional:.2}) below min order value {:.2}; dropped",
                alloc.ticker,
                qty.abs(),
                constraints.min_order_value
            );
            continue;
        }

        orders.push(Order {
            ticker: alloc.ticker.clone(),
            bucket: alloc.bucket.clone(),
            side,
            qty_delta: qty,
            notional_delta: notional,
            price: point.price,
            fx_rate: point.fx_rate,
        });
    }

    sequence_cash(&mut orders, constraints);
    Ok(orders)
}

/// Trim buys until they are funded by extra cash plus sell proceeds.
fn sequence_cash(orders: &mut Vec<Order>, constraints: &Constraints) {
    let sells: f64 = orders
        .iter()
        .filter(|o| o.side == Side::Sell)
        .map(|o| o.notional_delta.abs())
        .sum();
    let buys: f64 = orders
        .iter()
        .filter(|o| o.side == Side::Buy)
        .map(|o| o.notional_delta)
        .sum();
    let budget = constraints.extra_cash + sells;
    let mut excess = buys - budget;
    if excess <= CASH_EPSILON {
        return;
    }

    log::info!("buys {buys:.2} exceed available cash {budget:.2}; trimming {excess:.2}");

    let mut ranked: Vec<usize> = (0..orders.len())
        .filter(|&i| orders[i].side == Side::Buy)
        .collect();
    ranked.sort_by(|&a, &b| {
        orders[b]
            .notional_delta
            .total_cmp(&orders[a].notional_delta)
            .then_with(|| orders[a].ticker.cmp(&orders[b].ticker))
    });

    let lot = constraints.lot_size;
    for i in ranked {
        if excess <= CASH_EPSILON {
            break;
        }
        let order = &mut orders[i];
        let lot_value = lot as f64 * order.price * order.fx_rate;
        let held_lots = order.qty_delta / lot;
        let cut_lots = ((excess / lot_value).ceil() as i64).clamp(1, held_lots);
        let before = order.notional_delta;
        order.reprice(order.qty_delta - cut_lots * lot);

        if order.qty_delta == 0 || order.notional_delta < constraints.min_order_value {
            excess -= before;
            order.reprice(0);
        } else {
            excess -= before - order.notional_delta;
        }
        log::debug!(
            "{}: buy trimmed to {} (excess now {excess:.2})",
            order.ticker,
            order.qty_delta
        );
    }

    orders.retain(|o| o.qty_delta != 0);
}
