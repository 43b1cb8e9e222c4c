//! Rebalance plan display and execution cost estimate.

use std::fmt;

use serde::Serialize;
use weightbook::{RebalanceResult, Suggestion};

use crate::config::CostConfig;

/// Estimate total execution cost for a set of suggestions, in base currency.
///
/// Commission is per share with a per-order minimum; slippage is charged in
/// basis points of the absolute notional.
pub fn estimate_cost(suggestions: &[Suggestion], cost: &CostConfig) -> CostEstimate {
    let mut commission = 0.0_f64;
    let mut slippage = 0.0_f64;

    for s in suggestions {
        commission += (s.qty_delta.unsigned_abs() as f64 * cost.commission_per_share)
            .max(cost.commission_min);
        slippage += s.notional_delta.abs() * cost.slippage_bps as f64 / 10_000.0;
    }

    CostEstimate {
        commission,
        slippage,
    }
}

/// Estimated execution costs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostEstimate {
    pub commission: f64,
    pub slippage: f64,
}

impl CostEstimate {
    pub fn total(&self) -> f64 {
        self.commission + self.slippage
    }
}

impl fmt::Display for CostEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} commission + {:.2} slippage = {:.2}",
            self.commission,
            self.slippage,
            self.total(),
        )
    }
}

/// Printable plan: suggestions table, turnover and estimated cost.
pub struct Plan<'a> {
    pub result: &'a RebalanceResult,
    pub cost: CostEstimate,
}

impl<'a> Plan<'a> {
    pub fn new(result: &'a RebalanceResult, cost: &CostConfig) -> Self {
        Self {
            result,
            cost: estimate_cost(&result.suggestions, cost),
        }
    }
}

impl fmt::Display for Plan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.result;
        match r.mode {
            Some(mode) => writeln!(
                f,
                "REBALANCE SUGGESTIONS ({mode} buckets, NAV with cash {:.2} {}):",
                r.nav_with_cash, r.base_currency
            )?,
            None => writeln!(
                f,
                "REBALANCE SUGGESTIONS (NAV with cash {:.2} {}):",
                r.nav_with_cash, r.base_currency
            )?,
        }

        if r.suggestions.is_empty() {
            writeln!(f, "  No rebalancing needed.")?;
            return Ok(());
        }

        writeln!(
            f,
            "  {:>3}  {:4} {:8} {:16} {:>8} {:>10} {:>12}",
            "#", "Side", "Ticker", "Bucket", "Qty", "Price", "Notional"
        )?;
        for (i, s) in r.suggestions.iter().enumerate() {
            writeln!(
                f,
                "  {:>3}  {:4} {:8} {:16} {:>+8} {:>10.2} {:>+12.2}",
                i + 1,
                s.side,
                s.ticker,
                s.bucket.as_deref().unwrap_or("-"),
                s.qty_delta,
                s.price,
                s.notional_delta,
            )?;
        }

        writeln!(
            f,
            "\n  Sells {:.2}, buys {:.2}, turnover {:.2}",
            r.sell_notional(),
            r.buy_notional(),
            r.turnover()
        )?;
        writeln!(f, "  Est. cost: {}", self.cost)?;
        Ok(())
    }
}
