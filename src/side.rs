//! Suggestion side: Buy or Sell

use std::fmt;

use serde::{Deserialize, Serialize};

/// Side of a suggested order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

impl Side {
    /// Side implied by a signed quantity delta. Zero has no side.
    #[inline]
    pub fn from_delta(qty_delta: i64) -> Option<Self> {
        match qty_delta.signum() {
            1 => Some(Side::Buy),
            -1 => Some(Side::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        };
        f.pad(s)
    }
}
