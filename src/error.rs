//! Errors surfaced by the rebalancing engine.
//!
//! Every variant names the offending field, key or ticker. None of them are
//! retried internally: a rejected computation is returned to the caller as-is.

use crate::types::Ticker;

/// All errors that can reject a rebalance computation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid target weight for '{key}': {reason}")]
    InvalidTarget { key: String, reason: String },

    #[error("no price quote for {ticker}")]
    MissingPrice { ticker: Ticker },

    #[error("unusable price quote for {ticker}: {price}")]
    InvalidQuote { ticker: Ticker, price: f64 },

    #[error("no FX rate from {currency} to base currency {base}")]
    MissingFxRate { currency: String, base: String },

    #[error("lot_size must be a positive integer, got {0}")]
    InvalidLotSize(f64),

    #[error("min_order_value must be a non-negative number, got {0}")]
    InvalidMinOrder(f64),

    #[error("cash must be a non-negative number, got {0}")]
    InvalidCash(f64),

    #[error("unknown seed_source '{0}', expected watchlist, signals or none")]
    InvalidSeedSource(String),

    #[error("unknown mode '{0}', expected sector or region")]
    InvalidMode(String),

    #[error("malformed rebalance request: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Error {
    /// Request field (or snapshot section) the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Error::InvalidTarget { .. } => "targets",
            Error::MissingPrice { .. } | Error::InvalidQuote { .. } => "quotes",
            Error::MissingFxRate { .. } => "fx",
            Error::InvalidLotSize(_) => "lot_size",
            Error::InvalidMinOrder(_) => "min_order_value",
            Error::InvalidCash(_) => "cash",
            Error::InvalidSeedSource(_) => "seed_source",
            Error::InvalidMode(_) => "mode",
            Error::Parse(_) => "request",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
