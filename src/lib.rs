//! # weightbook
//!
//! A deterministic rebalancing suggestion engine: given current holdings,
//! live quotes and target allocation weights, compute the lot-rounded trades
//! that move a portfolio toward its targets without spending cash it does
//! not have.
//!
//! ## Features
//!
//! - **Ticker mode**: target weights per ticker
//! - **Bucket mode**: target weights per sector or region, split across the
//!   bucket's members in proportion to their current value
//! - **Candidate seeding**: watchlist or BUY signals can introduce tickers
//!   not yet held
//! - **Cash safety**: buys never exceed sell proceeds plus injected cash
//! - **Pure computation**: every result is a function of an immutable
//!   [`Snapshot`]
//!
//! ## Quick Start
//!
//! ```
//! use weightbook::{Constraints, RawTarget, RebalanceRequest, Side, Snapshot, rebalance};
//!
//! let snapshot = Snapshot::new("USD")
//!     .with_holding("AAPL", 10.0, 120.0)
//!     .with_quote("AAPL", 150.0, "USD")
//!     .with_quote("MSFT", 300.0, "USD")
//!     .with_watchlist(&["MSFT"]);
//!
//! let request = RebalanceRequest::ticker(
//!     vec![RawTarget::new("AAPL", 0.5), RawTarget::new("MSFT", 0.5)],
//!     Constraints::default(),
//! );
//!
//! let result = rebalance(&request, &snapshot).unwrap();
//!
//! assert_eq!(result.nav_with_cash, 1500.0);
//! assert_eq!(result.suggestions[0].side, Side::Sell);
//! assert_eq!(result.suggestions[0].qty_delta, -5);
//! assert_eq!(result.suggestions[1].ticker.as_str(), "MSFT");
//! assert_eq!(result.suggestions[1].qty_delta, 2);
//! ```
//!
//! ## Bucket Mode
//!
//! ```
//! use weightbook::{BucketMode, Constraints, RawTarget, RebalanceRequest, SeedSource, Snapshot, rebalance};
//!
//! let snapshot = Snapshot::new("USD")
//!     .with_holding("AAPL", 20.0, 100.0)
//!     .with_holding("XOM", 60.0, 90.0)
//!     .with_quote("AAPL", 150.0, "USD")
//!     .with_quote("XOM", 100.0, "USD")
//!     .with_classification("AAPL", "Technology", "United States")
//!     .with_classification("XOM", "Energy", "United States");
//!
//! let constraints = Constraints {
//!     seed_source: SeedSource::None,
//!     ..Default::default()
//! };
//! let request = RebalanceRequest::bucket(
//!     BucketMode::Sector,
//!     vec![RawTarget::new("Technology", 0.5), RawTarget::new("Energy", 0.5)],
//!     constraints,
//! );
//!
//! let result = rebalance(&request, &snapshot).unwrap();
//! assert_eq!(result.suggestions[0].bucket.as_deref(), Some("Energy"));
//! ```
//!
//! ## Requests from JSON
//!
//! A request object with a `mode` key is a bucket request keyed by
//! `bucket`; without one it is keyed by `ticker`. Weights may be numbers or
//! numeric strings.
//!
//! ```
//! use weightbook::RebalanceRequest;
//!
//! let req = RebalanceRequest::from_json(
//!     r#"{"targets": [{"ticker": "AAPL", "target_weight": "0.6"}], "lot_size": 5}"#,
//! ).unwrap();
//! assert_eq!(req.constraints().lot_size, 5);
//! assert!(req.mode().is_none());
//! ```

pub mod breakdown;
mod bucket;
mod emit;
mod engine;
mod error;
mod request;
mod seed;
mod side;
pub mod solver;
pub mod source;
pub mod target;
mod types;
pub mod valuation;

// Re-export public API
pub use breakdown::{Breakdown, BreakdownBy, BreakdownItem, breakdown};
pub use emit::{RebalanceResult, Suggestion};
pub use engine::rebalance;
pub use error::{Error, Result};
pub use request::{Constraints, RawTarget, RebalanceRequest, RequestDefaults};
pub use side::Side;
pub use source::{CandidateReader, ClassificationReader, HoldingsReader, QuoteReader, Snapshot};
pub use types::{BucketMode, Classification, Holding, Omission, Quote, SeedSource, Ticker};
pub use valuation::{Valuation, value_holdings};
