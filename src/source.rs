//! Read-only collaborator interfaces and the immutable snapshot the engine runs on.
//!
//! The engine never reads a shared price cache. Hosts implement the reader
//! traits over whatever stores they own (database, broker, files), call
//! [`Snapshot::capture`] once, and hand the resulting plain data to
//! [`rebalance`](crate::rebalance). Every computation is therefore a pure
//! function of the snapshot it was given.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Classification, Holding, Quote, SeedSource, Ticker};

/// Holdings store: ticker -> quantity, average cost.
pub trait HoldingsReader {
    fn holdings(&self) -> Vec<Holding>;
}

/// Live price and FX store.
pub trait QuoteReader {
    fn base_currency(&self) -> String;
    fn quote(&self, ticker: &Ticker) -> Option<Quote>;
    /// Multiplier converting one unit of `currency` into the base currency.
    fn fx_rate(&self, currency: &str) -> Option<f64>;
}

/// Sector/region classification lookup.
pub trait ClassificationReader {
    fn classification(&self, ticker: &Ticker) -> Option<Classification>;
}

/// Candidate universe: the watchlist and the scanner's BUY-rated tickers.
pub trait CandidateReader {
    fn watchlist(&self) -> Vec<Ticker>;
    fn buy_signals(&self) -> Vec<Ticker>;
}

/// Point-in-time inputs for one rebalance computation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub base_currency: String,
    pub holdings: Vec<Holding>,
    #[serde(default)]
    pub quotes: FxHashMap<Ticker, Quote>,
    #[serde(default)]
    pub fx: FxHashMap<String, f64>,
    #[serde(default)]
    pub classifications: FxHashMap<Ticker, Classification>,
    #[serde(default)]
    pub watchlist: Vec<Ticker>,
    #[serde(default)]
    pub buy_signals: Vec<Ticker>,
}

impl Snapshot {
    /// Empty snapshot in the given base currency.
    pub fn new(base_currency: &str) -> Self {
        Self {
            base_currency: base_currency.to_string(),
            ..Default::default()
        }
    }

    /// Read every collaborator once and freeze the result.
    ///
    /// Quotes are requested for holdings, watchlist and BUY signals; FX rates
    /// for every non-base currency those quotes are denominated in. Anything a
    /// reader cannot supply is simply absent, and the engine reports it when
    /// (and only if) a participating ticker needs it.
    pub fn capture(
        holdings: &impl HoldingsReader,
        quotes: &impl QuoteReader,
        classes: &impl ClassificationReader,
        candidates: &impl CandidateReader,
    ) -> Self {
        let mut snap = Snapshot::new(&quotes.base_currency());
        snap.holdings = holdings.holdings();
        snap.watchlist = candidates.watchlist();
        snap.buy_signals = candidates.buy_signals();

        let mut seen = FxHashSet::default();
        let tickers: Vec<Ticker> = snap
            .holdings
            .iter()
            .map(|h| h.ticker.clone())
            .chain(snap.watchlist.iter().cloned())
            .chain(snap.buy_signals.iter().cloned())
            .filter(|t| seen.insert(t.clone()))
            .collect();

        for ticker in &tickers {
            if let Some(quote) = quotes.quote(ticker) {
                if quote.currency != snap.base_currency && !snap.fx.contains_key(&quote.currency) {
                    if let Some(rate) = quotes.fx_rate(&quote.currency) {
                        snap.fx.insert(quote.currency.clone(), rate);
                    }
                }
                snap.quotes.insert(ticker.clone(), quote);
            }
            if let Some(class) = classes.classification(ticker) {
                snap.classifications.insert(ticker.clone(), class);
            }
        }

        log::debug!(
            "snapshot captured: {} holdings, {} quotes, {} fx rates, {} classified",
            snap.holdings.len(),
            snap.quotes.len(),
            snap.fx.len(),
            snap.classifications.len(),
        );
        snap
    }

    pub fn with_holding(mut self, ticker: &str, quantity: f64, avg_price: f64) -> Self {
        self.holdings.push(Holding::new(ticker, quantity, avg_price));
        self
    }

    pub fn with_quote(mut self, ticker: &str, price: f64, currency: &str) -> Self {
        self.quotes
            .insert(Ticker::new(ticker), Quote::new(price, currency));
        self
    }

    pub fn with_fx(mut self, currency: &str, rate: f64) -> Self {
        self.fx.insert(currency.to_string(), rate);
        self
    }

    pub fn with_classification(mut self, ticker: &str, sector: &str, region: &str) -> Self {
        self.classifications
            .insert(Ticker::new(ticker), Classification::new(sector, region));
        self
    }

    pub fn with_watchlist(mut self, tickers: &[&str]) -> Self {
        self.watchlist.extend(tickers.iter().map(|t| Ticker::new(t)));
        self
    }

    pub fn with_buy_signals(mut self, tickers: &[&str]) -> Self {
        self.buy_signals.extend(tickers.iter().map(|t| Ticker::new(t)));
        self
    }

    /// Multiplier from `currency` to the base currency. The base itself is 1.0.
    pub fn fx_rate(&self, currency: &str) -> Result<f64> {
        if currency.eq_ignore_ascii_case(&self.base_currency) {
            return Ok(1.0);
        }
        match self.fx.get(currency) {
            Some(&rate) if rate.is_finite() && rate > 0.0 => Ok(rate),
            _ => Err(Error::MissingFxRate {
                currency: currency.to_string(),
                base: self.base_currency.clone(),
            }),
        }
    }

    /// Tickers offered by a seed source, deduplicated, in ascending order.
    pub fn candidates(&self, source: SeedSource) -> Vec<Ticker> {
        let mut out: Vec<Ticker> = match source {
            SeedSource::Watchlist => self.watchlist.clone(),
            SeedSource::Signals => self.buy_signals.clone(),
            SeedSource::None => Vec::new(),
        };
        out.retain(|t| !t.is_empty());
        out.sort();
        out.dedup();
        out
    }

    pub fn classification(&self, ticker: &Ticker) -> Option<&Classification> {
        self.classifications.get(ticker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Store;

    impl HoldingsReader for Store {
        fn holdings(&self) -> Vec<Holding> {
            vec![Holding::new("AAPL", 10.0, 100.0), Holding::new("BHP.AX", 50.0, 40.0)]
        }
    }

    impl QuoteReader for Store {
        fn base_currency(&self) -> String {
            "AUD".into()
        }
        fn quote(&self, ticker: &Ticker) -> Option<Quote> {
            match ticker.as_str() {
                "AAPL" => Some(Quote::new(150.0, "USD")),
                "BHP.AX" => Some(Quote::new(45.0, "AUD")),
                "MSFT" => Some(Quote::new(300.0, "USD")),
                _ => None,
            }
        }
        fn fx_rate(&self, currency: &str) -> Option<f64> {
            (currency == "USD").then_some(1.5)
        }
    }

    impl ClassificationReader for Store {
        fn classification(&self, ticker: &Ticker) -> Option<Classification> {
            (ticker.as_str() == "AAPL").then(|| Classification::new("Technology", "United States"))
        }
    }

    impl CandidateReader for Store {
        fn watchlist(&self) -> Vec<Ticker> {
            vec![Ticker::new("msft"), Ticker::new("NOPE")]
        }
        fn buy_signals(&self) -> Vec<Ticker> {
            vec![]
        }
    }

    #[test]
    fn capture_reads_every_collaborator() {
        let snap = Snapshot::capture(&Store, &Store, &Store, &Store);
        assert_eq!(snap.base_currency, "AUD");
        assert_eq!(snap.holdings.len(), 2);
        assert_eq!(snap.quotes.len(), 3); // NOPE has no quote
        assert_eq!(snap.fx.get("USD"), Some(&1.5));
        assert!(!snap.fx.contains_key("AUD"));
        assert_eq!(snap.classifications.len(), 1);
        assert_eq!(snap.watchlist[0], Ticker::new("MSFT"));
    }

    #[test]
    fn base_currency_converts_at_par() {
        let snap = Snapshot::new("USD");
        assert_eq!(snap.fx_rate("USD").unwrap(), 1.0);
        assert_eq!(snap.fx_rate("usd").unwrap(), 1.0);
    }

    #[test]
    fn missing_fx_rate_is_an_error() {
        let snap = Snapshot::new("USD").with_fx("AUD", 0.65);
        assert_eq!(snap.fx_rate("AUD").unwrap(), 0.65);
        match snap.fx_rate("EUR") {
            Err(Error::MissingFxRate { currency, base }) => {
                assert_eq!(currency, "EUR");
                assert_eq!(base, "USD");
            }
            other => panic!("expected MissingFxRate, got {other:?}"),
        }
    }

    #[test]
    fn zero_fx_rate_is_treated_as_missing() {
        let snap = Snapshot::new("USD").with_fx("AUD", 0.0);
        assert!(snap.fx_rate("AUD").is_err());
    }

    #[test]
    fn candidates_sorted_and_deduplicated() {
        let snap = Snapshot::new("USD")
            .with_watchlist(&["MSFT", "AMZN", "msft"])
            .with_buy_signals(&["NVDA"]);
        assert_eq!(
            snap.candidates(SeedSource::Watchlist),
            vec![Ticker::new("AMZN"), Ticker::new("MSFT")]
        );
        assert_eq!(snap.candidates(SeedSource::Signals), vec![Ticker::new("NVDA")]);
        assert!(snap.candidates(SeedSource::None).is_empty());
    }

    #[test]
    fn snapshot_json_round_trip_keeps_quotes() {
        let snap = Snapshot::new("USD")
            .with_holding("AAPL", 10.0, 100.0)
            .with_quote("AAPL", 150.0, "USD");
        let json = serde_json::to_string(&snap).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.quotes[&Ticker::new("AAPL")].price, 150.0);
    }
}
