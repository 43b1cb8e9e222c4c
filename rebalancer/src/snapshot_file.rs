//! Portfolio snapshot file (snapshot.json): holdings, quotes, FX rates,
//! classifications and the candidate universe, as exported by the host.
//!
//! The file implements the engine's reader traits, so the CLI freezes it into
//! a [`Snapshot`] the same way a service would freeze its live stores.

use std::path::Path;

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use weightbook::{
    CandidateReader, Classification, ClassificationReader, Holding, HoldingsReader, Quote,
    QuoteReader, Side, Snapshot, Ticker,
};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct HoldingRow {
    pub ticker: String,
    pub quantity: f64,
    #[serde(default)]
    pub avg_price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRow {
    pub ticker: String,
    pub price: f64,
    pub currency: String,
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationRow {
    pub ticker: String,
    pub sector: String,
    pub region: String,
}

/// One scanner verdict; only BUY verdicts seed candidates.
#[derive(Debug, Clone, Deserialize)]
pub struct SignalRow {
    pub ticker: String,
    pub side: Side,
}

#[derive(Debug, Clone, Deserialize)]
struct SnapshotDoc {
    #[serde(default)]
    holdings: Vec<HoldingRow>,
    #[serde(default)]
    quotes: Vec<QuoteRow>,
    #[serde(default)]
    fx: FxHashMap<String, f64>,
    #[serde(default)]
    classifications: Vec<ClassificationRow>,
    #[serde(default)]
    watchlist: Vec<String>,
    #[serde(default)]
    signals: Vec<SignalRow>,
}

/// A loaded snapshot file, indexed for lookups.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    base_currency: String,
    holdings: Vec<HoldingRow>,
    quotes: FxHashMap<Ticker, Quote>,
    fx: FxHashMap<String, f64>,
    classifications: FxHashMap<Ticker, Classification>,
    watchlist: Vec<String>,
    signals: Vec<SignalRow>,
}

impl SnapshotFile {
    /// Load a snapshot.json file; FX rates are relative to `base_currency`.
    pub fn load(path: &Path, base_currency: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::SnapshotRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let doc: SnapshotDoc =
            serde_json::from_str(&contents).map_err(|e| Error::SnapshotParse {
                path: path.to_path_buf(),
                source: e,
            })?;
        Self::from_doc(doc, base_currency)
    }

    /// Parse from a JSON string (useful for testing).
    pub fn from_json(json: &str, base_currency: &str) -> Result<Self> {
        let doc: SnapshotDoc = serde_json::from_str(json).map_err(|e| Error::SnapshotParse {
            path: "<inline>".into(),
            source: e,
        })?;
        Self::from_doc(doc, base_currency)
    }

    fn from_doc(doc: SnapshotDoc, base_currency: &str) -> Result<Self> {
        for h in &doc.holdings {
            if h.ticker.trim().is_empty() {
                return Err(Error::Snapshot("holding with empty ticker".into()));
            }
            if !h.quantity.is_finite() || h.quantity < 0.0 {
                return Err(Error::Snapshot(format!(
                    "holding {} has invalid quantity {}",
                    h.ticker, h.quantity
                )));
            }
        }

        let mut quotes = FxHashMap::default();
        for q in doc.quotes {
            let ticker = Ticker::new(&q.ticker);
            if quotes.contains_key(&ticker) {
                log::warn!("duplicate quote for {ticker}; keeping the last one");
            }
            quotes.insert(
                ticker,
                Quote {
                    price: q.price,
                    currency: q.currency.trim().to_ascii_uppercase(),
                    as_of: q.as_of,
                },
            );
        }

        let fx = doc
            .fx
            .into_iter()
            .map(|(ccy, rate)| (ccy.trim().to_ascii_uppercase(), rate))
            .collect();

        let classifications = doc
            .classifications
            .into_iter()
            .map(|c| {
                (
                    Ticker::new(&c.ticker),
                    Classification::new(c.sector.trim(), c.region.trim()),
                )
            })
            .collect();

        Ok(Self {
            base_currency: base_currency.to_string(),
            holdings: doc.holdings,
            quotes,
            fx,
            classifications,
            watchlist: doc.watchlist,
            signals: doc.signals,
        })
    }

    /// Freeze the file into the engine's snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self, self, self, self)
    }
}

impl HoldingsReader for SnapshotFile {
    fn holdings(&self) -> Vec<Holding> {
        self.holdings
            .iter()
            .map(|h| Holding::new(&h.ticker, h.quantity, h.avg_price))
            .collect()
    }
}

impl QuoteReader for SnapshotFile {
    fn base_currency(&self) -> String {
        self.base_currency.clone()
    }

    fn quote(&self, ticker: &Ticker) -> Option<Quote> {
        self.quotes.get(ticker).cloned()
    }

    fn fx_rate(&self, currency: &str) -> Option<f64> {
        self.fx.get(&currency.to_ascii_uppercase()).copied()
    }
}

impl ClassificationReader for SnapshotFile {
    fn classification(&self, ticker: &Ticker) -> Option<Classification> {
        self.classifications.get(ticker).cloned()
    }
}

impl CandidateReader for SnapshotFile {
    fn watchlist(&self) -> Vec<Ticker> {
        self.watchlist.iter().map(|t| Ticker::new(t)).collect()
    }

    fn buy_signals(&self) -> Vec<Ticker> {
        self.signals
            .iter()
            .filter(|s| s.side == Side::Buy)
            .map(|s| Ticker::new(&s.ticker))
            .collect()
    }
}
