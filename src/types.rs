//! Core types: Ticker, Holding, Quote, Classification, BucketMode, SeedSource

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Ticker symbol, normalized to trimmed upper case.
///
/// `Ticker::new(" aapl ")` and `Ticker::new("AAPL")` compare equal, so target
/// keys and holdings line up regardless of how the caller spelled them.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn new(s: &str) -> Self {
        Ticker(s.trim().to_ascii_uppercase())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Ticker {
    fn from(s: String) -> Self {
        Ticker::new(&s)
    }
}

impl From<&str> for Ticker {
    fn from(s: &str) -> Self {
        Ticker::new(s)
    }
}

impl From<Ticker> for String {
    fn from(t: Ticker) -> Self {
        t.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// A held position as reported by the holdings store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: Ticker,
    pub quantity: f64,
    pub avg_price: f64,
}

impl Holding {
    pub fn new(ticker: &str, quantity: f64, avg_price: f64) -> Self {
        Self {
            ticker: Ticker::new(ticker),
            quantity,
            avg_price,
        }
    }
}

/// Last traded price in the instrument's native currency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub price: f64,
    pub currency: String,
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

impl Quote {
    pub fn new(price: f64, currency: &str) -> Self {
        Self {
            price,
            currency: currency.to_string(),
            as_of: None,
        }
    }
}

/// Sector and region labels for a ticker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub sector: String,
    pub region: String,
}

impl Classification {
    pub fn new(sector: &str, region: &str) -> Self {
        Self {
            sector: sector.to_string(),
            region: region.to_string(),
        }
    }
}

/// Aggregation key used by bucket-mode requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketMode {
    Sector,
    Region,
}

impl BucketMode {
    /// The bucket label this mode reads from a classification.
    #[inline]
    pub fn label(self, class: &Classification) -> &str {
        match self {
            BucketMode::Sector => &class.sector,
            BucketMode::Region => &class.region,
        }
    }
}

impl FromStr for BucketMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sector" => Ok(BucketMode::Sector),
            "region" => Ok(BucketMode::Region),
            _ => Err(Error::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for BucketMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketMode::Sector => write!(f, "sector"),
            BucketMode::Region => write!(f, "region"),
        }
    }
}

/// Which not-yet-held tickers may receive new allocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedSource {
    #[default]
    Watchlist,
    Signals,
    None,
}

impl FromStr for SeedSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "watchlist" => Ok(SeedSource::Watchlist),
            "signals" => Ok(SeedSource::Signals),
            "none" => Ok(SeedSource::None),
            _ => Err(Error::InvalidSeedSource(s.to_string())),
        }
    }
}

impl fmt::Display for SeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedSource::Watchlist => write!(f, "watchlist"),
            SeedSource::Signals => write!(f, "signals"),
            SeedSource::None => write!(f, "none"),
        }
    }
}

/// A target or holding the engine could not resolve and left out.
///
/// Omissions are not errors: the computation still returns suggestions for
/// everything resolvable. They are kept apart from the suggestions so that
/// "dropped" never reads like "already at target".
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Omission {
    /// Ticker target that is neither held nor offered by the seed source.
    UnseededTarget {
        ticker: Ticker,
        seed_source: SeedSource,
    },
    /// The selected seed source offered no candidates at all.
    EmptySeedSource { seed_source: SeedSource },
    /// Bucket target with no member ticker in the universe.
    UnresolvedBucket { bucket: String },
    /// Held ticker with no classification; left untouched in bucket mode.
    Unclassified { ticker: Ticker },
}

impl fmt::Display for Omission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Omission::UnseededTarget {
                ticker,
                seed_source,
            } => write!(f, "{ticker}: not held and not offered by {seed_source}"),
            Omission::EmptySeedSource { seed_source } => {
                write!(f, "seed source {seed_source} offered no candidates")
            }
            Omission::UnresolvedBucket { bucket } => {
                write!(f, "bucket '{bucket}': no member tickers")
            }
            Omission::Unclassified { ticker } => write!(f, "{ticker}: no classification"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_normalizes() {
        assert_eq!(Ticker::new(" aapl "), Ticker::new("AAPL"));
        assert_eq!(Ticker::new("bhp.ax").as_str(), "BHP.AX");
        assert!(Ticker::new("   ").is_empty());
    }

    #[test]
    fn ticker_serde_is_a_plain_string() {
        let t: Ticker = serde_json::from_str("\"msft\"").unwrap();
        assert_eq!(t.as_str(), "MSFT");
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"MSFT\"");
    }

    #[test]
    fn ticker_display_pads() {
        assert_eq!(format!("{:6}|", Ticker::new("SPY")), "SPY   |");
    }

    #[test]
    fn bucket_mode_parse() {
        assert_eq!("Sector".parse::<BucketMode>().unwrap(), BucketMode::Sector);
        assert_eq!("region".parse::<BucketMode>().unwrap(), BucketMode::Region);
        assert!(matches!(
            "country".parse::<BucketMode>(),
            Err(Error::InvalidMode(_))
        ));
    }

    #[test]
    fn bucket_mode_label() {
        let class = Classification::new("Technology", "United States");
        assert_eq!(BucketMode::Sector.label(&class), "Technology");
        assert_eq!(BucketMode::Region.label(&class), "United States");
    }

    #[test]
    fn seed_source_parse_and_default() {
        assert_eq!(SeedSource::default(), SeedSource::Watchlist);
        assert_eq!("SIGNALS".parse::<SeedSource>().unwrap(), SeedSource::Signals);
        assert_eq!("none".parse::<SeedSource>().unwrap(), SeedSource::None);
        assert!("news".parse::<SeedSource>().is_err());
    }

    #[test]
    fn omission_serializes_with_kind_tag() {
        let o = Omission::UnresolvedBucket {
            bucket: "Utilities".into(),
        };
        let v = serde_json::to_value(&o).unwrap();
        assert_eq!(v["kind"], "unresolved_bucket");
        assert_eq!(v["bucket"], "Utilities");
    }
}
