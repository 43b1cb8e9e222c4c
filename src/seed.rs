//! Candidate seeding: which tickers may trade in this computation.

use rustc_hash::FxHashSet;

use crate::source::Snapshot;
use crate::target::TargetWeights;
use crate::types::{Omission, SeedSource, Ticker};

/// A ticker eligible to receive allocation.
#[derive(Clone, Debug, PartialEq)]
pub struct UniverseMember {
    pub ticker: Ticker,
    /// Current quantity (0 for candidates not held).
    pub quantity: f64,
    pub held: bool,
}

/// Holdings plus seeded candidates, in deterministic order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Universe {
    members: Vec<UniverseMember>,
}

impl Universe {
    pub fn iter(&self) -> std::slice::Iter<'_, UniverseMember> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Which candidates join the universe.
#[derive(Clone, Copy, Debug)]
pub enum SeedScope<'a> {
    /// Ticker mode: only candidates that a target names.
    Targets(&'a TargetWeights),
    /// Bucket mode: every candidate, so it can represent its bucket.
    AllCandidates,
}

/// Build the universe: holdings first (snapshot order), then candidates
/// (ascending ticker order).
///
/// In ticker mode a target that is neither held nor offered by the seed
/// source is recorded as [`Omission::UnseededTarget`]. A seed source other
/// than `none` that offers nothing is recorded as
/// [`Omission::EmptySeedSource`].
pub fn seed_universe(
    snapshot: &Snapshot,
    source: SeedSource,
    scope: SeedScope<'_>,
    omissions: &mut Vec<Omission>,
) -> Universe {
    let mut members: Vec<UniverseMember> = Vec::new();
    let mut seen: FxHashSet<Ticker> = FxHashSet::default();

    for holding in &snapshot.holdings {
        if seen.insert(holding.ticker.clone()) {
            members.push(UniverseMember {
                ticker: holding.ticker.clone(),
                quantity: holding.quantity,
                held: true,
            });
        } else if let Some(m) = members.iter_mut().find(|m| m.ticker == holding.ticker) {
            m.quantity += holding.quantity;
        }
    }

    let candidates = snapshot.candidates(source);
    if source != SeedSource::None && candidates.is_empty() {
        log::warn!("seed source {source} offered no candidates");
        omissions.push(Omission::EmptySeedSource {
            seed_source: source,
        });
    }

    match scope {
        SeedScope::AllCandidates => {
            for ticker in candidates {
                if seen.insert(ticker.clone()) {
                    members.push(UniverseMember {
                        ticker,
                        quantity: 0.0,
                        held: false,
                    });
                }
            }
        }
        SeedScope::Targets(targets) => {
            let offered: FxHashSet<&Ticker> = candidates.iter().collect();
            let mut wanted: Vec<Ticker> = targets
                .iter()
                .map(|(key, _)| Ticker::new(key))
                .filter(|t| !seen.contains(t))
                .collect();
            wanted.sort();

            for ticker in wanted {
                if offered.contains(&ticker) {
                    seen.insert(ticker.clone());
                    members.push(UniverseMember {
                        ticker,
                        quantity: 0.0,
                        held: false,
                    });
                } else {
                    log::warn!("target {ticker} dropped: not held and not offered by {source}");
                    omissions.push(Omission::UnseededTarget {
                        ticker,
                        seed_source: source,
                    });
                }
            }
        }
    }

    let universe = Universe { members };
    log::debug!("universe: {} tickers ({source})", universe.len());
    universe
}
