//! Bucket distribution: sector/region weights into per-ticker dollar targets.
//!
//! A bucket's target dollars are split across its member tickers in
//! proportion to their current value, so members not yet held (seeded
//! candidates) receive nothing while the bucket holds anything. Only a
//! bucket with no current value splits its target equally across all
//! members, which is how an empty bucket gets allocation through its
//! candidates.

use rustc_hash::FxHashSet;

use crate::seed::Universe;
use crate::solver::Allocation;
use crate::source::Snapshot;
use crate::target::TargetWeights;
use crate::types::{BucketMode, Omission, Ticker};
use crate::valuation::Valuation;

/// Expand bucket weights into per-ticker allocations tagged with their bucket.
///
/// Held tickers classified into a bucket the request does not target get a
/// target of zero. Held tickers without a classification are left out and
/// recorded as [`Omission::Unclassified`]; targeted buckets without members
/// are recorded as [`Omission::UnresolvedBucket`].
pub fn distribute(
    targets: &TargetWeights,
    universe: &Universe,
    valuation: &Valuation,
    snapshot: &Snapshot,
    mode: BucketMode,
    omissions: &mut Vec<Omission>,
) -> Vec<Allocation> {
    let nav = valuation.nav_with_cash;
    let bucket_of = |ticker: &Ticker| snapshot.classification(ticker).map(|c| mode.label(c));

    let mut allocations: Vec<Allocation> = Vec::new();
    let mut allocated: FxHashSet<&Ticker> = FxHashSet::default();

    for (bucket, weight) in targets.iter() {
        let members: Vec<(&Ticker, f64)> = universe
            .iter()
            .filter(|m| bucket_of(&m.ticker) == Some(bucket))
            .map(|m| (&m.ticker, valuation.value_of(&m.ticker).max(0.0)))
            .collect();

        if members.is_empty() {
            log::warn!("bucket '{bucket}' has no member tickers; skipped");
            omissions.push(Omission::UnresolvedBucket {
                bucket: bucket.to_string(),
            });
            continue;
        }

        let target = weight * nav;
        let shares = split_bucket(target, &members);
        log::debug!(
            "bucket '{bucket}': target {target:.2} across {} members",
            members.len()
        );

        for ((ticker, _), share) in members.iter().zip(shares) {
            allocated.insert(ticker);
            allocations.push(Allocation {
                ticker: (*ticker).clone(),
                bucket: Some(bucket.to_string()),
                target_value: share,
            });
        }
    }

    for member in universe.iter().filter(|m| m.held) {
        if allocated.contains(&member.ticker) {
            continue;
        }
        match bucket_of(&member.ticker) {
            Some(bucket) => allocations.push(Allocation {
                ticker: member.ticker.clone(),
                bucket: Some(bucket.to_string()),
                target_value: 0.0,
            }),
            None => {
                log::warn!("{} has no classification; left untouched", member.ticker);
                omissions.push(Omission::Unclassified {
                    ticker: member.ticker.clone(),
                });
            }
        }
    }

    allocations
}

/// Split `target` dollars across members given their current values.
fn split_bucket(target: f64, members: &[(&Ticker, f64)]) -> Vec<f64> {
    let bucket_value: f64 = members.iter().map(|(_, v)| v).sum();
    if bucket_value > 0.0 {
        return members
            .iter()
            .map(|(_, v)| target * v / bucket_value)
            .collect();
    }
    let equal = target / members.len() as f64;
    vec![equal; members.len()]
}
