//! The rebalance pipeline: validate, value, seed, allocate, solve, emit.

use crate::bucket;
use crate::emit::{RebalanceResult, emit};
use crate::error::Result;
use crate::request::RebalanceRequest;
use crate::seed::{SeedScope, seed_universe};
use crate::solver::{direct_allocations, solve};
use crate::source::Snapshot;
use crate::target::{TargetKind, normalize};
use crate::valuation::value_holdings;

/// Compute rebalance suggestions for `request` against `snapshot`.
///
/// Pure and synchronous: the same request against the same snapshot always
/// yields the same result, and nothing is cached between calls.
///
/// # Errors
///
/// Rejects the computation on invalid constraints, malformed target weights,
/// or a participating ticker without a usable quote or FX rate. Targets that
/// cannot be resolved (unseeded tickers, empty buckets, unclassified
/// holdings) are not errors; they are listed in
/// [`RebalanceResult::omissions`].
pub fn rebalance(request: &RebalanceRequest, snapshot: &Snapshot) -> Result<RebalanceResult> {
    let constraints = request.constraints();
    constraints.validate()?;

    let mut omissions = Vec::new();

    let result = match request {
        RebalanceRequest::Ticker { targets, .. } => {
            let weights = normalize(targets, TargetKind::Ticker)?;
            let valuation = value_holdings(snapshot, constraints.extra_cash)?;
            let universe = seed_universe(
                snapshot,
                constraints.seed_source,
                SeedScope::Targets(&weights),
                &mut omissions,
            );
            let allocations = direct_allocations(&weights, &universe, valuation.nav_with_cash);
            let orders = solve(&allocations, &valuation, snapshot, constraints)?;
            emit(orders, &valuation, None, omissions)
        }
        RebalanceRequest::Bucket { mode, targets, .. } => {
            let weights = normalize(targets, TargetKind::Bucket)?;
            let valuation = value_holdings(snapshot, constraints.extra_cash)?;
            let universe = seed_universe(
                snapshot,
                constraints.seed_source,
                SeedScope::AllCandidates,
                &mut omissions,
            );
            let allocations = bucket::distribute(
                &weights,
                &universe,
                &valuation,
                snapshot,
                *mode,
                &mut omissions,
            );
            let orders = solve(&allocations, &valuation, snapshot, constraints)?;
            emit(orders, &valuation, Some(*mode), omissions)
        }
    };

    log::debug!(
        "{} suggestions, {} omissions, NAV with cash {:.2} {}",
        result.suggestions.len(),
        result.omissions.len(),
        result.nav_with_cash,
        result.base_currency
    );
    Ok(result)
}
