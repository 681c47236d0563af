//! Invariants of header synchronization.

use super::{HeaderRecord, ValidityTier};
use shared_types::{BlockHeader, U256};

/// INVARIANT-1: Continuity
/// Within a batch, each header builds on the previously accepted one.
pub fn invariant_continuous(last_accepted: Option<&HeaderRecord>, header: &BlockHeader) -> bool {
    match last_accepted {
        Some(last) => header.parent_hash == last.hash,
        None => true,
    }
}

/// INVARIANT-2: Direct-fetch gate
/// Direct fetch only runs toward a tree-valid branch with at least as much
/// work as the active chain.
pub fn invariant_has_equal_or_more_work(tip: &HeaderRecord, active_tip_work: U256) -> bool {
    tip.is_valid(ValidityTier::Tree) && active_tip_work <= tip.chain_work
}

/// INVARIANT-3: Fetch bound
/// Never more candidates than one peer may have in flight.
pub fn invariant_fetch_bound(candidates: &[HeaderRecord], max_in_transit: usize) -> bool {
    candidates.len() <= max_in_transit
}

/// INVARIANT-4: Fetch ordering
/// Candidates are strictly ascending by height.
pub fn invariant_ascending_heights(candidates: &[HeaderRecord]) -> bool {
    candidates.windows(2).all(|w| w[0].height < w[1].height)
}

/// INVARIANT-5: Unconnecting escalation
/// A peer is charged exactly when its counter reaches a positive multiple
/// of the threshold.
pub fn invariant_unconnecting_escalation(unconnecting: u32, threshold: u32) -> bool {
    threshold > 0 && unconnecting > 0 && unconnecting % threshold == 0
}
