//! # Direct Fetch Selector
//!
//! Picks the blocks to request right after a header batch extends a branch
//! with at least as much work as the active chain.
//!
//! ## Walk
//!
//! From the branch tip back through parent lookups until the active chain is
//! met. Blocks already stored or in flight are skipped. At most
//! `direct_fetch_walk_limit` blocks are visited; past that the peer is too
//! far ahead and nothing is selected.
//!
//! ## Window
//!
//! Candidates go into a window of `max_blocks_in_transit_per_peer`. When it
//! overflows the most recently found one is kept and the oldest entry,
//! the block closest to the branch tip, is dropped. The result therefore
//! holds the blocks right above the fork point, in ascending height.

use std::collections::VecDeque;

use crate::config::HeaderSyncConfig;
use crate::domain::HeaderRecord;
use crate::ports::{ActiveChain, HeaderGraph, InFlightIndex};

/// Select missing ancestors of `tip` to download, lowest height first.
pub fn find_missing_blocks(
    tip: &HeaderRecord,
    graph: &dyn HeaderGraph,
    active_chain: &dyn ActiveChain,
    in_flight: &dyn InFlightIndex,
    config: &HeaderSyncConfig,
) -> Vec<HeaderRecord> {
    let mut to_fetch: VecDeque<HeaderRecord> = VecDeque::new();
    let mut walked = 0usize;
    let mut cursor = Some(*tip);

    while let Some(block) = cursor {
        walked += 1;
        if walked > config.direct_fetch_walk_limit {
            return Vec::new();
        }

        if active_chain.contains(&block) {
            break;
        }

        if !block.has_data && !in_flight.is_in_flight(&block.hash) {
            to_fetch.push_back(block);
            if to_fetch.len() > config.max_blocks_in_transit_per_peer {
                to_fetch.pop_front();
            }
        }

        cursor = graph.lookup(&block.parent_hash);
    }

    // Walked newest to oldest.
    to_fetch.into_iter().rev().collect()
}
