//! Process-wide registry of blocks currently requested from peers.

use parking_lot::RwLock;
use shared_types::{Hash, ShortHash};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::domain::{ConsensusParams, PeerId};
use crate::ports::{InFlightIndex, InFlightMarker, TimeSource};

/// A block requested from a peer and not yet received.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InFlightEntry {
    /// Peer the block was requested from.
    pub peer: PeerId,
    /// When the request was queued (microseconds).
    pub requested_at_micros: u64,
    /// When the peer should be considered stalling (microseconds).
    pub timeout_at_micros: u64,
}

/// Download deadline for a block queued behind `queued_before` others.
///
/// Half a target spacing per block, with a base of four spacings.
pub fn block_timeout_micros(now_micros: u64, params: &ConsensusParams, queued_before: usize) -> u64 {
    let per_block = 500_000u64.saturating_mul(params.pow_target_spacing_secs);
    now_micros.saturating_add(per_block.saturating_mul(4 + queued_before as u64))
}

/// In-memory in-flight registry.
pub struct MemoryInFlightRegistry {
    blocks: RwLock<HashMap<Hash, InFlightEntry>>,
    time: Arc<dyn TimeSource>,
}

impl MemoryInFlightRegistry {
    pub fn new(time: Arc<dyn TimeSource>) -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
            time,
        }
    }

    pub fn entry(&self, hash: &Hash) -> Option<InFlightEntry> {
        self.blocks.read().get(hash).copied()
    }

    /// Blocks currently requested from `peer`.
    pub fn count_for(&self, peer: &PeerId) -> usize {
        self.blocks
            .read()
            .values()
            .filter(|entry| entry.peer == *peer)
            .count()
    }

    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }

    /// Block arrived; returns the peer it was requested from.
    pub fn block_received(&self, hash: &Hash) -> Option<PeerId> {
        self.blocks.write().remove(hash).map(|entry| entry.peer)
    }

    /// Hashes whose download deadline has passed.
    pub fn timed_out(&self) -> Vec<(Hash, PeerId)> {
        let now = self.time.now_micros();
        self.blocks
            .read()
            .iter()
            .filter(|(_, entry)| entry.timeout_at_micros <= now)
            .map(|(hash, entry)| (*hash, entry.peer))
            .collect()
    }

    /// Drop every request owned by a disconnected peer.
    pub fn release_peer(&self, peer: &PeerId) -> usize {
        let mut blocks = self.blocks.write();
        let before = blocks.len();
        blocks.retain(|_, entry| entry.peer != *peer);
        before - blocks.len()
    }
}

impl InFlightIndex for MemoryInFlightRegistry {
    fn is_in_flight(&self, hash: &Hash) -> bool {
        self.blocks.read().contains_key(hash)
    }
}

impl InFlightMarker for MemoryInFlightRegistry {
    fn mark_in_flight(&self, peer: PeerId, hash: Hash, params: &ConsensusParams) {
        let now = self.time.now_micros();
        let mut blocks = self.blocks.write();
        let queued_before = blocks.len();
        let entry = InFlightEntry {
            peer,
            requested_at_micros: now,
            timeout_at_micros: block_timeout_micros(now, params, queued_before),
        };
        blocks.insert(hash, entry);
        debug!(%peer, block = %ShortHash(&hash), queued_before, "Marked block in flight");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::FixedTimeSource;

    fn registry(time: Arc<FixedTimeSource>) -> MemoryInFlightRegistry {
        MemoryInFlightRegistry::new(time)
    }

    #[test]
    fn test_mark_and_receive() {
        let reg = registry(Arc::new(FixedTimeSource::new(1_000)));
        let peer = PeerId::new([1u8; 32]);
        let params = ConsensusParams::default();

        assert!(!reg.is_in_flight(&[9u8; 32]));
        reg.mark_in_flight(peer, [9u8; 32], &params);
        assert!(reg.is_in_flight(&[9u8; 32]));
        assert_eq!(reg.count_for(&peer), 1);

        assert_eq!(reg.block_received(&[9u8; 32]), Some(peer));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_timeout_grows_with_queue() {
        let params = ConsensusParams::default();
        // 600s spacing: base four spacings at half-spacing units
        assert_eq!(block_timeout_micros(0, &params, 0), 1_200_000_000);
        assert_eq!(block_timeout_micros(0, &params, 2), 1_800_000_000);
    }

    #[test]
    fn test_timed_out_and_release() {
        let time = Arc::new(FixedTimeSource::new(1_000));
        let reg = registry(time.clone());
        let a = PeerId::new([1u8; 32]);
        let b = PeerId::new([2u8; 32]);
        let params = ConsensusParams::default();

        reg.mark_in_flight(a, [1u8; 32], &params);
        reg.mark_in_flight(b, [2u8; 32], &params);
        assert!(reg.timed_out().is_empty());

        // first entry expires after 1200s, second after 1500s
        time.advance(1_300);
        assert_eq!(reg.timed_out(), vec![([1u8; 32], a)]);

        assert_eq!(reg.release_peer(&a), 1);
        assert_eq!(reg.len(), 1);
    }
}
