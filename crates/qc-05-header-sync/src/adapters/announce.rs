//! Block-announcement admission policy backed by the in-flight registry.

use parking_lot::RwLock;
use shared_types::Hash;
use std::collections::HashSet;
use std::sync::Arc;

use super::MemoryInFlightRegistry;
use crate::domain::{InventoryItem, PeerId};
use crate::ports::{AnnounceReceiver, InFlightIndex};

/// Requests announced blocks while the peer has in-flight capacity left.
///
/// Peers registered as thin-block capable get `ThinBlock` requests, the rest
/// get full blocks.
pub struct InFlightAnnouncePolicy {
    registry: Arc<MemoryInFlightRegistry>,
    max_blocks_in_transit_per_peer: usize,
    thin_block_peers: RwLock<HashSet<PeerId>>,
}

impl InFlightAnnouncePolicy {
    pub fn new(registry: Arc<MemoryInFlightRegistry>, max_blocks_in_transit_per_peer: usize) -> Self {
        Self {
            registry,
            max_blocks_in_transit_per_peer,
            thin_block_peers: RwLock::new(HashSet::new()),
        }
    }

    /// Peer negotiated thin-block relay.
    pub fn enable_thin_blocks(&self, peer: PeerId) {
        self.thin_block_peers.write().insert(peer);
    }

    pub fn supports_thin_blocks(&self, peer: &PeerId) -> bool {
        self.thin_block_peers.read().contains(peer)
    }
}

impl AnnounceReceiver for InFlightAnnouncePolicy {
    fn on_block_announced(
        &self,
        peer: PeerId,
        hash: Hash,
        to_get: &mut Vec<InventoryItem>,
    ) -> bool {
        if self.registry.is_in_flight(&hash) {
            return false;
        }
        if self.registry.count_for(&peer) >= self.max_blocks_in_transit_per_peer {
            return false;
        }

        let item = if self.supports_thin_blocks(&peer) {
            InventoryItem::thin_block(hash)
        } else {
            InventoryItem::block(hash)
        };
        to_get.push(item);
        true
    }
}
