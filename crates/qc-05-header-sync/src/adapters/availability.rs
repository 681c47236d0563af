//! Block availability hints per peer.

use parking_lot::RwLock;
use shared_types::Hash;
use std::collections::HashMap;

use crate::domain::PeerId;
use crate::ports::BlockAvailability;

/// Remembers the latest block each peer claimed to have.
#[derive(Debug, Default)]
pub struct AvailabilityBook {
    hints: RwLock<HashMap<PeerId, Hash>>,
}

impl AvailabilityBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_announced(&self, peer: &PeerId) -> Option<Hash> {
        self.hints.read().get(peer).copied()
    }

    pub fn forget(&self, peer: &PeerId) {
        self.hints.write().remove(peer);
    }
}

impl BlockAvailability for AvailabilityBook {
    fn update_block_availability(&self, peer: PeerId, hash: Hash) {
        self.hints.write().insert(peer, hash);
    }
}
