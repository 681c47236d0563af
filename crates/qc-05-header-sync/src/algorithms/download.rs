//! # Download Dispatcher
//!
//! Turns the direct-fetch selection into one `getdata` request, asking the
//! announcement policy block by block and stopping at the first refusal so
//! no gap is left behind a requested block.

use tracing::debug;

use crate::domain::{ConsensusParams, HeaderRecord, InventoryItem, PeerId};
use crate::ports::{HeaderSyncPorts, NetworkMessage};

/// Request `to_fetch` (ascending height) from `peer`.
///
/// `tip` is the branch head the blocks lead to; it is only logged.
/// Returns the number of blocks requested.
pub fn suggest_download(
    peer: PeerId,
    to_fetch: &[HeaderRecord],
    tip: &HeaderRecord,
    ports: &HeaderSyncPorts,
    params: &ConsensusParams,
) -> usize {
    let mut to_get: Vec<InventoryItem> = Vec::with_capacity(to_fetch.len());

    for block in to_fetch {
        if !ports.announce.on_block_announced(peer, block.hash, &mut to_get) {
            break;
        }
        ports.in_flight_marker.mark_in_flight(peer, block.hash, params);
    }

    if to_get.is_empty() {
        return 0;
    }

    let requested = to_get.len();
    debug!(
        tip = %tip.short_hash(),
        height = tip.height,
        %peer,
        blocks = requested,
        "Downloading blocks toward tip via headers direct fetch"
    );
    ports
        .messenger
        .push_message(peer, NetworkMessage::GetData { inventory: to_get });

    requested
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::fixtures::Fixture;
    use crate::config::HeaderSyncConfig;
    use crate::domain::InventoryKind;
    use crate::ports::{AnnounceReceiver, InFlightIndex};
    use parking_lot::Mutex;
    use shared_types::Hash;
    use std::sync::Arc;

    /// Accepts everything except one hash, remembering what it was asked.
    struct RefuseOne {
        refuse: Hash,
        asked: Mutex<Vec<Hash>>,
    }

    impl AnnounceReceiver for RefuseOne {
        fn on_block_announced(
            &self,
            _peer: PeerId,
            hash: Hash,
            to_get: &mut Vec<InventoryItem>,
        ) -> bool {
            self.asked.lock().push(hash);
            if hash == self.refuse {
                return false;
            }
            to_get.push(InventoryItem::block(hash));
            true
        }
    }

    fn candidates(fx: &Fixture, count: usize) -> Vec<HeaderRecord> {
        fx.extend(&fx.genesis, count, 1)
            .iter()
            .map(|h| fx.record(h))
            .collect()
    }

    #[test]
    fn test_requests_all_in_one_message() {
        let fx = Fixture::new(HeaderSyncConfig::default());
        let blocks = candidates(&fx, 5);
        let tip = blocks[4];

        let requested = suggest_download(fx.peer_id(), &blocks, &tip, &fx.ports(), &fx.params);
        assert_eq!(requested, 5);

        let messages = fx.node.outbox.drain(fx.peer_id());
        assert_eq!(messages.len(), 1);
        let NetworkMessage::GetData { inventory } = &messages[0] else {
            panic!("expected getdata, got {:?}", messages[0]);
        };
        let hashes: Vec<Hash> = inventory.iter().map(|item| item.hash).collect();
        let expected: Vec<Hash> = blocks.iter().map(|r| r.hash).collect();
        assert_eq!(hashes, expected);
        assert!(inventory.iter().all(|item| item.kind == InventoryKind::Block));

        for block in &blocks {
            let entry = fx.node.in_flight.entry(&block.hash).unwrap();
            assert_eq!(entry.peer, fx.peer_id());
        }
    }

    #[test]
    fn test_refusal_stops_later_blocks() {
        let fx = Fixture::new(HeaderSyncConfig::default());
        let blocks = candidates(&fx, 5);
        let policy = Arc::new(RefuseOne {
            refuse: blocks[2].hash,
            asked: Mutex::new(Vec::new()),
        });
        let mut ports = fx.ports();
        ports.announce = policy.clone();

        let requested = suggest_download(fx.peer_id(), &blocks, &blocks[4], &ports, &fx.params);
        assert_eq!(requested, 2);

        // the 4th and 5th are never evaluated
        assert_eq!(*policy.asked.lock(), vec![blocks[0].hash, blocks[1].hash, blocks[2].hash]);
        assert!(fx.node.in_flight.is_in_flight(&blocks[1].hash));
        assert!(!fx.node.in_flight.is_in_flight(&blocks[2].hash));
        assert!(!fx.node.in_flight.is_in_flight(&blocks[3].hash));

        let messages = fx.node.outbox.drain(fx.peer_id());
        assert_eq!(
            messages,
            vec![NetworkMessage::GetData {
                inventory: vec![InventoryItem::block(blocks[0].hash), InventoryItem::block(blocks[1].hash)],
            }]
        );
    }

    #[test]
    fn test_first_refusal_sends_nothing() {
        let fx = Fixture::new(HeaderSyncConfig::default());
        let blocks = candidates(&fx, 3);
        let mut ports = fx.ports();
        ports.announce = Arc::new(RefuseOne {
            refuse: blocks[0].hash,
            asked: Mutex::new(Vec::new()),
        });

        assert_eq!(suggest_download(fx.peer_id(), &blocks, &blocks[2], &ports, &fx.params), 0);
        assert!(fx.node.outbox.is_empty());
        assert!(fx.node.in_flight.is_empty());
    }

    #[test]
    fn test_peer_capacity_limits_request() {
        let fx = Fixture::new(HeaderSyncConfig::for_testing());
        let blocks = candidates(&fx, 6);
        fx.node.announce.enable_thin_blocks(fx.peer_id());

        let requested = suggest_download(fx.peer_id(), &blocks, &blocks[5], &fx.ports(), &fx.params);
        assert_eq!(requested, fx.config.max_blocks_in_transit_per_peer);
        assert_eq!(fx.node.in_flight.count_for(&fx.peer_id()), 4);

        let messages = fx.node.outbox.drain(fx.peer_id());
        let NetworkMessage::GetData { inventory } = &messages[0] else {
            panic!("expected getdata");
        };
        assert!(inventory.iter().all(|item| item.kind == InventoryKind::ThinBlock));
    }

    #[test]
    fn test_empty_selection() {
        let fx = Fixture::new(HeaderSyncConfig::default());
        let tip = fx.node.graph.active_tip().unwrap();
        assert_eq!(suggest_download(fx.peer_id(), &[], &tip, &fx.ports(), &fx.params), 0);
        assert!(fx.node.outbox.is_empty());
    }
}
