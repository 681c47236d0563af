//! # Unconnected Header Resolver
//!
//! Handles a header announcement whose parent is not in the header graph:
//! ask the peer for the missing headers and escalate on repeat offenders.

use shared_types::{BlockHeader, ShortHash};
use tracing::debug;

use crate::config::HeaderSyncConfig;
use crate::domain::{invariant_unconnecting_escalation, BlockLocator, PeerSyncState};
use crate::ports::{HeaderGraph, HeaderSyncPorts, NetworkMessage};

/// True if the parent of `header` is present in the header graph.
pub fn header_connects(header: &BlockHeader, graph: &dyn HeaderGraph) -> bool {
    graph.lookup(&header.parent_hash).is_some()
}

/// Request the headers needed to connect `header`.
///
/// Returns `false` without side effects if the header already connects.
/// Otherwise records the peer's claimed block, sends `getheaders` from the
/// best known header and bumps the peer's unconnecting counter. With
/// `bump_unconnecting`, every `max_unconnecting_headers`-th miss is charged
/// as misbehavior.
pub fn request_connect_headers(
    peer: &mut PeerSyncState,
    header: &BlockHeader,
    bump_unconnecting: bool,
    ports: &HeaderSyncPorts,
    config: &HeaderSyncConfig,
) -> bool {
    if header_connects(header, ports.graph.as_ref()) {
        return false;
    }

    let hash = header.block_hash();
    ports.availability.update_block_availability(peer.peer_id, hash);

    debug!(
        hash = %ShortHash(&hash),
        parent = %ShortHash(&header.parent_hash),
        peer = %peer.peer_id,
        "Headers do not connect, requesting missing ancestors"
    );

    let locator = ports
        .graph
        .best_header()
        .map(|best| ports.active_chain.locator(&best))
        .unwrap_or_else(BlockLocator::default);
    ports.messenger.push_message(
        peer.peer_id,
        NetworkMessage::GetHeaders {
            locator,
            hash_stop: None,
        },
    );

    peer.unconnecting_headers = peer.unconnecting_headers.saturating_add(1);
    if bump_unconnecting
        && invariant_unconnecting_escalation(peer.unconnecting_headers, config.max_unconnecting_headers)
    {
        ports
            .misbehavior
            .misbehaving(peer.peer_id, config.misbehavior_severity, "unconnecting-headers");
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::fixtures::Fixture;

    #[test]
    fn test_connecting_header_is_noop() {
        let mut fx = Fixture::new(HeaderSyncConfig::default());
        let ports = fx.ports();
        let header = fx.mine(&fx.genesis, 1, 1)[0];

        assert!(header_connects(&header, ports.graph.as_ref()));
        assert!(!request_connect_headers(&mut fx.peer, &header, true, &ports, &fx.config));
        assert_eq!(fx.peer.unconnecting_headers, 0);
        assert!(fx.node.outbox.is_empty());
        assert!(fx.node.availability.last_announced(&fx.peer.peer_id).is_none());
    }

    #[test]
    fn test_unconnected_requests_from_best_header() {
        let mut fx = Fixture::new(HeaderSyncConfig::default());
        let ports = fx.ports();
        let known = fx.extend(&fx.genesis, 3, 1);
        let missing = fx.mine(&known[2], 2, 2);
        let announced = missing[1];

        assert!(request_connect_headers(&mut fx.peer, &announced, true, &ports, &fx.config));
        assert_eq!(fx.peer.unconnecting_headers, 1);
        assert_eq!(
            fx.node.availability.last_announced(&fx.peer.peer_id),
            Some(announced.block_hash())
        );

        let messages = fx.node.outbox.drain(fx.peer.peer_id);
        assert_eq!(messages.len(), 1);
        match &messages[0] {
            NetworkMessage::GetHeaders { locator, hash_stop } => {
                // best header, not the unconnected one
                assert_eq!(locator.first(), Some(&known[2].block_hash()));
                assert_eq!(*hash_stop, None);
            }
            other => panic!("unexpected message: {other:?}"),
        }
        assert!(fx.node.misbehavior.reports().is_empty());
    }

    #[test]
    fn test_escalates_on_every_tenth_miss() {
        let mut fx = Fixture::new(HeaderSyncConfig::default());
        let ports = fx.ports();
        let orphan = fx.mine(&fx.mine(&fx.genesis, 1, 1)[0], 1, 2)[0];

        for round in 1..=20u32 {
            assert!(request_connect_headers(&mut fx.peer, &orphan, true, &ports, &fx.config));
            let expected = (round / 10) as usize;
            assert_eq!(fx.node.misbehavior.reports().len(), expected, "round {round}");
        }
        assert_eq!(fx.peer.unconnecting_headers, 20);
        let reports = fx.node.misbehavior.reports();
        assert!(reports.iter().all(|r| r.severity == 20 && r.reason == "unconnecting-headers"));
        assert_eq!(fx.node.outbox.len(), 20);
    }

    #[test]
    fn test_without_escalation_never_charges() {
        let mut fx = Fixture::new(HeaderSyncConfig::default());
        let ports = fx.ports();
        let orphan = fx.mine(&fx.mine(&fx.genesis, 1, 1)[0], 1, 2)[0];

        for _ in 0..10 {
            assert!(request_connect_headers(&mut fx.peer, &orphan, false, &ports, &fx.config));
        }
        assert_eq!(fx.peer.unconnecting_headers, 10);
        assert!(fx.node.misbehavior.reports().is_empty());
    }
}
