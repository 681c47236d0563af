//! # Header Sync Service
//!
//! Entry point invoked by a connection's message-dispatch layer for every
//! inbound `headers` message and for single-header announcements.
//!
//! ## Pipeline
//!
//! ```text
//! headers ──→ accept_headers ──→ reset unconnecting counter
//!                   │
//!                   ├──→ availability hint
//!                   ├──→ getheaders (batch was full)
//!                   ├──→ find_missing_blocks ──→ suggest_download (announcement)
//!                   └──→ consistency check
//! ```
//!
//! ## Thread Safety
//!
//! The service holds no mutable state. Shared stores guard themselves behind
//! their ports and per-peer state is lent in by `&mut`, so one service can be
//! shared across connection handlers via `Arc`.

use shared_types::BlockHeader;
use tracing::debug;

use crate::algorithms::{accept_headers, find_missing_blocks, request_connect_headers, suggest_download};
use crate::config::HeaderSyncConfig;
use crate::domain::{
    invariant_has_equal_or_more_work, ConfigError, ConsensusParams, HeaderRecord, HeaderSyncError,
    PeerSyncState,
};
use crate::ports::{HeaderProcessor, HeaderSyncPorts, NetworkMessage};

/// Header synchronization and direct-fetch service.
pub struct HeaderSyncService {
    config: HeaderSyncConfig,
    params: ConsensusParams,
    ports: HeaderSyncPorts,
}

impl HeaderSyncService {
    /// Create a service after validating `config`.
    pub fn new(
        config: HeaderSyncConfig,
        params: ConsensusParams,
        ports: HeaderSyncPorts,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            params,
            ports,
        })
    }

    pub fn config(&self) -> &HeaderSyncConfig {
        &self.config
    }

    pub fn params(&self) -> &ConsensusParams {
        &self.params
    }

    /// True if direct fetch toward `tip` is worthwhile.
    pub fn has_equal_or_more_work(&self, tip: &HeaderRecord) -> bool {
        invariant_has_equal_or_more_work(tip, self.ports.active_chain.tip_work())
    }

    /// Select and request missing blocks toward `tip`.
    ///
    /// Returns the number of blocks requested from the peer.
    fn direct_fetch(&self, peer: &PeerSyncState, tip: &HeaderRecord) -> usize {
        let to_fetch = find_missing_blocks(
            tip,
            self.ports.graph.as_ref(),
            self.ports.active_chain.as_ref(),
            self.ports.in_flight.as_ref(),
            &self.config,
        );
        suggest_download(peer.peer_id, &to_fetch, tip, &self.ports, &self.params)
    }
}

impl HeaderProcessor for HeaderSyncService {
    fn process_headers(
        &self,
        peer: &mut PeerSyncState,
        headers: &[BlockHeader],
        peer_sent_max: bool,
        maybe_announcement: bool,
    ) -> Result<Option<HeaderRecord>, HeaderSyncError> {
        let last = accept_headers(
            peer.peer_id,
            headers,
            self.ports.validator.as_ref(),
            self.ports.misbehavior.as_ref(),
            &self.config,
        )?;

        peer.unconnecting_headers = 0;

        if let Some(tip) = &last {
            self.ports
                .availability
                .update_block_availability(peer.peer_id, tip.hash);

            if peer_sent_max {
                debug!(
                    height = tip.height,
                    peer = %peer.peer_id,
                    start_height = peer.starting_height,
                    "More getheaders to end of peer's chain"
                );
                self.ports.messenger.push_message(
                    peer.peer_id,
                    NetworkMessage::GetHeaders {
                        locator: self.ports.active_chain.locator(tip),
                        hash_stop: None,
                    },
                );
            }

            if maybe_announcement && self.has_equal_or_more_work(tip) {
                self.direct_fetch(peer, tip);
            }
        }

        self.ports.consistency.check_header_graph();
        Ok(last)
    }

    fn request_connect_headers(
        &self,
        peer: &mut PeerSyncState,
        header: &BlockHeader,
        bump_unconnecting: bool,
    ) -> bool {
        request_connect_headers(peer, header, bump_unconnecting, &self.ports, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::fixtures::Fixture;
    use crate::domain::ValidityTier;
    use crate::ports::HeaderGraph;

    fn service(fx: &Fixture) -> HeaderSyncService {
        HeaderSyncService::new(fx.config.clone(), fx.params.clone(), fx.ports()).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let fx = Fixture::new(HeaderSyncConfig::default());
        let config = HeaderSyncConfig {
            direct_fetch_walk_limit: 0,
            ..HeaderSyncConfig::default()
        };
        assert!(HeaderSyncService::new(config, fx.params.clone(), fx.ports()).is_err());
    }

    #[test]
    fn test_empty_batch_still_resets_and_checks() {
        let mut fx = Fixture::new(HeaderSyncConfig::default());
        let svc = service(&fx);
        fx.peer.unconnecting_headers = 3;

        let result = svc.process_headers(&mut fx.peer, &[], true, true).unwrap();
        assert!(result.is_none());
        assert_eq!(fx.peer.unconnecting_headers, 0);
        assert!(fx.node.outbox.is_empty());
        assert_eq!(fx.node.graph.consistency_checks_run(), 1);
    }

    #[test]
    fn test_error_skips_post_processing() {
        let mut fx = Fixture::new(HeaderSyncConfig::default());
        let svc = service(&fx);
        fx.peer.unconnecting_headers = 3;
        let main = fx.mine(&fx.genesis, 2, 1);
        let stray = fx.mine(&fx.genesis, 1, 2);

        let err = svc
            .process_headers(&mut fx.peer, &[main[0], stray[0]], true, true)
            .unwrap_err();
        assert_eq!(err.committed(), 1);
        assert_eq!(fx.peer.unconnecting_headers, 3);
        assert!(fx.node.outbox.is_empty());
        assert!(fx.node.availability.last_announced(&fx.peer.peer_id).is_none());
        assert_eq!(fx.node.graph.consistency_checks_run(), 0);
    }

    #[test]
    fn test_weaker_branch_not_fetched() {
        let mut fx = Fixture::new(HeaderSyncConfig::default());
        let svc = service(&fx);
        let main = fx.extend(&fx.genesis, 4, 1);
        fx.node.graph.set_active_tip(&main[3].block_hash());

        let fork = fx.mine(&main[0], 2, 2);
        let tip = svc
            .process_headers(&mut fx.peer, &fork, false, true)
            .unwrap()
            .unwrap();
        assert!(!svc.has_equal_or_more_work(&tip));
        assert!(fx.node.outbox.is_empty());
        assert!(fx.node.in_flight.is_empty());
    }

    #[test]
    fn test_equal_work_branch_is_fetched() {
        let mut fx = Fixture::new(HeaderSyncConfig::default());
        let svc = service(&fx);
        let main = fx.extend(&fx.genesis, 3, 1);
        fx.node.graph.set_active_tip(&main[2].block_hash());

        let fork = fx.mine(&main[0], 2, 2);
        let tip = svc
            .process_headers(&mut fx.peer, &fork, false, true)
            .unwrap()
            .unwrap();
        assert_eq!(tip.chain_work, fx.node.graph.lookup(&main[2].block_hash()).unwrap().chain_work);
        assert_eq!(fx.node.in_flight.len(), 2);
    }

    #[test]
    fn test_not_tree_valid_is_not_fetched() {
        let fx = Fixture::new(HeaderSyncConfig::default());
        let svc = service(&fx);
        let headers = fx.extend(&fx.genesis, 1, 1);
        let mut tip = fx.record(&headers[0]);
        tip.validity = ValidityTier::Header;
        assert!(!svc.has_equal_or_more_work(&tip));
    }
}
