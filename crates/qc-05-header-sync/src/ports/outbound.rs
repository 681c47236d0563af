//! Outbound ports (SPI) for the Header Sync subsystem.
//!
//! Each trait is a narrow contract with one collaborator. All of them take
//! `&self`: implementations guard their own state so a single service can be
//! shared across connection handlers.

use shared_types::{BlockHeader, Hash, U256};

use crate::domain::{
    BlockLocator, ConsensusParams, HeaderRecord, HeaderRejection, InventoryItem, PeerId,
};

/// Read access to the header graph.
pub trait HeaderGraph: Send + Sync {
    /// Look up a record by hash.
    fn lookup(&self, hash: &Hash) -> Option<HeaderRecord>;

    /// Header with the most cumulative work known, valid or not yet connected.
    fn best_header(&self) -> Option<HeaderRecord>;
}

/// Structural/PoW header acceptance and commit into the header graph.
pub trait HeaderValidator: Send + Sync {
    /// Accept `header` into the graph, returning its record.
    ///
    /// Accepting an already known header returns the existing record.
    fn accept_block_header(&self, header: &BlockHeader) -> Result<HeaderRecord, HeaderRejection>;
}

/// View of the currently selected best chain.
pub trait ActiveChain: Send + Sync {
    /// Cumulative work of the active tip.
    fn tip_work(&self) -> U256;

    /// True if `record` is part of the active chain.
    fn contains(&self, record: &HeaderRecord) -> bool;

    /// Locator starting at `record`.
    fn locator(&self, record: &HeaderRecord) -> BlockLocator;
}

/// Network message types sent by header sync.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkMessage {
    /// Ask for headers following the first locator hash the peer recognizes.
    GetHeaders {
        locator: BlockLocator,
        hash_stop: Option<Hash>,
    },
    /// Ask for blocks, in the given order.
    GetData { inventory: Vec<InventoryItem> },
}

/// Outbound queue of a connection. Sends are fire-and-forget.
pub trait PeerMessenger: Send + Sync {
    fn push_message(&self, peer: PeerId, message: NetworkMessage);
}

/// Sink for misbehavior reports; scoring and banning live behind it.
pub trait MisbehaviorSink: Send + Sync {
    fn misbehaving(&self, peer: PeerId, severity: u32, reason: &str);
}

/// Records which block a peer claims to have.
pub trait BlockAvailability: Send + Sync {
    fn update_block_availability(&self, peer: PeerId, hash: Hash);
}

/// Query side of the process-wide in-flight registry.
pub trait InFlightIndex: Send + Sync {
    fn is_in_flight(&self, hash: &Hash) -> bool;
}

/// Mutation side of the process-wide in-flight registry.
pub trait InFlightMarker: Send + Sync {
    fn mark_in_flight(&self, peer: PeerId, hash: Hash, params: &ConsensusParams);
}

/// Block-announcement admission policy.
pub trait AnnounceReceiver: Send + Sync {
    /// Decide whether to request `hash` from `peer` now.
    ///
    /// On `true` the policy has appended the inventory item it wants
    /// (full or thin block) to `to_get`.
    fn on_block_announced(&self, peer: PeerId, hash: Hash, to_get: &mut Vec<InventoryItem>)
        -> bool;
}

/// Header-graph self check, run once per processed batch.
pub trait ConsistencyCheck: Send + Sync {
    fn check_header_graph(&self);
}

/// Wall-clock source, injected so tests can pin time.
pub trait TimeSource: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now_secs(&self) -> u64;

    /// Microseconds since the Unix epoch.
    fn now_micros(&self) -> u64 {
        self.now_secs().saturating_mul(1_000_000)
    }
}
