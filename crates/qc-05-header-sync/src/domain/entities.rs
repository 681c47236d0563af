//! # Core Domain Entities
//!
//! Defines the fundamental data structures for header synchronization.
//!
//! ## Entities
//!
//! - [`HeaderRecord`]: A node of the header graph (hash-linked, never pointer-linked)
//! - [`ValidityTier`]: How far a header has progressed through validation
//! - [`PeerId`]: 32-byte peer identifier for P2P communication
//! - [`PeerSyncState`]: Per-connection sync bookkeeping owned by the connection

use shared_types::{Hash, ShortHash, U256};
use std::fmt;

/// Validation progress of a header record.
///
/// Variants are ordered: a record "is valid up to" a tier when its tier
/// compares greater than or equal to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ValidityTier {
    /// Nothing checked yet.
    #[default]
    Unknown,
    /// Structure and proof-of-work checked.
    Header,
    /// Parent known and tree-valid; cumulative work computed.
    Tree,
    /// Transactions structurally checked.
    Transactions,
    /// Contextually valid against its ancestors.
    Chain,
    /// Fully validated including scripts.
    Scripts,
}

/// A node in the process-wide header graph.
///
/// Records are owned by the header graph store and handed out by value.
/// The parent link is `parent_hash`, resolved through the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaderRecord {
    /// Content hash of the header.
    pub hash: Hash,
    /// Hash of the parent header.
    pub parent_hash: Hash,
    /// Height in the header graph (0 = genesis).
    pub height: u64,
    /// Total work from genesis up to and including this header.
    pub chain_work: U256,
    /// Validation progress.
    pub validity: ValidityTier,
    /// Full block body available locally.
    pub has_data: bool,
    /// Header timestamp.
    pub timestamp: u32,
}

impl HeaderRecord {
    /// True if the record has reached at least `tier`.
    pub fn is_valid(&self, tier: ValidityTier) -> bool {
        self.validity >= tier
    }

    /// Abbreviated hash for log lines.
    pub fn short_hash(&self) -> ShortHash<'_> {
        ShortHash(&self.hash)
    }
}

/// Peer identifier for P2P network communication.
///
/// A 32-byte identifier derived from the peer's public key or
/// Kademlia node ID.
///
/// # Example
///
/// ```rust
/// use qc_05_header_sync::PeerId;
///
/// let peer = PeerId::new([0xAB; 32]);
/// let peer_from_bytes = PeerId::from_bytes(&[0xAB; 32]).unwrap();
/// assert_eq!(peer, peer_from_bytes);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PeerId(pub [u8; 32]);

impl PeerId {
    /// Creates a new peer ID from a 32-byte array.
    pub fn new(id: [u8; 32]) -> Self {
        Self(id)
    }

    /// Creates a peer ID from a byte slice.
    ///
    /// Returns `None` if the slice is shorter than 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() >= 32 {
            let mut id = [0u8; 32];
            id.copy_from_slice(&bytes[..32]);
            Some(Self(id))
        } else {
            None
        }
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&ShortHash(&self.0), f)
    }
}

/// Per-connection header sync state.
///
/// Owned by the connection and lent to the sync service for the duration of
/// one call, so only the owning connection can ever mutate it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerSyncState {
    /// Remote peer.
    pub peer_id: PeerId,
    /// Consecutive header announcements that did not connect.
    pub unconnecting_headers: u32,
    /// Best height the peer advertised during the handshake.
    pub starting_height: u64,
}

impl PeerSyncState {
    /// Fresh state for a newly established connection.
    pub fn new(peer_id: PeerId) -> Self {
        Self {
            peer_id,
            unconnecting_headers: 0,
            starting_height: 0,
        }
    }

    /// Builder method: set the handshake starting height.
    pub fn with_starting_height(mut self, starting_height: u64) -> Self {
        self.starting_height = starting_height;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity_ordering() {
        assert!(ValidityTier::Scripts > ValidityTier::Tree);
        assert!(ValidityTier::Tree > ValidityTier::Header);
        assert!(ValidityTier::Header > ValidityTier::Unknown);
    }

    #[test]
    fn test_record_is_valid() {
        let record = HeaderRecord {
            hash: [1u8; 32],
            parent_hash: [0u8; 32],
            height: 1,
            chain_work: U256::from(2u64),
            validity: ValidityTier::Tree,
            has_data: false,
            timestamp: 0,
        };
        assert!(record.is_valid(ValidityTier::Header));
        assert!(record.is_valid(ValidityTier::Tree));
        assert!(!record.is_valid(ValidityTier::Scripts));
    }

    #[test]
    fn test_peer_id_from_bytes() {
        let bytes = [0xABu8; 32];
        let peer = PeerId::from_bytes(&bytes);
        assert!(peer.is_some());
        assert_eq!(peer.unwrap().0, bytes);
        assert!(PeerId::from_bytes(&bytes[..31]).is_none());
    }

    #[test]
    fn test_peer_state_starts_clean() {
        let state = PeerSyncState::new(PeerId::new([7u8; 32])).with_starting_height(500);
        assert_eq!(state.unconnecting_headers, 0);
        assert_eq!(state.starting_height, 500);
        assert_eq!(state.peer_id.to_string(), "0707070707070707");
    }
}
