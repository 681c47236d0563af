//! # Core Domain Entities
//!
//! Chain primitives shared by the header synchronization subsystem and its
//! adapters.
//!
//! ## Contents
//!
//! - **Hashes**: `Hash`, `ShortHash` display helper
//! - **Chain**: `BlockHeader` (80-byte proof-of-work header)
//! - **Work**: `U256` re-export used for cumulative chain work

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

// Re-export U256 from primitive-types for use across all subsystems
pub use primitive_types::U256;

/// A 32-byte hash (double SHA-256 for headers).
pub type Hash = [u8; 32];

/// The all-zero hash, used as "no parent" for genesis.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Serialized size of a block header in bytes.
pub const HEADER_SIZE: usize = 80;

/// Proof-of-work block header as carried in `headers` messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockHeader {
    /// Block format version.
    pub version: u32,
    /// Hash of the parent block (creates the chain linkage).
    pub parent_hash: Hash,
    /// Merkle root of all transactions in the block.
    pub merkle_root: Hash,
    /// Unix timestamp claimed by the miner.
    pub timestamp: u32,
    /// Compact encoding of the proof-of-work target.
    pub bits: u32,
    /// Miner nonce.
    pub nonce: u32,
}

impl BlockHeader {
    /// Serializes the header into its 80-byte little-endian wire form.
    pub fn serialize(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&self.version.to_le_bytes());
        out[4..36].copy_from_slice(&self.parent_hash);
        out[36..68].copy_from_slice(&self.merkle_root);
        out[68..72].copy_from_slice(&self.timestamp.to_le_bytes());
        out[72..76].copy_from_slice(&self.bits.to_le_bytes());
        out[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        out
    }

    /// Parses a header from its wire form.
    ///
    /// Returns `None` if the slice is shorter than 80 bytes.
    pub fn deserialize(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < HEADER_SIZE {
            return None;
        }
        let word = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        let mut parent_hash = ZERO_HASH;
        parent_hash.copy_from_slice(&bytes[4..36]);
        let mut merkle_root = ZERO_HASH;
        merkle_root.copy_from_slice(&bytes[36..68]);
        Some(Self {
            version: word(0),
            parent_hash,
            merkle_root,
            timestamp: word(68),
            bits: word(72),
            nonce: word(76),
        })
    }

    /// Content hash: SHA-256d over the serialized header.
    pub fn block_hash(&self) -> Hash {
        let first = Sha256::digest(self.serialize());
        let second = Sha256::digest(first);
        let mut hash = ZERO_HASH;
        hash.copy_from_slice(&second);
        hash
    }

    /// True if this header claims no parent.
    pub fn is_genesis(&self) -> bool {
        self.parent_hash == ZERO_HASH
    }
}

/// Abbreviated hex rendering of a hash for log lines.
///
/// Renders the first 8 bytes, which is plenty to correlate log entries.
pub struct ShortHash<'a>(pub &'a Hash);

impl fmt::Display for ShortHash<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0[..8]))
    }
}

impl fmt::Debug for ShortHash<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
