//! Value objects exchanged with peers and collaborators.

use shared_types::{Hash, REGTEST_POW_LIMIT_BITS, ZERO_HASH};

/// Compact summary of ancestor hashes.
///
/// Dense near the starting block and exponentially sparser towards genesis,
/// so a peer can find the most recent block both sides know.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockLocator(Vec<Hash>);

impl BlockLocator {
    pub fn new(hashes: Vec<Hash>) -> Self {
        Self(hashes)
    }

    pub fn hashes(&self) -> &[Hash] {
        &self.0
    }

    /// The block the locator was built from, if any.
    pub fn first(&self) -> Option<&Hash> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Representation requested for a block in a `getdata` message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InventoryKind {
    /// Full serialized block.
    Block,
    /// Thin-block placeholder, reconstructed later from the mempool.
    ThinBlock,
}

/// One entry of a `getdata` request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InventoryItem {
    pub kind: InventoryKind,
    pub hash: Hash,
}

impl InventoryItem {
    pub fn block(hash: Hash) -> Self {
        Self {
            kind: InventoryKind::Block,
            hash,
        }
    }

    pub fn thin_block(hash: Hash) -> Self {
        Self {
            kind: InventoryKind::ThinBlock,
            hash,
        }
    }
}

/// Network consensus parameters relevant to header sync.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsensusParams {
    /// Hash of the genesis header.
    pub genesis_hash: Hash,
    /// Compact bits of the easiest allowed target.
    pub pow_limit_bits: u32,
    /// Target block spacing in seconds.
    pub pow_target_spacing_secs: u64,
}

impl ConsensusParams {
    /// Parameters for a private test network with the given genesis.
    pub fn regtest(genesis_hash: Hash) -> Self {
        Self {
            genesis_hash,
            pow_limit_bits: REGTEST_POW_LIMIT_BITS,
            pow_target_spacing_secs: 600,
        }
    }
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self::regtest(ZERO_HASH)
    }
}
