//! # In-Memory Header Graph
//!
//! Reference store implementing every header-graph port:
//!
//! - [`HeaderGraph`]: lookup by hash, best known header
//! - [`HeaderValidator`]: structural/PoW acceptance and commit
//! - [`ActiveChain`]: height-indexed active chain and locators
//! - [`ConsistencyCheck`]: whole-graph self check
//!
//! All state sits behind one `RwLock`, so each port call observes a
//! consistent graph.

use parking_lot::RwLock;
use shared_types::{
    block_proof, hash_meets_target, target_from_compact, BlockHeader, Hash, ShortHash, U256,
    ZERO_HASH,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

use crate::config::HeaderSyncConfig;
use crate::domain::{BlockLocator, ConsensusParams, HeaderRecord, HeaderRejection, ValidityTier};
use crate::ports::{ActiveChain, ConsistencyCheck, HeaderGraph, HeaderValidator, TimeSource};

/// Locator entries taken one by one before the step starts doubling.
const LOCATOR_DENSE_ENTRIES: usize = 10;

struct GraphState {
    records: HashMap<Hash, HeaderRecord>,
    failed: HashSet<Hash>,
    best_header: Hash,
    /// Active chain hashes indexed by height.
    active: Vec<Hash>,
}

impl GraphState {
    fn ancestor(&self, from: &HeaderRecord, height: u64) -> Option<HeaderRecord> {
        if height > from.height {
            return None;
        }
        if self.active.get(height as usize).is_some() && self.in_active(from) {
            return self.active.get(height as usize).and_then(|h| self.records.get(h)).copied();
        }
        let mut cursor = *from;
        while cursor.height > height {
            cursor = *self.records.get(&cursor.parent_hash)?;
        }
        Some(cursor)
    }

    fn in_active(&self, record: &HeaderRecord) -> bool {
        self.active.get(record.height as usize) == Some(&record.hash)
    }

    fn active_tip(&self) -> Option<&HeaderRecord> {
        self.active.last().and_then(|hash| self.records.get(hash))
    }
}

/// In-memory header graph with proof-of-work acceptance.
pub struct MemoryHeaderGraph {
    state: RwLock<GraphState>,
    genesis_hash: Hash,
    pow_limit: U256,
    max_future_block_time_secs: u64,
    time: Arc<dyn TimeSource>,
    checks_run: AtomicU64,
}

impl MemoryHeaderGraph {
    /// Create a graph holding only `genesis`, which is also the active tip.
    ///
    /// Genesis is stored fully validated with its block data present.
    pub fn new(
        genesis: &BlockHeader,
        params: &ConsensusParams,
        config: &HeaderSyncConfig,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let hash = genesis.block_hash();
        let work = target_from_compact(genesis.bits)
            .map(block_proof)
            .unwrap_or_default();
        let record = HeaderRecord {
            hash,
            parent_hash: genesis.parent_hash,
            height: 0,
            chain_work: work,
            validity: ValidityTier::Scripts,
            has_data: true,
            timestamp: genesis.timestamp,
        };

        let mut records = HashMap::new();
        records.insert(hash, record);

        Self {
            state: RwLock::new(GraphState {
                records,
                failed: HashSet::new(),
                best_header: hash,
                active: vec![hash],
            }),
            genesis_hash: hash,
            pow_limit: target_from_compact(params.pow_limit_bits).unwrap_or(U256::MAX),
            max_future_block_time_secs: config.max_future_block_time_secs,
            time,
            checks_run: AtomicU64::new(0),
        }
    }

    pub fn genesis_hash(&self) -> Hash {
        self.genesis_hash
    }

    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().records.is_empty()
    }

    pub fn contains_hash(&self, hash: &Hash) -> bool {
        self.state.read().records.contains_key(hash)
    }

    /// Active tip record.
    pub fn active_tip(&self) -> Option<HeaderRecord> {
        self.state.read().active_tip().copied()
    }

    /// Make `hash` the active tip, rebuilding the height index from it.
    ///
    /// Returns `false` if the hash is unknown or its ancestry is incomplete.
    pub fn set_active_tip(&self, hash: &Hash) -> bool {
        let mut state = self.state.write();
        let Some(tip) = state.records.get(hash).copied() else {
            return false;
        };

        let mut chain = vec![ZERO_HASH; tip.height as usize + 1];
        let mut cursor = tip;
        loop {
            chain[cursor.height as usize] = cursor.hash;
            if cursor.height == 0 {
                break;
            }
            match state.records.get(&cursor.parent_hash) {
                Some(parent) => cursor = *parent,
                None => return false,
            }
        }

        state.active = chain;
        debug!(tip = %ShortHash(hash), height = tip.height, "Active chain updated");
        true
    }

    /// Record that the full block body for `hash` is stored locally.
    pub fn mark_have_data(&self, hash: &Hash) -> bool {
        match self.state.write().records.get_mut(hash) {
            Some(record) => {
                record.has_data = true;
                true
            }
            None => false,
        }
    }

    /// Upgrade the validity tier of `hash`. Never downgrades.
    pub fn raise_validity(&self, hash: &Hash, tier: ValidityTier) -> bool {
        match self.state.write().records.get_mut(hash) {
            Some(record) => {
                if tier > record.validity {
                    record.validity = tier;
                }
                true
            }
            None => false,
        }
    }

    /// Flag `hash` as failed validation; descendants will be rejected.
    pub fn mark_failed(&self, hash: &Hash) {
        self.state.write().failed.insert(*hash);
    }

    /// Number of consistency checks run so far.
    pub fn consistency_checks_run(&self) -> u64 {
        self.checks_run.load(Ordering::Relaxed)
    }

    /// Describe every structural inconsistency in the graph.
    pub fn find_inconsistencies(&self) -> Vec<String> {
        let state = self.state.read();
        let mut problems = Vec::new();

        for record in state.records.values() {
            if record.hash == self.genesis_hash {
                continue;
            }
            let Some(parent) = state.records.get(&record.parent_hash) else {
                problems.push(format!("{} has no parent", ShortHash(&record.hash)));
                continue;
            };
            if record.height != parent.height + 1 {
                problems.push(format!(
                    "{} at height {} but parent at {}",
                    ShortHash(&record.hash),
                    record.height,
                    parent.height
                ));
            }
            if record.chain_work <= parent.chain_work {
                problems.push(format!("{} does not add work", ShortHash(&record.hash)));
            }
        }

        if let Some(best) = state.records.get(&state.best_header) {
            if state.records.values().any(|r| r.chain_work > best.chain_work) {
                problems.push("best header is not the most-work header".to_string());
            }
        } else {
            problems.push("best header missing".to_string());
        }

        for (height, hash) in state.active.iter().enumerate() {
            match state.records.get(hash) {
                Some(record) if record.height == height as u64 => {}
                _ => problems.push(format!("active chain broken at height {height}")),
            }
        }

        problems
    }

    fn reject(severity: u32, reason: &str) -> HeaderRejection {
        HeaderRejection::new(severity, reason)
    }
}

impl HeaderGraph for MemoryHeaderGraph {
    fn lookup(&self, hash: &Hash) -> Option<HeaderRecord> {
        self.state.read().records.get(hash).copied()
    }

    fn best_header(&self) -> Option<HeaderRecord> {
        let state = self.state.read();
        state.records.get(&state.best_header).copied()
    }
}

impl HeaderValidator for MemoryHeaderGraph {
    fn accept_block_header(&self, header: &BlockHeader) -> Result<HeaderRecord, HeaderRejection> {
        let hash = header.block_hash();
        let mut state = self.state.write();

        if let Some(existing) = state.records.get(&hash) {
            if state.failed.contains(&hash) {
                return Err(Self::reject(100, "duplicate-invalid"));
            }
            return Ok(*existing);
        }

        let target = target_from_compact(header.bits)
            .filter(|target| *target <= self.pow_limit)
            .ok_or_else(|| Self::reject(50, "bad-diffbits"))?;
        if !hash_meets_target(&hash, target) {
            return Err(Self::reject(50, "high-hash"));
        }

        let parent = *state
            .records
            .get(&header.parent_hash)
            .ok_or_else(|| Self::reject(10, "prev-blk-not-found"))?;
        if state.failed.contains(&parent.hash) {
            return Err(Self::reject(100, "bad-prevblk"));
        }

        let limit = self
            .time
            .now_secs()
            .saturating_add(self.max_future_block_time_secs);
        if u64::from(header.timestamp) > limit {
            return Err(Self::reject(0, "time-too-new"));
        }

        let record = HeaderRecord {
            hash,
            parent_hash: header.parent_hash,
            height: parent.height + 1,
            chain_work: parent.chain_work.saturating_add(block_proof(target)),
            validity: ValidityTier::Tree,
            has_data: false,
            timestamp: header.timestamp,
        };
        state.records.insert(hash, record);

        let best_work = state
            .records
            .get(&state.best_header)
            .map(|best| best.chain_work)
            .unwrap_or_default();
        if record.chain_work > best_work {
            state.best_header = hash;
        }

        Ok(record)
    }
}

impl ActiveChain for MemoryHeaderGraph {
    fn tip_work(&self) -> U256 {
        self.state
            .read()
            .active_tip()
            .map(|tip| tip.chain_work)
            .unwrap_or_default()
    }

    fn contains(&self, record: &HeaderRecord) -> bool {
        self.state.read().in_active(record)
    }

    fn locator(&self, record: &HeaderRecord) -> BlockLocator {
        let state = self.state.read();
        let mut hashes = Vec::with_capacity(32);
        let mut step = 1u64;
        let mut cursor = Some(*record);

        while let Some(block) = cursor {
            hashes.push(block.hash);
            if block.height == 0 {
                break;
            }
            let height = block.height.saturating_sub(step);
            cursor = state.ancestor(&block, height);
            if hashes.len() > LOCATOR_DENSE_ENTRIES {
                step *= 2;
            }
        }

        BlockLocator::new(hashes)
    }
}

impl ConsistencyCheck for MemoryHeaderGraph {
    fn check_header_graph(&self) {
        self.checks_run.fetch_add(1, Ordering::Relaxed);
        for problem in self.find_inconsistencies() {
            error!(%problem, "Header graph inconsistency");
        }
    }
}
