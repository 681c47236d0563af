//! # Adapters
//!
//! In-memory implementations of the outbound ports, plus [`MemoryNode`]
//! which wires them together the way the node runtime does.
//!
//! ```text
//! adapters/
//! ├── memory_graph.rs   # HeaderGraph + HeaderValidator + ActiveChain + ConsistencyCheck
//! ├── in_flight.rs      # InFlightIndex + InFlightMarker
//! ├── announce.rs       # AnnounceReceiver
//! ├── outbox.rs         # PeerMessenger
//! ├── misbehavior.rs    # MisbehaviorSink
//! ├── availability.rs   # BlockAvailability
//! └── time.rs           # TimeSource
//! ```

mod announce;
mod availability;
mod in_flight;
mod memory_graph;
mod misbehavior;
mod outbox;
mod time;

pub use announce::InFlightAnnouncePolicy;
pub use availability::AvailabilityBook;
pub use in_flight::{block_timeout_micros, InFlightEntry, MemoryInFlightRegistry};
pub use memory_graph::MemoryHeaderGraph;
pub use misbehavior::{MisbehaviorLedger, MisbehaviorReport};
pub use outbox::PeerOutbox;
pub use time::{FixedTimeSource, SystemTimeSource};

use shared_types::BlockHeader;
use std::sync::Arc;

use crate::config::HeaderSyncConfig;
use crate::domain::ConsensusParams;
use crate::ports::{HeaderSyncPorts, TimeSource};

/// Every in-memory adapter, sharing one clock.
///
/// Keeps concrete handles so callers can drive the graph, drain the outbox
/// or inspect misbehavior while the service only sees the ports.
#[derive(Clone)]
pub struct MemoryNode {
    pub graph: Arc<MemoryHeaderGraph>,
    pub in_flight: Arc<MemoryInFlightRegistry>,
    pub announce: Arc<InFlightAnnouncePolicy>,
    pub outbox: Arc<PeerOutbox>,
    pub misbehavior: Arc<MisbehaviorLedger>,
    pub availability: Arc<AvailabilityBook>,
}

impl MemoryNode {
    pub fn new(
        genesis: &BlockHeader,
        params: &ConsensusParams,
        config: &HeaderSyncConfig,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let graph = Arc::new(MemoryHeaderGraph::new(genesis, params, config, time.clone()));
        let in_flight = Arc::new(MemoryInFlightRegistry::new(time));
        let announce = Arc::new(InFlightAnnouncePolicy::new(
            in_flight.clone(),
            config.max_blocks_in_transit_per_peer,
        ));

        Self {
            graph,
            in_flight,
            announce,
            outbox: Arc::new(PeerOutbox::new()),
            misbehavior: Arc::new(MisbehaviorLedger::new(config.ban_threshold)),
            availability: Arc::new(AvailabilityBook::new()),
        }
    }

    /// Port bundle for [`crate::HeaderSyncService`].
    pub fn ports(&self) -> HeaderSyncPorts {
        HeaderSyncPorts {
            graph: self.graph.clone(),
            validator: self.graph.clone(),
            active_chain: self.graph.clone(),
            messenger: self.outbox.clone(),
            misbehavior: self.misbehavior.clone(),
            availability: self.availability.clone(),
            in_flight: self.in_flight.clone(),
            in_flight_marker: self.in_flight.clone(),
            announce: self.announce.clone(),
            consistency: self.graph.clone(),
        }
    }
}
