//! # Ports Module
//!
//! Hexagonal architecture ports (inbound API, outbound dependencies).

pub mod inbound;
pub mod outbound;

use std::sync::Arc;

pub use inbound::*;
pub use outbound::*;

/// Collaborators of the header sync service, injected at construction.
#[derive(Clone)]
pub struct HeaderSyncPorts {
    pub graph: Arc<dyn HeaderGraph>,
    pub validator: Arc<dyn HeaderValidator>,
    pub active_chain: Arc<dyn ActiveChain>,
    pub messenger: Arc<dyn PeerMessenger>,
    pub misbehavior: Arc<dyn MisbehaviorSink>,
    pub availability: Arc<dyn BlockAvailability>,
    pub in_flight: Arc<dyn InFlightIndex>,
    pub in_flight_marker: Arc<dyn InFlightMarker>,
    pub announce: Arc<dyn AnnounceReceiver>,
    pub consistency: Arc<dyn ConsistencyCheck>,
}
