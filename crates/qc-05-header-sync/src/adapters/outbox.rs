//! Per-process outbound message queue.
//!
//! Sync logic only enqueues; the transport layer drains messages per peer
//! and writes them to the wire.

use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::domain::PeerId;
use crate::ports::{NetworkMessage, PeerMessenger};

/// FIFO of `(peer, message)` pairs awaiting transmission.
#[derive(Debug, Default)]
pub struct PeerOutbox {
    queue: Mutex<VecDeque<(PeerId, NetworkMessage)>>,
}

impl PeerOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every queued message for `peer`, oldest first.
    pub fn drain(&self, peer: PeerId) -> Vec<NetworkMessage> {
        let mut queue = self.queue.lock();
        let mut drained = Vec::new();
        queue.retain(|(target, message)| {
            if *target == peer {
                drained.push(message.clone());
                false
            } else {
                true
            }
        });
        drained
    }

    /// Queued messages for `peer` without removing them.
    pub fn pending(&self, peer: PeerId) -> Vec<NetworkMessage> {
        self.queue
            .lock()
            .iter()
            .filter(|(target, _)| *target == peer)
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

impl PeerMessenger for PeerOutbox {
    fn push_message(&self, peer: PeerId, message: NetworkMessage) {
        self.queue.lock().push_back((peer, message));
    }
}
