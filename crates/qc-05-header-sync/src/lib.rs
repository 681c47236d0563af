//! # Header Sync Subsystem (qc-05)
//!
//! Accepts block headers from peers, keeps them chained into the header
//! graph, and fetches block bodies directly when a peer announces a branch
//! at least as heavy as the active chain.
//!
//! ## Architecture Role
//!
//! ```text
//! [Peer] ──headers──→ [Header Sync (5)] ──accept──→ [Header Graph]
//!                           │
//!                           ├──getheaders──→ [Peer]   (continuation / unconnected)
//!                           ├──getdata─────→ [Peer]   (direct fetch)
//!                           └──misbehaving─→ [Peer Scoring]
//! ```
//!
//! ## Guarantees
//!
//! - Headers of a batch are committed strictly in order; a failure keeps the
//!   already committed prefix.
//! - Direct fetch never selects more than one peer's in-flight allowance and
//!   requests blocks in ascending height.
//! - A peer repeatedly announcing unconnected headers is charged every
//!   `max_unconnecting_headers` misses.

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::MemoryNode;
pub use config::HeaderSyncConfig;
pub use domain::*;
pub use ports::inbound::HeaderProcessor;
pub use ports::HeaderSyncPorts;
pub use service::HeaderSyncService;
