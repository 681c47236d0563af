//! # Domain Layer for Header Sync
//!
//! Pure business types with no I/O dependencies. This is the innermost layer
//! of the hexagonal architecture.
//!
//! ## Contents
//!
//! - **entities**: `HeaderRecord`, `ValidityTier`, `PeerId`, `PeerSyncState`
//! - **value_objects**: `BlockLocator`, `InventoryItem`, `ConsensusParams`
//! - **errors**: `HeaderSyncError`, `HeaderRejection`, `ConfigError`
//! - **invariants**: Checks shared by the algorithms and their tests

mod entities;
mod errors;
mod invariants;
mod value_objects;

pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use value_objects::*;
