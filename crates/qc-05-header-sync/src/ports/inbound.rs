//! Inbound ports (API) for the Header Sync subsystem.

use shared_types::BlockHeader;

use crate::domain::{HeaderRecord, HeaderSyncError, PeerSyncState};

/// Primary API, called by the message-dispatch layer of a connection.
pub trait HeaderProcessor: Send + Sync {
    /// Process one `headers` batch from `peer`.
    ///
    /// # Arguments
    /// * `headers` - Headers in the order the peer sent them
    /// * `peer_sent_max` - The batch hit the message size limit; more may follow
    /// * `maybe_announcement` - The batch may be serving as a block announcement
    ///
    /// # Returns
    /// The last accepted header, or `None` for an empty batch. On error,
    /// headers accepted before the failure stay committed.
    fn process_headers(
        &self,
        peer: &mut PeerSyncState,
        headers: &[BlockHeader],
        peer_sent_max: bool,
        maybe_announcement: bool,
    ) -> Result<Option<HeaderRecord>, HeaderSyncError>;

    /// Handle an announced header whose parent may be unknown.
    ///
    /// Returns `true` if the parent is missing and headers were requested;
    /// the announcement cannot be processed yet in that case.
    fn request_connect_headers(
        &self,
        peer: &mut PeerSyncState,
        header: &BlockHeader,
        bump_unconnecting: bool,
    ) -> bool;
}
