//! # Header Acceptor
//!
//! Commits a batch of headers in order, enforcing that each header builds on
//! the previous one of the same batch.
//!
//! Acceptance is incremental: when header `k` fails, headers `0..k` stay in
//! the graph and the error reports how many were committed.

use shared_types::BlockHeader;
use tracing::debug;

use crate::config::HeaderSyncConfig;
use crate::domain::{invariant_continuous, HeaderRecord, HeaderSyncError, PeerId};
use crate::ports::{HeaderValidator, MisbehaviorSink};

/// Accept `headers` from `peer` into the header graph.
///
/// # Returns
/// The last accepted record, or `None` for an empty batch.
///
/// # Errors
/// - `NonContinuousSequence`: charged at `config.misbehavior_severity`
/// - `InvalidHeader`: charged at the acceptor's severity, silent when it is 0
pub fn accept_headers(
    peer: PeerId,
    headers: &[BlockHeader],
    validator: &dyn HeaderValidator,
    misbehavior: &dyn MisbehaviorSink,
    config: &HeaderSyncConfig,
) -> Result<Option<HeaderRecord>, HeaderSyncError> {
    let mut last: Option<HeaderRecord> = None;

    for (committed, header) in headers.iter().enumerate() {
        if !invariant_continuous(last.as_ref(), header) {
            misbehavior.misbehaving(peer, config.misbehavior_severity, "non-continuous header sequence");
            return Err(HeaderSyncError::NonContinuousSequence {
                expected_parent: last.map(|r| r.hash).unwrap_or_default(),
                got_parent: header.parent_hash,
                committed,
            });
        }

        match validator.accept_block_header(header) {
            Ok(record) => last = Some(record),
            Err(rejection) => {
                if rejection.severity > 0 {
                    misbehavior.misbehaving(peer, rejection.severity, "invalid header");
                }
                debug!(
                    %peer,
                    reason = %rejection.reason,
                    severity = rejection.severity,
                    committed,
                    "Header rejected"
                );
                return Err(HeaderSyncError::InvalidHeader {
                    hash: header.block_hash(),
                    reason: rejection.reason,
                    severity: rejection.severity,
                    committed,
                });
            }
        }
    }

    Ok(last)
}
