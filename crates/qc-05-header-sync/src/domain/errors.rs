//! # Domain Errors
//!
//! Error types for header synchronization.

use shared_types::{Hash, ShortHash};
use thiserror::Error;

/// Header sync errors. Both variants abort the current batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderSyncError {
    /// A header did not build on the previously accepted header of the batch.
    #[error(
        "non-continuous headers sequence: expected parent {}, got {} ({committed} committed)",
        ShortHash(.expected_parent),
        ShortHash(.got_parent)
    )]
    NonContinuousSequence {
        /// Hash of the last header accepted from this batch.
        expected_parent: Hash,
        /// Parent hash the offending header declared.
        got_parent: Hash,
        /// Headers of the batch committed before the failure.
        committed: usize,
    },

    /// The header acceptor rejected a header.
    #[error(
        "invalid header received: {} {reason} (severity {severity}, {committed} committed)",
        ShortHash(.hash)
    )]
    InvalidHeader {
        /// Hash of the rejected header.
        hash: Hash,
        /// Rejection reason reported by the acceptor.
        reason: String,
        /// Misbehavior severity attached to the rejection (0 = silent).
        severity: u32,
        /// Headers of the batch committed before the failure.
        committed: usize,
    },
}

/// Bare error kind, for callers that only branch on the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderSyncErrorKind {
    NonContinuousSequence,
    InvalidHeader,
}

impl HeaderSyncError {
    pub fn kind(&self) -> HeaderSyncErrorKind {
        match self {
            Self::NonContinuousSequence { .. } => HeaderSyncErrorKind::NonContinuousSequence,
            Self::InvalidHeader { .. } => HeaderSyncErrorKind::InvalidHeader,
        }
    }

    /// Number of headers from the failed batch that remain committed.
    pub fn committed(&self) -> usize {
        match self {
            Self::NonContinuousSequence { committed, .. } | Self::InvalidHeader { committed, .. } => {
                *committed
            }
        }
    }
}

/// Verdict of the header acceptor when it refuses a header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason} (severity {severity})")]
pub struct HeaderRejection {
    /// Misbehavior severity to charge the sending peer; 0 means no charge.
    pub severity: u32,
    /// Short machine-readable reason, e.g. `high-hash`.
    pub reason: String,
}

impl HeaderRejection {
    pub fn new(severity: u32, reason: impl Into<String>) -> Self {
        Self {
            severity,
            reason: reason.into(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_continuous_display() {
        let err = HeaderSyncError::NonContinuousSequence {
            expected_parent: [0xAA; 32],
            got_parent: [0xBB; 32],
            committed: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("non-continuous"));
        assert!(msg.contains("aaaaaaaaaaaaaaaa"));
        assert_eq!(err.kind(), HeaderSyncErrorKind::NonContinuousSequence);
        assert_eq!(err.committed(), 2);
    }

    #[test]
    fn test_invalid_header_display() {
        let err = HeaderSyncError::InvalidHeader {
            hash: [1u8; 32],
            reason: "high-hash".to_string(),
            severity: 50,
            committed: 0,
        };
        assert!(err.to_string().contains("high-hash"));
        assert_eq!(err.kind(), HeaderSyncErrorKind::InvalidHeader);
    }

    #[test]
    fn test_rejection_display() {
        let rejection = HeaderRejection::new(0, "time-too-new");
        assert_eq!(rejection.to_string(), "time-too-new (severity 0)");
    }
}
