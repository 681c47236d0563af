//! # Header Sync Configuration
//!
//! Limits and thresholds for header processing and direct fetch.

use serde::{Deserialize, Serialize};

use crate::domain::ConfigError;

/// Maximum blocks a single peer may have in flight at once.
pub const MAX_BLOCKS_IN_TRANSIT_PER_PEER: usize = 16;

/// Ancestor steps direct fetch will walk before giving up (one day of blocks).
pub const DIRECT_FETCH_WALK_LIMIT: usize = 144;

/// Unconnecting header announcements tolerated before each misbehavior charge.
pub const MAX_UNCONNECTING_HEADERS: u32 = 10;

/// Severity charged for protocol-level header misbehavior.
pub const HEADER_MISBEHAVIOR_SEVERITY: u32 = 20;

/// Headers a peer may send in one `headers` message.
pub const MAX_HEADERS_RESULTS: usize = 2000;

/// Header sync configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderSyncConfig {
    /// Sliding-window size of the direct-fetch candidate list.
    pub max_blocks_in_transit_per_peer: usize,

    /// Maximum ancestor steps of the direct-fetch walk.
    pub direct_fetch_walk_limit: usize,

    /// Charge a peer every time this many unconnecting announcements accrue.
    pub max_unconnecting_headers: u32,

    /// Severity reported for non-continuous batches and unconnecting headers.
    pub misbehavior_severity: u32,

    /// Batch size at which a peer is assumed to have more headers.
    pub max_headers_per_message: usize,

    /// How far ahead of local time a header timestamp may be.
    pub max_future_block_time_secs: u64,

    /// Misbehavior score at which a peer should be banned.
    pub ban_threshold: u32,
}

impl Default for HeaderSyncConfig {
    fn default() -> Self {
        Self {
            max_blocks_in_transit_per_peer: MAX_BLOCKS_IN_TRANSIT_PER_PEER,
            direct_fetch_walk_limit: DIRECT_FETCH_WALK_LIMIT,
            max_unconnecting_headers: MAX_UNCONNECTING_HEADERS,
            misbehavior_severity: HEADER_MISBEHAVIOR_SEVERITY,
            max_headers_per_message: MAX_HEADERS_RESULTS,
            max_future_block_time_secs: 2 * 60 * 60,
            ban_threshold: 100,
        }
    }
}

impl HeaderSyncConfig {
    /// Create a config for testing (small windows so limits are easy to hit).
    pub fn for_testing() -> Self {
        Self {
            max_blocks_in_transit_per_peer: 4,
            direct_fetch_walk_limit: 12,
            max_headers_per_message: 8,
            ..Self::default()
        }
    }

    /// Rejects settings that would disable a limit by accident.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_zero = [
            ("max_blocks_in_transit_per_peer", self.max_blocks_in_transit_per_peer),
            ("direct_fetch_walk_limit", self.direct_fetch_walk_limit),
            ("max_unconnecting_headers", self.max_unconnecting_headers as usize),
            ("max_headers_per_message", self.max_headers_per_message),
        ];
        for (field, value) in non_zero {
            if value == 0 {
                return Err(ConfigError::ZeroValue { field });
            }
        }
        Ok(())
    }

    /// True if a batch of `len` headers hit the message limit, meaning the
    /// peer likely has more to send.
    pub fn is_full_batch(&self, len: usize) -> bool {
        len >= self.max_headers_per_message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HeaderSyncConfig::default();
        assert_eq!(config.max_blocks_in_transit_per_peer, 16);
        assert_eq!(config.direct_fetch_walk_limit, 144);
        assert_eq!(config.max_unconnecting_headers, 10);
        assert_eq!(config.misbehavior_severity, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_testing_config() {
        let config = HeaderSyncConfig::for_testing();
        assert_eq!(config.max_blocks_in_transit_per_peer, 4);
        assert!(config.is_full_batch(8));
        assert!(!config.is_full_batch(7));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let config = HeaderSyncConfig {
            max_blocks_in_transit_per_peer: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroValue {
                field: "max_blocks_in_transit_per_peer"
            })
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: HeaderSyncConfig =
            serde_json::from_str(r#"{"max_blocks_in_transit_per_peer": 8}"#).unwrap();
        assert_eq!(config.max_blocks_in_transit_per_peer, 8);
        assert_eq!(config.direct_fetch_walk_limit, 144);

        let json = serde_json::to_string(&config).unwrap();
        let back: HeaderSyncConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
