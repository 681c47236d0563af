//! Misbehavior ledger.
//!
//! Accumulates severities per peer and flags peers whose score reaches the
//! ban threshold. Disconnecting is left to the connection manager.

use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::warn;

use crate::domain::PeerId;
use crate::ports::MisbehaviorSink;

/// One misbehavior report as received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MisbehaviorReport {
    pub peer: PeerId,
    pub severity: u32,
    pub reason: String,
}

/// Per-peer misbehavior scores.
#[derive(Debug)]
pub struct MisbehaviorLedger {
    ban_threshold: u32,
    scores: RwLock<HashMap<PeerId, u32>>,
    reports: RwLock<Vec<MisbehaviorReport>>,
}

impl MisbehaviorLedger {
    pub fn new(ban_threshold: u32) -> Self {
        Self {
            ban_threshold,
            scores: RwLock::new(HashMap::new()),
            reports: RwLock::new(Vec::new()),
        }
    }

    pub fn score(&self, peer: &PeerId) -> u32 {
        self.scores.read().get(peer).copied().unwrap_or(0)
    }

    pub fn should_ban(&self, peer: &PeerId) -> bool {
        self.score(peer) >= self.ban_threshold
    }

    /// Every report received, oldest first.
    pub fn reports(&self) -> Vec<MisbehaviorReport> {
        self.reports.read().clone()
    }

    pub fn reports_for(&self, peer: &PeerId) -> Vec<MisbehaviorReport> {
        self.reports
            .read()
            .iter()
            .filter(|r| r.peer == *peer)
            .cloned()
            .collect()
    }

    /// Forget a peer after it disconnected.
    pub fn forget(&self, peer: &PeerId) {
        self.scores.write().remove(peer);
    }
}

impl MisbehaviorSink for MisbehaviorLedger {
    fn misbehaving(&self, peer: PeerId, severity: u32, reason: &str) {
        let (before, after) = {
            let mut scores = self.scores.write();
            let score = scores.entry(peer).or_insert(0);
            let before = *score;
            *score = score.saturating_add(severity);
            (before, *score)
        };

        self.reports.write().push(MisbehaviorReport {
            peer,
            severity,
            reason: reason.to_string(),
        });

        if before < self.ban_threshold && after >= self.ban_threshold {
            warn!(%peer, score = after, reason, "Misbehaving: peer crossed ban threshold");
        } else {
            warn!(%peer, before, after, reason, "Misbehaving");
        }
    }
}
