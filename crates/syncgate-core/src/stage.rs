//! Sync worker stages and their progress order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// The lifecycle phase of a single sync worker.
///
/// Ordering follows sync progress, not any wire representation:
/// `Idle < Headers < PersistHeaders < FetchingMessages < Messages`, with the
/// terminal stages `Complete` and `Errored` ranked after all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStage {
    /// Worker exists but is not doing anything.
    Idle,
    /// Fetching headers back toward the base.
    Headers,
    /// Writing fetched headers to the blockstore.
    PersistHeaders,
    /// Fetching messages for the validated headers.
    FetchingMessages,
    /// Validating and applying messages.
    Messages,
    /// The worker reached its target.
    Complete,
    /// The worker gave up with an error.
    Errored,
}

impl SyncStage {
    /// Every stage, in progress order.
    pub const ALL: [SyncStage; 7] = [
        Self::Idle,
        Self::Headers,
        Self::PersistHeaders,
        Self::FetchingMessages,
        Self::Messages,
        Self::Complete,
        Self::Errored,
    ];

    /// Position in the progress order.
    pub fn rank(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Headers => 1,
            Self::PersistHeaders => 2,
            Self::FetchingMessages => 3,
            Self::Messages => 4,
            Self::Complete => 5,
            Self::Errored => 6,
        }
    }

    /// Returns `true` for `Complete` and `Errored`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Errored)
    }
}

impl Ord for SyncStage {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for SyncStage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for SyncStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Headers => write!(f, "headers"),
            Self::PersistHeaders => write!(f, "persisting headers"),
            Self::FetchingMessages => write!(f, "fetching messages"),
            Self::Messages => write!(f, "messages"),
            Self::Complete => write!(f, "complete"),
            Self::Errored => write!(f, "errored"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_order() {
        assert!(SyncStage::Idle < SyncStage::Headers);
        assert!(SyncStage::Headers < SyncStage::PersistHeaders);
        assert!(SyncStage::PersistHeaders < SyncStage::FetchingMessages);
        assert!(SyncStage::FetchingMessages < SyncStage::Messages);
        assert_eq!(
            SyncStage::Headers.max(SyncStage::Messages),
            SyncStage::Messages
        );
    }

    #[test]
    fn all_is_sorted() {
        let mut sorted = SyncStage::ALL;
        sorted.sort();
        assert_eq!(sorted, SyncStage::ALL);
    }

    #[test]
    fn terminal_stages() {
        let terminal: Vec<_> = SyncStage::ALL
            .iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(terminal, vec![&SyncStage::Complete, &SyncStage::Errored]);
    }

    #[test]
    fn serde_snake_case() {
        let json = serde_json::to_string(&SyncStage::PersistHeaders).unwrap();
        assert_eq!(json, "\"persist_headers\"");
    }
}
