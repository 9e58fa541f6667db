//! Sync worker snapshot types, as reported by the node.

use serde::{Deserialize, Serialize};

use crate::stage::SyncStage;

/// A reference to the tipset a worker syncs from or toward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipSetRef {
    /// Chain height of the tipset.
    pub height: u64,
    /// Block CIDs making up the tipset key.
    pub cids: Vec<String>,
}

impl TipSetRef {
    pub fn new(height: u64, cids: Vec<String>) -> Self {
        Self { height, cids }
    }
}

/// One concurrent sync task inside the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncWorker {
    /// Node-assigned worker identifier.
    pub worker_id: u64,
    /// Current stage of this worker.
    pub stage: SyncStage,
    /// Height this worker has reached.
    pub height: u64,
    /// Tipset the worker started from.
    pub base: Option<TipSetRef>,
    /// Tipset the worker is advancing toward. `None` = not actively syncing.
    pub target: Option<TipSetRef>,
    /// Free-form status message (usually the error for `Errored`).
    pub message: Option<String>,
}

impl SyncWorker {
    /// Create a worker without base, target or message.
    pub fn new(worker_id: u64, stage: SyncStage, height: u64) -> Self {
        Self {
            worker_id,
            stage,
            height,
            base: None,
            target: None,
            message: None,
        }
    }

    /// Set the target tipset.
    pub fn with_target(mut self, target: TipSetRef) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the base tipset.
    pub fn with_base(mut self, base: TipSetRef) -> Self {
        self.base = Some(base);
        self
    }

    /// Set the status message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns `true` if the worker has a target and therefore counts toward
    /// the aggregated status.
    pub fn is_active(&self) -> bool {
        self.target.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_without_target_is_inactive() {
        let w = SyncWorker::new(1, SyncStage::Idle, 0);
        assert!(!w.is_active());
        let w = w.with_target(TipSetRef::new(100, vec!["bafy2bzace".into()]));
        assert!(w.is_active());
    }

    #[test]
    fn builder_sets_fields() {
        let w = SyncWorker::new(7, SyncStage::Errored, 12)
            .with_base(TipSetRef::new(10, vec![]))
            .with_message("state mismatch");
        assert_eq!(w.base.as_ref().map(|b| b.height), Some(10));
        assert_eq!(w.message.as_deref(), Some("state mismatch"));
        assert!(w.target.is_none());
    }
}
