//! Lotus `Filecoin.SyncState` response types and their mapping onto
//! [`SyncWorker`].

use serde::Deserialize;
use syncgate_core::{SyncStage, SyncWorker, TipSetRef};

use crate::error::TransportError;

/// Top-level result of `Filecoin.SyncState`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LotusSyncState {
    /// `null` when the node has never started a sync.
    #[serde(default)]
    pub active_syncs: Option<Vec<LotusActiveSync>>,
    #[serde(rename = "VMApplied", default)]
    pub vm_applied: u64,
}

/// One entry of `ActiveSyncs`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LotusActiveSync {
    #[serde(rename = "WorkerID", default)]
    pub worker_id: u64,
    #[serde(default)]
    pub base: Option<LotusTipSet>,
    #[serde(default)]
    pub target: Option<LotusTipSet>,
    pub stage: u8,
    pub height: u64,
    #[serde(default)]
    pub message: String,
}

/// The parts of a Lotus tipset needed to identify it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LotusTipSet {
    #[serde(default)]
    pub cids: Vec<LotusCid>,
    pub height: u64,
}

/// A CID in Lotus' JSON form: `{"/": "bafy..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct LotusCid {
    #[serde(rename = "/")]
    pub root: String,
}

impl From<LotusTipSet> for TipSetRef {
    fn from(ts: LotusTipSet) -> Self {
        TipSetRef::new(ts.height, ts.cids.into_iter().map(|c| c.root).collect())
    }
}

/// Map a Lotus stage code to a [`SyncStage`].
///
/// Lotus numbers stages in the order they were added to its API, so
/// `StageFetchingMessages` (6) comes after the terminal stages on the wire.
pub fn stage_from_code(code: u8) -> Option<SyncStage> {
    match code {
        0 => Some(SyncStage::Idle),
        1 => Some(SyncStage::Headers),
        2 => Some(SyncStage::PersistHeaders),
        3 => Some(SyncStage::Messages),
        4 => Some(SyncStage::Complete),
        5 => Some(SyncStage::Errored),
        6 => Some(SyncStage::FetchingMessages),
        _ => None,
    }
}

/// Inverse of [`stage_from_code`].
pub fn stage_code(stage: SyncStage) -> u8 {
    match stage {
        SyncStage::Idle => 0,
        SyncStage::Headers => 1,
        SyncStage::PersistHeaders => 2,
        SyncStage::Messages => 3,
        SyncStage::Complete => 4,
        SyncStage::Errored => 5,
        SyncStage::FetchingMessages => 6,
    }
}

impl TryFrom<LotusActiveSync> for SyncWorker {
    type Error = TransportError;

    fn try_from(sync: LotusActiveSync) -> Result<Self, Self::Error> {
        let stage = stage_from_code(sync.stage).ok_or_else(|| {
            TransportError::Deserialization(format!(
                "unknown sync stage {} on worker {}",
                sync.stage, sync.worker_id
            ))
        })?;

        Ok(SyncWorker {
            worker_id: sync.worker_id,
            stage,
            height: sync.height,
            base: sync.base.map(TipSetRef::from),
            target: sync.target.map(TipSetRef::from),
            message: Some(sync.message).filter(|m| !m.is_empty()),
        })
    }
}

impl LotusSyncState {
    /// Convert every active sync into a [`SyncWorker`], keeping node order.
    pub fn into_workers(self) -> Result<Vec<SyncWorker>, TransportError> {
        self.active_syncs
            .unwrap_or_default()
            .into_iter()
            .map(SyncWorker::try_from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYNC_STATE: &str = r#"{
        "ActiveSyncs": [
            {
                "WorkerID": 1,
                "Base": {"Cids": [{"/": "bafy-base-1"}], "Blocks": [], "Height": 90},
                "Target": {"Cids": [{"/": "bafy-target-1"}, {"/": "bafy-target-2"}], "Blocks": [], "Height": 120},
                "Stage": 6,
                "Height": 100,
                "Start": "2021-01-01T00:00:00Z",
                "End": "0001-01-01T00:00:00Z",
                "Message": ""
            },
            {
                "WorkerID": 2,
                "Base": null,
                "Target": null,
                "Stage": 0,
                "Height": 0,
                "Start": "0001-01-01T00:00:00Z",
                "End": "0001-01-01T00:00:00Z",
                "Message": ""
            }
        ],
        "VMApplied": 4521
    }"#;

    #[test]
    fn decodes_active_syncs() {
        let state: LotusSyncState = serde_json::from_str(SYNC_STATE).unwrap();
        assert_eq!(state.vm_applied, 4521);
        let workers = state.into_workers().unwrap();
        assert_eq!(workers.len(), 2);

        let first = &workers[0];
        assert_eq!(first.worker_id, 1);
        assert_eq!(first.stage, SyncStage::FetchingMessages);
        assert_eq!(first.height, 100);
        let target = first.target.as_ref().unwrap();
        assert_eq!(target.height, 120);
        assert_eq!(target.cids, vec!["bafy-target-1", "bafy-target-2"]);
        assert_eq!(first.base.as_ref().unwrap().height, 90);
        assert!(first.message.is_none());

        assert!(!workers[1].is_active());
    }

    #[test]
    fn null_active_syncs_is_empty() {
        let state: LotusSyncState =
            serde_json::from_str(r#"{"ActiveSyncs": null, "VMApplied": 0}"#).unwrap();
        assert!(state.into_workers().unwrap().is_empty());
    }

    #[test]
    fn errored_message_is_kept() {
        let state: LotusSyncState = serde_json::from_str(
            r#"{"ActiveSyncs": [{"WorkerID": 3, "Target": {"Cids": [], "Height": 5},
                "Stage": 5, "Height": 4, "Message": "failed to validate block"}]}"#,
        )
        .unwrap();
        let workers = state.into_workers().unwrap();
        assert_eq!(workers[0].stage, SyncStage::Errored);
        assert_eq!(workers[0].message.as_deref(), Some("failed to validate block"));
    }

    #[test]
    fn unknown_stage_fails() {
        let state: LotusSyncState = serde_json::from_str(
            r#"{"ActiveSyncs": [{"WorkerID": 9, "Stage": 42, "Height": 1}]}"#,
        )
        .unwrap();
        let err = state.into_workers().unwrap_err();
        assert!(matches!(err, TransportError::Deserialization(_)));
        assert!(err.to_string().contains("unknown sync stage 42"));
    }

    #[test]
    fn stage_codes_round_trip() {
        for stage in SyncStage::ALL {
            assert_eq!(stage_from_code(stage_code(stage)), Some(stage));
        }
        assert!(stage_from_code(7).is_none());
    }
}
