//! Sync status aggregation — reduce a snapshot of sync workers into one
//! global status.
//!
//! A single completed worker is enough to call the node synced, even while
//! other ranges are still catching up. A single errored worker makes the
//! whole snapshot unusable: height bounds derived from it would be wrong.
//!
//! Reduction is fail-fast: the first errored worker in the node's order is
//! the one reported, and the workers after it are not examined.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SyncStatusError;
use crate::source::SyncStateSource;
use crate::stage::SyncStage;
use crate::worker::SyncWorker;

// ─── SyncStatus ──────────────────────────────────────────────────────────────

/// The reduced status of all actively syncing workers at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStatus {
    heights: Vec<u64>,
    global_stage: SyncStage,
}

impl SyncStatus {
    /// Heights of the counted workers, in the node's order.
    pub fn heights(&self) -> &[u64] {
        &self.heights
    }

    /// The single stage summarizing every counted worker.
    pub fn global_stage(&self) -> SyncStage {
        self.global_stage
    }

    /// Returns `true` if at least one counted worker completed.
    pub fn is_synced(&self) -> bool {
        self.global_stage == SyncStage::Complete
    }

    /// Highest height considered reliable: the furthest worker frontier minus
    /// one, since the frontier itself may still be reorged or half-processed.
    /// `0` when no heights were recorded.
    pub fn max_height(&self) -> u64 {
        self.heights
            .iter()
            .copied()
            .max()
            .unwrap_or(0)
            .saturating_sub(1)
    }

    /// Lowest height reached by any counted worker, `0` when none.
    ///
    /// Unlike [`max_height`](Self::max_height) no adjustment is applied, so a
    /// single worker at height `h > 0` yields `min = h`, `max = h - 1`.
    pub fn min_height(&self) -> u64 {
        self.heights.iter().copied().min().unwrap_or(0)
    }

    /// Serializable summary for API layers.
    pub fn report(&self) -> SyncReport {
        SyncReport {
            stage: self.global_stage,
            synced: self.is_synced(),
            min_height: self.min_height(),
            max_height: self.max_height(),
            tracked_workers: self.heights.len(),
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (synced={}, min={}, max={}, workers={})",
            self.global_stage,
            self.is_synced(),
            self.min_height(),
            self.max_height(),
            self.heights.len()
        )
    }
}

/// Flat, serializable view of a [`SyncStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub stage: SyncStage,
    pub synced: bool,
    pub min_height: u64,
    pub max_height: u64,
    /// Number of workers with a target that contributed a height.
    pub tracked_workers: usize,
}

// ─── Reduction ───────────────────────────────────────────────────────────────

/// Reduce a snapshot of workers into a [`SyncStatus`].
///
/// Workers without a target are skipped. Fails with
/// [`SyncStatusError::SyncErrored`] on the first errored worker, and with
/// [`SyncStatusError::UnableToGetSyncStatus`] when no worker is counted.
pub fn reduce_workers(workers: &[SyncWorker]) -> Result<SyncStatus, SyncStatusError> {
    if workers.is_empty() {
        return Err(SyncStatusError::unavailable("node reported no active syncs"));
    }

    let mut heights = Vec::with_capacity(workers.len());
    let mut sync_complete = false;
    let mut most_advanced = SyncStage::Idle;

    for worker in workers {
        if !worker.is_active() {
            continue;
        }

        match worker.stage {
            SyncStage::Errored => {
                tracing::warn!(
                    worker_id = worker.worker_id,
                    height = worker.height,
                    reason = worker.message.as_deref().unwrap_or(""),
                    "sync worker errored"
                );
                return Err(SyncStatusError::SyncErrored {
                    worker_id: worker.worker_id,
                    height: worker.height,
                    message: worker.message.clone(),
                });
            }
            SyncStage::Complete => sync_complete = true,
            stage => most_advanced = most_advanced.max(stage),
        }

        tracing::debug!(
            worker_id = worker.worker_id,
            stage = %worker.stage,
            height = worker.height,
            "counted sync worker"
        );
        heights.push(worker.height);
    }

    if heights.is_empty() {
        return Err(SyncStatusError::unavailable(
            "no sync worker has a target",
        ));
    }

    let global_stage = if sync_complete {
        SyncStage::Complete
    } else {
        most_advanced
    };

    Ok(SyncStatus {
        heights,
        global_stage,
    })
}

/// Query `source` once and reduce the answer into a [`SyncStatus`].
///
/// Query failures surface as [`SyncStatusError::UnableToGetSyncStatus`];
/// nothing is retried here.
pub async fn check_sync_status<S>(source: &S) -> Result<SyncStatus, SyncStatusError>
where
    S: SyncStateSource + ?Sized,
{
    let workers = source.active_syncs().await.map_err(|e| {
        tracing::debug!(source = source.name(), error = %e, "sync state query failed");
        SyncStatusError::from(e)
    })?;

    let status = reduce_workers(&workers)?;
    tracing::debug!(source = source.name(), status = %status, "sync status checked");
    Ok(status)
}

/// [`check_sync_status`] bounded by `timeout`. Within the deadline the
/// result is exactly what `check_sync_status` returns.
pub async fn check_sync_status_with_timeout<S>(
    source: &S,
    timeout: Duration,
) -> Result<SyncStatus, SyncStatusError>
where
    S: SyncStateSource + ?Sized,
{
    match tokio::time::timeout(timeout, check_sync_status(source)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::debug!(
                source = source.name(),
                timeout_ms = timeout.as_millis() as u64,
                "sync state query timed out"
            );
            Err(SyncStatusError::unavailable(format!(
                "query timed out after {}ms",
                timeout.as_millis()
            )))
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
