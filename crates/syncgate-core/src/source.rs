//! The node query capability consumed by the aggregator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::worker::SyncWorker;

/// Anything that can report a node's current set of sync workers.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; concurrent checks may share one
/// source behind an `Arc`.
#[async_trait]
pub trait SyncStateSource: Send + Sync {
    /// Return the node's active sync workers, in the node's own order.
    async fn active_syncs(&self) -> Result<Vec<SyncWorker>, SourceError>;

    /// Identifier used in logs (URL or name).
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: SyncStateSource + ?Sized> SyncStateSource for Arc<T> {
    async fn active_syncs(&self) -> Result<Vec<SyncWorker>, SourceError> {
        (**self).active_syncs().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

// ─── SnapshotSource ──────────────────────────────────────────────────────────

/// A source that always answers with the same fixed result.
///
/// Useful for replaying a captured sync state and in tests.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    result: Result<Vec<SyncWorker>, SourceError>,
    delay: Option<Duration>,
}

impl SnapshotSource {
    /// A source that reports `workers`.
    pub fn new(workers: Vec<SyncWorker>) -> Self {
        Self {
            result: Ok(workers),
            delay: None,
        }
    }

    /// A source whose query always fails with `err`.
    pub fn failing(err: SourceError) -> Self {
        Self {
            result: Err(err),
            delay: None,
        }
    }

    /// Sleep for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl SyncStateSource for SnapshotSource {
    async fn active_syncs(&self) -> Result<Vec<SyncWorker>, SourceError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone()
    }

    fn name(&self) -> &str {
        "snapshot"
    }
}
