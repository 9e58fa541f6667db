//! Error types for sync status checks.

use thiserror::Error;

/// Errors surfaced by a sync status check.
///
/// Derived queries on an already-built [`SyncStatus`](crate::SyncStatus)
/// never fail; these are the only failure modes of a check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncStatusError {
    /// The node query failed or timed out, or no worker is actively syncing.
    #[error("Unable to get sync status: {reason}")]
    UnableToGetSyncStatus { reason: String },

    /// A sync worker reported an errored stage. No partial status exists.
    #[error("Sync worker {worker_id} errored at height {height}{}", fmt_message(.message))]
    SyncErrored {
        worker_id: u64,
        height: u64,
        message: Option<String>,
    },
}

fn fmt_message(message: &Option<String>) -> String {
    match message {
        Some(m) if !m.is_empty() => format!(": {m}"),
        _ => String::new(),
    }
}

impl SyncStatusError {
    pub(crate) fn unavailable(reason: impl Into<String>) -> Self {
        Self::UnableToGetSyncStatus {
            reason: reason.into(),
        }
    }

    /// Stable numeric code an API layer can translate into its own schema.
    pub fn code(&self) -> u32 {
        match self {
            Self::UnableToGetSyncStatus { .. } => 1,
            Self::SyncErrored { .. } => 2,
        }
    }

    /// Returns `true` if asking again later may succeed.
    ///
    /// An errored worker needs operator attention; an unreachable node or a
    /// node between syncs does not.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::UnableToGetSyncStatus { .. })
    }
}

/// Errors a [`SyncStateSource`](crate::SyncStateSource) can return.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Connection refused, HTTP failure, etc.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The query did not finish in time.
    #[error("Query timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// The node answered with something that is not a sync state.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The node rejected the query.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl From<SourceError> for SyncStatusError {
    fn from(err: SourceError) -> Self {
        Self::unavailable(err.to_string())
    }
}
