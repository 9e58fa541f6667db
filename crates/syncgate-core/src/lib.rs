//! syncgate-core — collapse a node's concurrent sync workers into one status.
//!
//! # Overview
//!
//! A node may sync several disjoint height ranges at once. This crate reduces
//! the snapshot of those workers into a single [`SyncStatus`] that an API
//! layer can use to decide whether it is safe to serve data:
//!
//! - [`SyncStage`] — closed stage enum with an explicit progress order
//! - [`SyncWorker`] / [`TipSetRef`] — one worker as reported by the node
//! - [`SyncStateSource`] — the async trait a node collaborator implements
//! - [`check_sync_status`] — query + reduce, fail-fast on errored workers
//! - [`SyncStatusError`] — the two error signals exposed to callers
//!
//! ```text
//! SyncStateSource::active_syncs() ──► reduce_workers() ──► SyncStatus
//!                                                            ├── is_synced()
//!                                                            ├── min_height()
//!                                                            └── max_height()
//! ```

pub mod error;
pub mod source;
pub mod stage;
pub mod status;
pub mod worker;

pub use error::{SourceError, SyncStatusError};
pub use source::{SnapshotSource, SyncStateSource};
pub use stage::SyncStage;
pub use status::{
    check_sync_status, check_sync_status_with_timeout, reduce_workers, SyncReport, SyncStatus,
};
pub use worker::{SyncWorker, TipSetRef};
