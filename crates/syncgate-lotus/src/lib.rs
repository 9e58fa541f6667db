//! syncgate-lotus — Lotus JSON-RPC node source for SyncGate.
//!
//! [`LotusClient`] calls `Filecoin.SyncState` over HTTP and implements
//! [`syncgate_core::SyncStateSource`], so it can be handed straight to
//! [`syncgate_core::check_sync_status`].
//!
//! Transient HTTP failures are retried here with exponential backoff
//! ([`RetryPolicy`]); the aggregator itself never retries.

pub mod client;
pub mod config;
pub mod error;
pub mod retry;
pub mod rpc;
pub mod wire;

pub use client::LotusClient;
pub use config::LotusClientConfig;
pub use error::TransportError;
pub use retry::{RetryConfig, RetryPolicy};
