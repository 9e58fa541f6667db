//! Transport-level error types.

use syncgate_core::SourceError;
use thiserror::Error;

use crate::rpc::JsonRpcError;

/// Errors that can occur while talking to a Lotus node.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed before a response arrived (connection refused,
    /// reset, TLS failure, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The node answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON-RPC error returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Response could not be deserialized or mapped.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Client configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl TransportError {
    /// Returns `true` if this error is transient and worth retrying.
    ///
    /// Client errors (bad token, wrong path) are permanent, except
    /// `408 Request Timeout` and `429 Too Many Requests`.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout { .. } => true,
            Self::Status { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            _ => false,
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Deserialization(err.to_string())
    }
}

impl From<TransportError> for SourceError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Http(msg) | TransportError::Config(msg) => SourceError::Transport(msg),
            status @ TransportError::Status { .. } => {
                SourceError::Transport(status.to_string())
            }
            TransportError::Rpc(e) => SourceError::Rpc {
                code: e.code,
                message: e.message,
            },
            TransportError::Timeout { ms } => SourceError::Timeout { ms },
            TransportError::Deserialization(msg) => SourceError::Decode(msg),
        }
    }
}
