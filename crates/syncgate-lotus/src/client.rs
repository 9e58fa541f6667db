//! HTTP JSON-RPC client for a Lotus node, backed by `reqwest`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use syncgate_core::{SourceError, SyncStateSource, SyncWorker};

use crate::config::LotusClientConfig;
use crate::error::TransportError;
use crate::retry::RetryPolicy;
use crate::rpc::{JsonRpcRequest, JsonRpcResponse};
use crate::wire::LotusSyncState;

/// Lotus method returning the node's active sync workers.
pub const METHOD_SYNC_STATE: &str = "Filecoin.SyncState";

/// Lotus JSON-RPC client with retry on transient HTTP errors.
pub struct LotusClient {
    url: String,
    token: Option<String>,
    http: reqwest::Client,
    retry: RetryPolicy,
    request_timeout: Duration,
    next_id: AtomicU64,
}

impl LotusClient {
    /// Create a client from `config`.
    pub fn new(config: LotusClientConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: config.url,
            token: config.token,
            http,
            retry: RetryPolicy::new(config.retry),
            request_timeout: config.request_timeout,
            next_id: AtomicU64::new(1),
        })
    }

    /// Create a client for `url` with default configuration.
    pub fn default_for(url: impl Into<String>) -> Result<Self, TransportError> {
        Self::new(LotusClientConfig::for_url(url))
    }

    /// Build the next request for `method`.
    pub fn request(&self, method: &str, params: Vec<Value>) -> JsonRpcRequest {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        JsonRpcRequest::new(id, method, params)
    }

    /// Call `method`, retrying transient failures, and deserialize the result.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, TransportError> {
        let req = self.request(method, params);

        let mut attempt = 0u32;
        let resp = loop {
            attempt += 1;
            match self.send_once(&req).await {
                Ok(resp) => break resp,
                Err(e) if e.is_retryable() => match self.retry.next_delay(attempt) {
                    Some(delay) => {
                        tracing::warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            url = %self.url,
                            method,
                            "retrying request"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        tracing::error!(
                            attempt,
                            error = %e,
                            url = %self.url,
                            method,
                            "max retries exceeded"
                        );
                        return Err(e);
                    }
                },
                Err(e) => return Err(e),
            }
        };

        let result = resp.into_result().map_err(TransportError::Rpc)?;
        Ok(serde_json::from_value(result)?)
    }

    /// Fetch and decode `Filecoin.SyncState`.
    pub async fn sync_state(&self) -> Result<LotusSyncState, TransportError> {
        self.call(METHOD_SYNC_STATE, vec![]).await
    }

    async fn send_once(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        let mut builder = self.http.post(&self.url).json(req);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let resp = builder.send().await.map_err(|e| self.map_reqwest(e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        resp.json::<JsonRpcResponse>()
            .await
            .map_err(|e| TransportError::Deserialization(e.to_string()))
    }

    fn map_reqwest(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                ms: self.request_timeout.as_millis() as u64,
            }
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

#[async_trait]
impl SyncStateSource for LotusClient {
    async fn active_syncs(&self) -> Result<Vec<SyncWorker>, SourceError> {
        let state = self.sync_state().await?;
        tracing::debug!(
            url = %self.url,
            vm_applied = state.vm_applied,
            "fetched sync state"
        );
        Ok(state.into_workers()?)
    }

    fn name(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryConfig;
    use crate::rpc::RpcId;

    #[test]
    fn request_ids_increase() {
        let client = LotusClient::default_for("http://127.0.0.1:1234/rpc/v0").unwrap();
        let a = client.request(METHOD_SYNC_STATE, vec![]);
        let b = client.request(METHOD_SYNC_STATE, vec![]);
        assert_eq!(a.id, RpcId::Number(1));
        assert_eq!(b.id, RpcId::Number(2));
        assert_eq!(a.method, "Filecoin.SyncState");
        assert!(a.params.is_empty());
    }

    #[test]
    fn name_is_url() {
        let client = LotusClient::default_for("http://lotus:1234/rpc/v0").unwrap();
        assert_eq!(client.name(), "http://lotus:1234/rpc/v0");
    }

    #[tokio::test]
    async fn unreachable_node_is_transport_error() {
        let config = LotusClientConfig {
            url: "http://127.0.0.1:1/rpc/v0".into(),
            token: None,
            request_timeout: Duration::from_secs(2),
            retry: RetryConfig::none(),
        };
        let client = LotusClient::new(config).unwrap();
        let err = client.active_syncs().await.unwrap_err();
        assert!(
            matches!(err, SourceError::Transport(_) | SourceError::Timeout { .. }),
            "unexpected error: {err:?}"
        );
    }
}
