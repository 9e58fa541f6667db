//! Lotus client configuration.

use std::time::Duration;

use crate::error::TransportError;
use crate::retry::{RetryConfig, RetryPolicy};

/// Default Lotus JSON-RPC endpoint of a local node.
pub const DEFAULT_LOTUS_URL: &str = "http://127.0.0.1:1234/rpc/v0";

/// Environment variable holding the node's JSON-RPC URL.
pub const ENV_URL: &str = "LOTUS_RPC_URL";
/// Environment variable holding the API token (sent as a bearer token).
pub const ENV_TOKEN: &str = "LOTUS_RPC_TOKEN";
/// Environment variable holding the per-request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "LOTUS_RPC_TIMEOUT_SECS";

/// Configuration for [`LotusClient`](crate::LotusClient).
#[derive(Debug, Clone, PartialEq)]
pub struct LotusClientConfig {
    pub url: String,
    /// API token; `SyncState` only needs `read` permission.
    pub token: Option<String>,
    pub request_timeout: Duration,
    pub retry: RetryConfig,
}

impl Default for LotusClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_LOTUS_URL.into(),
            token: None,
            request_timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }
}

impl LotusClientConfig {
    /// Config for `url` with defaults for everything else.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the API token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Longest time one call can take with every retry used: each attempt
    /// may run into `request_timeout`, plus the backoff between attempts.
    ///
    /// A deadline shorter than this cuts retries off.
    pub fn query_budget(&self) -> Duration {
        let attempts = self.retry.max_retries.saturating_add(1);
        self.request_timeout.saturating_mul(attempts)
            + RetryPolicy::new(self.retry.clone()).total_backoff()
    }

    /// Build a config from `LOTUS_RPC_*` environment variables.
    pub fn from_env() -> Result<Self, TransportError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unset or empty keys keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TransportError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_URL) {
            config.url = url;
        }
        config.token = get(ENV_TOKEN);
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                TransportError::Config(format!("{ENV_TIMEOUT_SECS} must be an integer, got {raw:?}"))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_env_gives_defaults() {
        let config = LotusClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, LotusClientConfig::default());
    }

    #[test]
    fn env_overrides() {
        let config = LotusClientConfig::from_lookup(lookup(&[
            (ENV_URL, "http://lotus:1234/rpc/v1"),
            (ENV_TOKEN, "secret"),
            (ENV_TIMEOUT_SECS, "5"),
        ]))
        .unwrap();
        assert_eq!(config.url, "http://lotus:1234/rpc/v1");
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn blank_token_is_none() {
        let config = LotusClientConfig::from_lookup(lookup(&[(ENV_TOKEN, "  ")])).unwrap();
        assert!(config.token.is_none());
    }

    #[test]
    fn query_budget_covers_every_retry() {
        let config = LotusClientConfig {
            request_timeout: Duration::from_secs(10),
            retry: RetryConfig {
                max_retries: 2,
                initial_backoff: Duration::from_millis(100),
                max_backoff: Duration::from_secs(1),
                multiplier: 2.0,
            },
            ..LotusClientConfig::default()
        };
        assert_eq!(config.query_budget(), Duration::from_millis(30_300));

        let no_retry = LotusClientConfig {
            retry: RetryConfig::none(),
            ..config
        };
        assert_eq!(no_retry.query_budget(), Duration::from_secs(10));
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let err = LotusClientConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "soon")]))
            .unwrap_err();
        assert!(matches!(err, TransportError::Config(_)));
    }
}
