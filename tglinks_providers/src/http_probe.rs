use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, redirect::Policy};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tglinks_core::{ExistenceProbe, ProbeError};
use tracing::debug;

/// Existence probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Hard timeout for the whole request (milliseconds).
    /// Short values favour responsiveness and produce false negatives on
    /// slow networks.
    #[serde(default = "ProbeConfig::default_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// User-Agent header
    #[serde(default = "ProbeConfig::default_user_agent")]
    pub user_agent: String,

    /// Redirects followed before giving up
    #[serde(default = "ProbeConfig::default_max_redirects")]
    pub max_redirects: usize,
}

impl ProbeConfig {
    const fn default_timeout_ms() -> u64 {
        100
    }

    fn default_user_agent() -> String {
        "Mozilla/5.0 (compatible; tglinks/1.0)".to_string()
    }

    const fn default_max_redirects() -> usize {
        10
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: Self::default_timeout_ms(),
            user_agent: Self::default_user_agent(),
            max_redirects: Self::default_max_redirects(),
        }
    }
}

/// HEAD request against the canonical link; only `200 OK` counts as live.
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .redirect(Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ExistenceProbe for HttpProbe {
    async fn check(&self, url: &str) -> Result<(), ProbeError> {
        let parsed =
            url::Url::parse(url).map_err(|e| ProbeError::Transport(format!("Invalid URL: {e}")))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProbeError::Transport(
                "Only http and https URLs are supported".to_string(),
            ));
        }

        let response = self.client.head(parsed).send().await.map_err(|e| {
            if e.is_timeout() {
                ProbeError::Timeout
            } else {
                ProbeError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        debug!("HEAD {url} -> {status}");

        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(ProbeError::Status(status.as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_config_default() {
        let config = ProbeConfig::default();
        assert_eq!(config.probe_timeout_ms, 100);
        assert_eq!(config.timeout(), Duration::from_millis(100));
        assert_eq!(config.max_redirects, 10);
        assert!(config.user_agent.contains("tglinks"));
    }

    #[test]
    fn test_probe_config_partial_json() {
        let config: ProbeConfig = serde_json::from_str(r#"{"probe_timeout_ms": 2500}"#)
            .unwrap_or_else(|e| panic!("valid JSON should deserialize: {e}"));
        assert_eq!(config.probe_timeout_ms, 2500);
        assert_eq!(config.max_redirects, 10);
    }

    #[test]
    fn test_http_probe_new() {
        assert!(HttpProbe::new(&ProbeConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_rejects_non_http_scheme() {
        let Ok(probe) = HttpProbe::new(&ProbeConfig::default()) else {
            panic!("Failed to create HttpProbe");
        };
        let err = probe.check("ftp://t.me/example").await;
        assert!(matches!(err, Err(ProbeError::Transport(msg)) if msg.contains("http")));
    }
}
