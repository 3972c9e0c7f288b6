//! Client for the host's admin surface.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Readiness probing: the environment load retries this many times at a
/// one second cadence before it is abandoned.
pub const READINESS_ATTEMPTS: u32 = 30;
pub const READINESS_INTERVAL: Duration = Duration::from_secs(1);

/// An error while talking to the host admin API.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The admin surface never became reachable; the dependent load is
    /// abandoned (logged, not fatal).
    #[error("host admin API unreachable after {0} attempts")]
    Unreachable(u32),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Where the application's flow configuration comes from.
///
/// The HTTP client below implements this against the host's `GET /flows`;
/// embedders can hand the runtime any other source.
#[async_trait]
pub trait FlowsSource: Send + Sync {
    async fn fetch_flows(&self) -> Result<Value, HostError>;
}

/// Reqwest-backed client for the host admin endpoints the runtime
/// consumes: `/flows`, `/settings`, `/diagnostics`.
#[derive(Debug, Clone)]
pub struct HostClient {
    base_url: String,
    client: reqwest::Client,
}

impl HostClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client: reqwest::Client::new(),
        }
    }

    async fn get_json(&self, path: &str) -> Result<Value, HostError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn settings(&self) -> Result<Value, HostError> {
        self.get_json("/settings").await
    }

    pub async fn diagnostics(&self) -> Result<Value, HostError> {
        self.get_json("/diagnostics").await
    }

    /// Waits for the admin surface to answer, retrying up to
    /// [`READINESS_ATTEMPTS`] times at [`READINESS_INTERVAL`].
    pub async fn wait_ready(&self) -> Result<(), HostError> {
        for attempt in 1..=READINESS_ATTEMPTS {
            match self.get_json("/diagnostics").await {
                Ok(_) => return Ok(()),
                Err(error) => {
                    tracing::debug!(attempt, %error, "host admin API not ready yet");
                }
            }
            tokio::time::sleep(READINESS_INTERVAL).await;
        }
        Err(HostError::Unreachable(READINESS_ATTEMPTS))
    }
}

#[async_trait]
impl FlowsSource for HostClient {
    async fn fetch_flows(&self) -> Result<Value, HostError> {
        self.get_json("/flows").await
    }
}
