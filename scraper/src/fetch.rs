//! Page fetching for source adapters.
//!
//! [`PageFetcher`] is the seam between adapters and the network. The
//! production implementation is [`HttpFetcher`]; tests substitute
//! [`crate::testing::StaticFetcher`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::config::{ScraperConfig, DEFAULT_FETCH_TIMEOUT};
use crate::error::{SourceError, SourceResult};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetches the raw body of a listing page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> SourceResult<String>;
}

/// Bounded retry with exponential backoff for idempotent GETs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Never below 1.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(250))
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
        }
    }

    /// Single attempt, no backoff.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Delay before the given retry (1-based), doubling each time.
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff.saturating_mul(factor)
    }
}

/// Fetches `url`, retrying retryable failures according to `policy`.
pub async fn fetch_with_retry(
    fetcher: &dyn PageFetcher,
    url: &Url,
    policy: RetryPolicy,
) -> SourceResult<String> {
    let mut attempt = 1;
    loop {
        match fetcher.fetch(url).await {
            Ok(body) => return Ok(body),
            Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                let delay = policy.backoff_for(attempt);
                warn!(
                    url = %url,
                    attempt,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "Fetch failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// HTTP fetcher backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> SourceResult<Self> {
        Self::with_settings(DEFAULT_FETCH_TIMEOUT, DEFAULT_USER_AGENT)
    }

    pub fn from_config(config: &ScraperConfig) -> SourceResult<Self> {
        Self::with_settings(
            config.fetch_timeout,
            config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT),
        )
    }

    pub fn with_settings(timeout: Duration, user_agent: &str) -> SourceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(SourceError::Client)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> SourceResult<String> {
        debug!(url = %url, "HTTP fetch starting");
        let to_error = |source: reqwest::Error| {
            if source.is_timeout() {
                SourceError::Timeout {
                    url: url.to_string(),
                }
            } else {
                SourceError::Transport {
                    url: url.to_string(),
                    source,
                }
            }
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(to_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(to_error)?;
        debug!(url = %url, bytes = body.len(), "HTTP fetch complete");
        Ok(body)
    }
}
