//! HTTP JSON fetching with an explicit retry policy.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::error::{BirthcalError, BirthcalResult};

const USER_AGENT: &str = concat!("birthcal/", env!("CARGO_PKG_VERSION"));
const DEFAULT_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Delay strategy between two attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed(Duration),
    /// Delay doubles after every retry, capped at `max`.
    Exponential { initial: Duration, max: Duration },
}

impl Backoff {
    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Fixed(delay) => *delay,
            Backoff::Exponential { initial, max } => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                initial.saturating_mul(factor).min(*max)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::Fixed(DEFAULT_RETRY_DELAY),
        }
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned HTTP {status}")]
    Status { url: Url, status: StatusCode },

    #[error("Invalid JSON from {url}: {source}")]
    Decode {
        url: Url,
        #[source]
        source: serde_json::Error,
    },

    #[error("Giving up on {url} after {attempts} attempts: {last}")]
    Exhausted {
        url: Url,
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } => is_retryable_status(*status),
            FetchError::Decode { .. } | FetchError::Exhausted { .. } => false,
        }
    }
}

/// Timeouts, rate limiting and server-side errors are worth retrying;
/// any other non-success status will not change on its own.
pub fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

/// Sequential JSON fetcher. One request in flight at a time.
pub struct Fetcher {
    http: reqwest::Client,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_client(reqwest::Client::new(), policy)
    }

    /// Fetcher with our user agent and an optional per-attempt timeout.
    pub fn build(policy: RetryPolicy, timeout: Option<Duration>) -> BirthcalResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| BirthcalError::Config(format!("Could not build HTTP client: {e}")))?;

        Ok(Self::with_client(http, policy))
    }

    pub fn with_client(http: reqwest::Client, policy: RetryPolicy) -> Self {
        Fetcher { http, policy }
    }

    /// GET `url` and decode the body as JSON, retrying per the policy.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let err = match self.attempt(url).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            if attempt >= max_attempts {
                tracing::warn!(%url, attempts = attempt, error = %err, "giving up");
                return Err(FetchError::Exhausted {
                    url: url.clone(),
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let delay = self.policy.backoff.delay_after(attempt);
            tracing::debug!(%url, attempt, ?delay, error = %err, "retrying");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn attempt<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.clone(),
            source,
        };

        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status,
            });
        }

        let body = resp.bytes().await.map_err(transport)?;

        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url.clone(),
            source,
        })
    }
}
