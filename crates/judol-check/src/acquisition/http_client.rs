//! HTTP client with bounded retry for page fetches.
//!
//! One `HttpClient` wraps a `reqwest::Client`, which owns a connection pool
//! and is safe to share across tasks. Every request carries the configured
//! `User-Agent`. Transport failures and 500/502/503/504 responses are
//! retried with exponential backoff; any other status is returned as-is.

use reqwest::header::{HeaderValue, RETRY_AFTER, USER_AGENT};
use reqwest::StatusCode;
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// User agent sent with every request unless overridden.
pub const DEFAULT_USER_AGENT: &str = "judol-checker/1.0";

/// Statuses treated as transient server errors.
pub const RETRY_STATUSES: [u16; 4] = [500, 502, 503, 504];

/// Retry budget and backoff schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Additional attempts after the first request.
    pub max_retries: u32,
    /// Sleep before retry `n` is `backoff_factor * 2^(n-1)` seconds.
    pub backoff_factor: f64,
    /// Upper bound on any single sleep.
    pub backoff_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: 0.3,
            backoff_max: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    /// Delay before the given retry (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        if retry == 0 || !self.backoff_factor.is_finite() || self.backoff_factor <= 0.0 {
            return Duration::ZERO;
        }
        let exponent = retry.saturating_sub(1).min(63) as i32;
        let secs = self.backoff_factor * 2f64.powi(exponent);
        Duration::try_from_secs_f64(secs)
            .map(|d| d.min(self.backoff_max))
            .unwrap_or(self.backoff_max)
    }

    /// Whether a response with this status should be retried.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        RETRY_STATUSES.contains(&status)
    }
}

/// Settings for the shared client.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    /// Bound on each individual request, body included.
    pub timeout: Duration,
    pub user_agent: String,
    pub retry: RetryPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

/// A fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    /// Body decoded with the response charset (UTF-8 when undeclared).
    pub body: String,
}

/// Reasons a fetch produced no page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Build(String),
    #[error("{message}")]
    Transport { attempts: u32, message: String },
    #[error("giving up after {attempts} attempts: server answered {status}")]
    RetriesExhausted { status: u16, attempts: u32 },
    #[error("failed to decode response body: {0}")]
    Decode(String),
}

/// Shared HTTP client for page fetches.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    config: FetchConfig,
}

impl HttpClient {
    /// Build a client from the given settings.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| FetchError::Build(format!("invalid user agent: {e}")))?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(USER_AGENT, user_agent);

        let inner = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Build(error_chain(&e)))?;

        Ok(Self { inner, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// GET a URL, retrying transient failures within the retry budget.
    pub async fn get(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let policy = &self.config.retry;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let can_retry = attempt <= policy.max_retries;

            let response = match self
                .inner
                .get(url)
                .timeout(self.config.timeout)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    if can_retry && !e.is_builder() {
                        let delay = policy.delay_for(attempt);
                        debug!("retrying {url} in {delay:?} after transport error: {e}");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(FetchError::Transport {
                        attempts: attempt,
                        message: error_chain(&e),
                    });
                }
            };

            let status = response.status();
            if policy.is_retryable_status(status.as_u16()) {
                if !can_retry {
                    return Err(FetchError::RetriesExhausted {
                        status: status.as_u16(),
                        attempts: attempt,
                    });
                }
                let delay = retry_after(&response, status)
                    .map(|d| d.min(policy.backoff_max))
                    .unwrap_or_else(|| policy.delay_for(attempt));
                drop(response);
                debug!("retrying {url} in {delay:?} after status {status}");
                tokio::time::sleep(delay).await;
                continue;
            }

            let body = response
                .text()
                .await
                .map_err(|e| FetchError::Decode(error_chain(&e)))?;

            return Ok(FetchedPage {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
    }
}

/// Seconds requested by a `Retry-After` header on a 503.
fn retry_after(response: &reqwest::Response, status: StatusCode) -> Option<Duration> {
    if status != StatusCode::SERVICE_UNAVAILABLE {
        return None;
    }
    let value = response.headers().get(RETRY_AFTER)?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Render an error with its full `source()` chain, e.g.
/// `error sending request: connection refused`.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
