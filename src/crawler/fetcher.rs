//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - GET requests that follow redirects
//! - Retry with exponential backoff for transient failures
//! - Error classification

use crate::config::Config;
use crate::{FetchCause, FetchFailed};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Maximum number of redirect hops followed per request
const MAX_REDIRECTS: usize = 10;

/// Default delay before the first retry; doubles on every further attempt
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Upper bound for a single backoff sleep
const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(30);

/// Builds an HTTP client with proper configuration
///
/// The timeout applies to each attempt as a whole (connect, headers and
/// body). Redirects are followed up to [`MAX_REDIRECTS`] hops.
///
/// # Example
///
/// ```no_run
/// use listing_grep::config::Config;
/// use listing_grep::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let timeout = config.timeout_duration();

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// GET with bounded retries
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Return body |
/// | HTTP 429 | Retry |
/// | HTTP 5xx | Retry |
/// | Other HTTP status | Fail immediately |
/// | Timeout | Retry |
/// | Connection error | Retry |
/// | Body read error | Fail immediately |
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    retries: u32,
    backoff: Duration,
}

impl Fetcher {
    /// Creates a fetcher from the configuration
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            retries: config.retries,
            backoff: DEFAULT_RETRY_BACKOFF,
        })
    }

    /// Overrides the initial retry backoff
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Fetches a URL, retrying transient failures
    ///
    /// Never panics or aborts: after the last attempt the failure is handed
    /// back as [`FetchFailed`] and the caller decides whether it is fatal.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchFailed> {
        let mut attempt: u32 = 0;

        loop {
            match self.attempt(url).await {
                Ok(body) => return Ok(body),
                Err(cause) if cause.is_retryable() && attempt < self.retries => {
                    let wait = self.backoff_for(attempt);
                    attempt += 1;
                    tracing::debug!(
                        "Attempt {}/{} for {} failed ({}), retrying in {:?}",
                        attempt,
                        self.retries + 1,
                        url,
                        cause,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(cause) => {
                    return Err(FetchFailed {
                        url: url.to_string(),
                        cause,
                    })
                }
            }
        }
    }

    /// Backoff before retry number `attempt + 1`
    fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.backoff
            .checked_mul(factor)
            .unwrap_or(MAX_RETRY_BACKOFF)
            .min(MAX_RETRY_BACKOFF)
    }

    /// A single GET attempt
    async fn attempt(&self, url: &str) -> Result<String, FetchCause> {
        let response = self.client.get(url).send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchCause::Status(status.as_u16()));
        }

        if response.url().as_str() != url {
            tracing::debug!("{} redirected to {}", url, response.url());
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchCause::Timeout
            } else {
                FetchCause::Body(e.to_string())
            }
        })
    }
}

/// Maps a transport error onto a fetch cause
fn classify(error: reqwest::Error) -> FetchCause {
    if error.is_timeout() {
        FetchCause::Timeout
    } else if error.is_connect() {
        FetchCause::Connect(error.to_string())
    } else {
        FetchCause::Transport(error.to_string())
    }
}
