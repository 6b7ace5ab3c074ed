//! HTTP transport used by the site adapter and the cover cache.
//!
//! The [`Transport`] trait is the boundary to the network: the real
//! implementation wraps a `reqwest::Client`, tests substitute canned pages.

use crate::config::ScrapingConfig;
use crate::error::ScraperError;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// A fetched response body together with its status code.
#[derive(Debug, Clone)]
pub struct Page {
    pub status: u16,
    pub body: String,
}

/// Network operations the crawler needs.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GETs a page and returns its text; non-2xx statuses are errors.
    async fn get_text(&self, url: &str) -> Result<String, ScraperError>;

    /// GETs a binary resource; non-2xx statuses are errors.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ScraperError>;

    /// POSTs an empty body as an XHR from `referer` and returns whatever the
    /// server answered, status included.
    async fn post_ajax(&self, url: &str, referer: &str) -> Result<Page, ScraperError>;
}

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Delay before the second attempt; doubled for each one after.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ScrapingConfig) -> Self {
        Self {
            attempts: config.retries.max(1),
            base_delay: Duration::from_secs_f64(config.retry_base_delay_sec),
        }
    }

    /// A policy that tries exactly once.
    pub fn none() -> Self {
        Self {
            attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }

    /// Runs `op` until it succeeds, fails permanently, or attempts run out.
    ///
    /// Only errors reported as transient by [`ScraperError::is_transient`]
    /// are retried; the last error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, ScraperError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ScraperError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.attempts => {
                    let delay = self.delay_after(attempt);
                    warn!(
                        "{} failed, retrying in {:?} (attempt {}/{}): {}",
                        what,
                        delay,
                        attempt + 1,
                        self.attempts,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Transport backed by `reqwest` with a fixed user agent, timeout and
/// politeness delay before every request.
pub struct HttpClient {
    client: reqwest::Client,
    user_agent: String,
    delay_sec: f64,
}

impl HttpClient {
    pub fn new(config: &ScrapingConfig) -> Result<Self, ScraperError> {
        let client = create_http_client(config)?;
        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
            delay_sec: config.delay_between_requests_sec,
        })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, ScraperError> {
        rate_limit(self.delay_sec).await;

        let response = self.client.get(url).send().await?;
        check_status(url, response)
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get_text(&self, url: &str) -> Result<String, ScraperError> {
        Ok(self.get(url).await?.text().await?)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ScraperError> {
        Ok(self.get(url).await?.bytes().await?.to_vec())
    }

    async fn post_ajax(&self, url: &str, referer: &str) -> Result<Page, ScraperError> {
        rate_limit(self.delay_sec).await;

        let response = self
            .client
            .post(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::REFERER, referer)
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(Page { status, body })
    }
}

/// Builds the shared HTTP client.
pub fn create_http_client(config: &ScrapingConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
        .build()
}

/// Applies rate limiting delay.
pub async fn rate_limit(delay_sec: f64) {
    if delay_sec > 0.0 {
        tokio::time::sleep(Duration::from_secs_f64(delay_sec)).await;
    }
}

fn check_status(url: &str, response: reqwest::Response) -> Result<reqwest::Response, ScraperError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ScraperError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}
