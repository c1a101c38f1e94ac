//! Network layer: the fetch seam, the HTTP client and request throttling.
//!
//! This module provides:
//!
//! - **[`Fetcher`]**: the "get this URL as text/JSON" capability sources
//!   depend on. Sources hold an `Arc<dyn Fetcher>`, so tests can swap in
//!   fixtures.
//! - **[`HttpClient`]**: the reqwest-backed fetcher, with retries for
//!   transient failures
//! - **[`Throttle`]** / **[`Throttled`]**: a single-token gate admitting one
//!   request per interval, shared by every caller of one source
//! - **Content parsing**: [`html`], [`json`] (embedded script data) and
//!   [`rss`] helpers
//!
//! # Examples
//!
//! ```rust
//! use shiori::config::Config;
//! use shiori::net::{Fetcher, HttpClient, Throttled};
//! use std::time::Duration;
//!
//! # async fn example() -> shiori::Result<()> {
//! let client = HttpClient::new(&Config::default());
//! let throttled = Throttled::new(client, Duration::from_millis(500));
//!
//! let html = throttled.get_text("https://mangakakalot.com/manga/gleipnir").await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode, header::HeaderMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::Config;
use crate::error::{Error, Result};

pub mod html;
pub mod json;
pub mod rss;

/// Default HTTP client, built on first use and reused by every
/// [`HttpClient`] that does not need its own timeout or User-Agent.
static CLIENT: Lazy<Client> = Lazy::new(|| build_client(&Config::default()).unwrap_or_default());

fn build_client(config: &Config) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.clone())
        .pool_max_idle_per_host(10)
        .gzip(true)
        .brotli(true)
        .build()
}

/// The page/API retrieval capability sources are built on.
///
/// Implementations must report non-2xx responses and transport failures as
/// [`Error::Fetch`]. Retrying, if any, happens inside the implementation;
/// sources never retry.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` and returns the body as text.
    async fn get_text(&self, url: &str) -> Result<String>;

    /// Fetches `url` and parses the body as JSON.
    ///
    /// # Errors
    ///
    /// [`Error::Parse`] if the body is not JSON.
    async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body)
            .map_err(|e| Error::parse(format!("Invalid JSON from '{url}': {e}")))
    }
}

#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for Arc<F> {
    async fn get_text(&self, url: &str) -> Result<String> {
        (**self).get_text(url).await
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        (**self).get_json(url).await
    }
}

/// Single-token rate limiter.
///
/// [`acquire`](Throttle::acquire) keeps the gate locked while it waits, so
/// concurrent callers queue up and leave one at a time, at least `interval`
/// apart. Clones share the same gate.
#[derive(Debug, Clone)]
pub struct Throttle {
    last_request: Arc<Mutex<Option<Instant>>>,
    interval: Duration,
}

impl Throttle {
    /// Creates a throttle admitting one request per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            last_request: Arc::new(Mutex::new(None)),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until a request may be sent, then records it.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let ready_at = previous + self.interval;
            if Instant::now() < ready_at {
                tracing::debug!(wait_ms = (ready_at - Instant::now()).as_millis() as u64, "throttle: waiting");
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// A [`Fetcher`] whose requests all pass through one [`Throttle`].
///
/// # Examples
///
/// ```rust
/// use shiori::config::Config;
/// use shiori::net::{HttpClient, Throttled};
/// use std::time::Duration;
///
/// let fetcher = Throttled::new(HttpClient::new(&Config::default()), Duration::from_secs(1));
/// assert_eq!(fetcher.throttle().interval(), Duration::from_secs(1));
/// ```
#[derive(Debug, Clone)]
pub struct Throttled<F> {
    inner: F,
    throttle: Throttle,
}

impl<F: Fetcher> Throttled<F> {
    pub fn new(inner: F, interval: Duration) -> Self {
        Self {
            inner,
            throttle: Throttle::new(interval),
        }
    }

    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }
}

#[async_trait]
impl<F: Fetcher> Fetcher for Throttled<F> {
    async fn get_text(&self, url: &str) -> Result<String> {
        self.throttle.acquire().await;
        self.inner.get_text(url).await
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        self.throttle.acquire().await;
        self.inner.get_json(url).await
    }
}

/// HTTP fetcher backed by reqwest.
///
/// # Features
///
/// - **Retry Logic**: transport errors, 429 and 5xx responses are retried
///   with exponential backoff, honouring `Retry-After` when present
/// - **Error Handling**: every failure surfaces as [`Error::Fetch`] carrying
///   the URL and status
/// - **Custom Headers**: per-client headers such as `Referer`
///
/// # Examples
///
/// ```rust
/// use shiori::config::Config;
/// use shiori::net::{Fetcher, HttpClient};
///
/// # async fn example() -> shiori::Result<()> {
/// let client = HttpClient::new(&Config::default())
///     .with_header("Referer", "https://mangakakalot.com/");
///
/// let html = client.get_text("https://mangakakalot.com/manga/gleipnir").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
    headers: HeaderMap,
}

impl HttpClient {
    /// Creates a client from `config` (timeout, User-Agent, retries).
    pub fn new(config: &Config) -> Self {
        let client = if config.timeout == Config::default().timeout
            && config.user_agent == Config::default().user_agent
        {
            CLIENT.clone()
        } else {
            build_client(config).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "falling back to the default HTTP client");
                CLIENT.clone()
            })
        };

        Self {
            client,
            max_retries: config.max_retries,
            headers: HeaderMap::new(),
        }
    }

    /// Sets the maximum number of retries for failed requests.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Adds a header to all requests made by this client. Invalid names or
    /// values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            name.parse::<reqwest::header::HeaderName>(),
            value.parse::<reqwest::header::HeaderValue>(),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Performs a GET request and returns the body bytes.
    ///
    /// # Errors
    ///
    /// [`Error::Fetch`] for transport failures and non-success statuses,
    /// once retries are exhausted.
    pub async fn get(&self, url: &str) -> Result<Bytes> {
        let mut attempts = 0;

        loop {
            tracing::debug!(url, attempt = attempts, "GET");

            match self.client.get(url).headers(self.headers.clone()).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.bytes().await.map_err(|e| Error::transport(url, e));
                    }

                    let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
                    if retryable && attempts < self.max_retries {
                        attempts += 1;
                        let delay = response
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .map(Duration::from_secs)
                            .unwrap_or_else(|| Duration::from_secs(2_u64.pow(attempts)));
                        tracing::warn!(url, status = status.as_u16(), ?delay, "retrying");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    return Err(Error::http_status(url, status.as_u16()));
                }
                Err(e) => {
                    if attempts < self.max_retries {
                        attempts += 1;
                        tracing::warn!(url, error = %e, "transport error, retrying");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        continue;
                    }
                    return Err(Error::transport(url, e));
                }
            }
        }
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn get_text(&self, url: &str) -> Result<String> {
        let bytes = self.get(url).await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::parse(format!("Invalid UTF-8 from '{url}': {e}")))
    }
}
