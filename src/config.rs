//! Runtime configuration for the HTTP client and sources.
//!
//! [`Config`] uses `derive_builder`, so only the fields that differ from the
//! defaults need to be set:
//!
//! ```rust
//! use shiori::config::ConfigBuilder;
//! use std::time::Duration;
//!
//! let config = ConfigBuilder::default()
//!     .user_agent("MyReader/2.0")
//!     .manga_here_interval(Duration::from_millis(1500))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.page_concurrency, 3);
//! assert_eq!(config.language, "English");
//! ```

use std::time::Duration;

use derive_builder::Builder;

/// HTTP and source settings.
///
/// Fields left unset on a [`ConfigBuilder`] take their value from
/// [`Config::default`].
#[derive(Debug, Clone, Builder)]
#[builder(default, setter(into))]
pub struct Config {
    /// User-Agent sent with every request
    pub user_agent: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Retries for transport errors, 429 and 5xx responses
    pub max_retries: u32,

    /// Minimum interval between requests to MangaHere, which bans IPs that
    /// request faster
    pub manga_here_interval: Duration,

    /// Upper bound on concurrent sub-page fetches while resolving a chapter
    pub page_concurrency: usize,

    /// Language kept when a feed mixes translations (matched against the
    /// `Language: <name>` tag Mangadex puts in item descriptions)
    pub language: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: format!("Shiori/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            max_retries: 2,
            manga_here_interval: Duration::from_millis(1000),
            page_concurrency: 3,
            language: "English".to_string(),
        }
    }
}
