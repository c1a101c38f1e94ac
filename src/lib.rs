//! # Shiori - manga series and chapter aggregation library
//!
//! Shiori turns a URL from any supported manga site into one normalized
//! data model: a [`Series`] with its chapter listing, or a [`Chapter`] with
//! its ordered page images. Each site is a [`Source`] that knows how to
//! recognise, parse and build its own URLs and how to scrape or query its
//! pages; the [`Aggregator`] picks the right one for a URL.
//!
//! ## Features
//!
//! - **URL-driven lookups**: paste a series or chapter URL, get typed data back
//! - **Stable ids**: series, chapter and page ids are hashes of canonical URLs
//! - **Canonical URLs**: host casing, `www.`, default ports and trailing
//!   slashes never produce distinct identities
//! - **Timezone-aware dates**: every timestamp is unix seconds, including
//!   relative phrases and year-less stamps
//! - **Polite fetching**: per-source throttling for sites that ban fast clients
//! - **Parallel parsing**: chapter lists are parsed with rayon
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shiori::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> shiori::Result<()> {
//!     let aggregator = Aggregator::new(Sources::from_config(&Config::default()));
//!
//!     let series = aggregator
//!         .get_series("https://helveticascans.com/r/series/talentless-nana/")
//!         .await?;
//!     println!("{} on {}", series.title, series.site.name);
//!
//!     if let Some(latest) = series.chapters.as_ref().and_then(|c| c.first()) {
//!         let chapter = aggregator.get_chapter(&latest.url).await?;
//!         println!("{} pages", chapter.pages.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every failure is an [`Error`]; switch on [`Error::kind`] rather than on
//! messages:
//!
//! ```rust
//! use shiori::prelude::*;
//!
//! # async fn example() {
//! let aggregator = Aggregator::new(Sources::from_config(&Config::default()));
//! match aggregator.get_series("https://www.google.com").await {
//!     Err(e) if e.kind() == ErrorKind::UnsupportedSite => println!("not a manga site"),
//!     Err(e) => println!("failed: {e}"),
//!     Ok(series) => println!("{}", series.title),
//! }
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`aggregator`]: URL-based facade
//! - [`source`]: the [`Source`] trait and the [`Sources`] registry
//! - [`sources`]: one module per site, each behind a cargo feature
//! - [`net`]: fetching, throttling and HTML/JSON/RSS parsing helpers
//! - [`ids`]: URL normalization, hashing and path matching
//! - [`dates`]: timestamp parsing and year inference
//! - [`types`], [`config`], [`error`]

pub mod aggregator;
pub mod config;
pub mod dates;
pub mod error;
pub mod ids;
pub mod net;
pub mod source;
pub mod sources;
pub mod types;

/// Prelude module for convenient imports.
///
/// ```rust
/// use shiori::prelude::*;
///
/// // Aggregator, Sources, Source trait, Config, Error/ErrorKind and the
/// // data types are now in scope.
/// ```
pub mod prelude {
    pub use crate::{
        aggregator::Aggregator,
        config::{Config, ConfigBuilder},
        error::{Error, ErrorKind},
        source::{Source, Sources},
        types::{Chapter, ChapterPreview, Page, Series, SiteIdentity, SiteSeries, UrlParts},
    };
}

// Re-export main types at crate root for direct access
pub use aggregator::Aggregator;
pub use error::{Error, ErrorKind, Result};
pub use source::{Source, Sources};
pub use types::{Chapter, ChapterPreview, Page, Series, SiteIdentity, SiteSeries, UrlParts};
