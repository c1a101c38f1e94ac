//! Source trait and registry.
//!
//! This module defines the [`Source`] trait every site implementation
//! satisfies, and the [`Sources`] registry that resolves a URL or site id to
//! its source. A registry is built once at startup and then handed to the
//! [`Aggregator`](crate::Aggregator); it is not modified afterwards.
//!
//! # Examples
//!
//! ```rust
//! use shiori::config::Config;
//! use shiori::prelude::*;
//!
//! # fn example() -> shiori::Result<()> {
//! let sources = Sources::from_config(&Config::default());
//!
//! let source = sources.find_by_supported_url("https://mangakakalot.com/manga/gleipnir")?;
//! assert_eq!(source.id(), "mangakakalot");
//!
//! let parts = source.parse_url("https://mangakakalot.com/manga/gleipnir")?;
//! assert_eq!(parts.series_slug.as_deref(), Some("gleipnir"));
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    config::Config,
    error::{Error, Result},
    ids,
    net::{Fetcher, HttpClient},
    types::{Chapter, Series, SiteIdentity, UrlParts},
};

/// A manga site.
///
/// Implementations recognise their site's URLs, convert between URLs and
/// slugs, and fetch series metadata and chapter pages. The contract:
///
/// - `parse_url(construct_url(s, c)?)` returns `(s, c)` for every slug pair
///   the site can express in one URL
/// - `supports_url` never fails; unparseable URLs are simply unsupported
/// - `get_series` / `get_chapter` propagate [`Error::Fetch`] and
///   [`Error::Parse`] untouched and never return partial results
/// - sources that cannot serve pages return [`Error::UnsupportedOperation`]
///   from `get_chapter` without fetching anything
#[async_trait]
pub trait Source: Send + Sync {
    /// Stable site id, unique across a registry (e.g. `"mangadex"`).
    fn id(&self) -> &'static str;

    /// Human-readable site name.
    fn name(&self) -> &'static str;

    /// Canonical site root (scheme and host) that URLs are built from.
    fn base_url(&self) -> &'static str;

    fn identity(&self) -> SiteIdentity {
        SiteIdentity {
            id: self.id().to_string(),
            name: self.name().to_string(),
        }
    }

    /// True iff the URL's host is this site's host, with or without `www.`.
    fn supports_url(&self, url: &str) -> bool {
        ids::compare_domain(url, self.base_url())
    }

    /// Whether this site serves chapter pages.
    fn supports_reading(&self) -> bool {
        true
    }

    /// Extracts series/chapter slugs from a URL of this site.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUrl`] if the path matches none of the site's shapes.
    fn parse_url(&self, url: &str) -> Result<UrlParts>;

    /// Builds the canonical URL for a series or a chapter.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if a slug the URL needs is missing.
    fn construct_url(&self, series_slug: Option<&str>, chapter_slug: Option<&str>) -> Result<String>;

    /// Fetches a series with its metadata and, where the site lists them,
    /// its chapters.
    async fn get_series(&self, series_slug: &str) -> Result<Series>;

    /// Fetches a chapter and its pages.
    ///
    /// `series_slug` is `None` for sites whose chapter URLs do not name the
    /// series.
    async fn get_chapter(&self, series_slug: Option<&str>, chapter_slug: &str) -> Result<Chapter>;
}

/// Returns the slug or an [`Error::InvalidArgument`] naming what is missing.
pub(crate) fn require_slug<'a>(slug: Option<&'a str>, what: &str) -> Result<&'a str> {
    slug.filter(|s| !s.is_empty())
        .ok_or_else(|| Error::invalid_argument(format!("{what} slug is required")))
}

/// Returns the named path parameter or an [`Error::InvalidUrl`].
pub(crate) fn require_param(
    params: &HashMap<String, String>,
    name: &str,
    url: &str,
) -> Result<String> {
    params
        .get(name)
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or_else(|| Error::invalid_url(url, format!("missing {name}")))
}

/// Ordered registry of sources.
///
/// Lookups by URL return the first source, in registration order, that
/// supports the URL. Ids are unique: adding a source with an existing id
/// replaces the earlier one in place.
pub struct Sources {
    sources: Vec<Box<dyn Source>>,
    by_id: HashMap<String, usize>,
}

impl Sources {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Registers every source compiled into this build, using an
    /// [`HttpClient`] built from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::with_fetcher(Arc::new(HttpClient::new(config)), config)
    }

    /// Registers every source compiled into this build, in the fixed order
    /// manga-here, manga-updates, mangadex, mangakakalot, meraki-scans,
    /// helvetica-scans, all fetching through `fetcher`.
    #[allow(unused_variables, unused_mut)]
    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>, config: &Config) -> Self {
        let mut sources = Self::new();

        #[cfg(feature = "source-manga-here")]
        sources.add(crate::sources::MangaHereSource::new(fetcher.clone(), config));
        #[cfg(feature = "source-manga-updates")]
        sources.add(crate::sources::MangaUpdatesSource::new(fetcher.clone()));
        #[cfg(feature = "source-mangadex")]
        sources.add(crate::sources::MangadexSource::new(fetcher.clone(), config));
        #[cfg(feature = "source-mangakakalot")]
        sources.add(crate::sources::MangakakalotSource::new(fetcher.clone()));
        #[cfg(feature = "source-meraki-scans")]
        sources.add(crate::sources::MerakiScansSource::new(fetcher.clone()));
        #[cfg(feature = "source-helvetica-scans")]
        sources.add(crate::sources::HelveticaScansSource::new(fetcher.clone()));

        sources
    }

    pub fn add(&mut self, source: impl Source + 'static) -> &mut Self {
        let id = source.id().to_string();
        match self.by_id.get(&id) {
            Some(&index) => self.sources[index] = Box::new(source),
            None => {
                self.by_id.insert(id, self.sources.len());
                self.sources.push(Box::new(source));
            }
        }
        self
    }

    pub fn get(&self, id: &str) -> Option<&dyn Source> {
        self.by_id
            .get(id)
            .and_then(|&index| self.sources.get(index))
            .map(|s| s.as_ref())
    }

    /// Returns the source with the given id.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedSite`] naming `site_id` if none is registered.
    pub fn find_by_id(&self, site_id: &str) -> Result<&dyn Source> {
        self.get(site_id)
            .ok_or_else(|| Error::unsupported_site(site_id))
    }

    /// Returns the first source, in registration order, supporting `url`.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedSite`] naming `url` if no source supports it.
    pub fn find_by_supported_url(&self, url: &str) -> Result<&dyn Source> {
        self.sources
            .iter()
            .find(|s| s.supports_url(url))
            .map(|s| s.as_ref())
            .ok_or_else(|| Error::unsupported_site(url))
    }

    pub fn list_ids(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.id()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Source> {
        self.sources.iter().map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for Sources {
    fn default() -> Self {
        Self::new()
    }
}
