//! The single entry point for URL-based lookups.
//!
//! [`Aggregator`] resolves a URL to its source, extracts the slugs, delegates
//! the fetch and tags the result with the site it came from.
//!
//! # Examples
//!
//! ```rust
//! use shiori::prelude::*;
//! use shiori::config::Config;
//!
//! # async fn example() -> shiori::Result<()> {
//! let aggregator = Aggregator::new(Sources::from_config(&Config::default()));
//!
//! let series = aggregator.get_series("https://mangakakalot.com/manga/gleipnir").await?;
//! println!("{} ({}), updated {}", series.title, series.site.name, series.updated_at);
//!
//! let url = aggregator.construct_url("mangakakalot", Some("gleipnir"), Some("5"))?;
//! let chapter = aggregator.get_chapter(&url).await?;
//! println!("{} pages", chapter.pages.len());
//! # Ok(())
//! # }
//! ```

use crate::{
    error::{Error, Result},
    source::Sources,
    types::{Chapter, SiteSeries},
};

/// Facade over an immutable [`Sources`] registry.
///
/// Holds no per-request state: concurrent calls share nothing but the
/// sources' own rate limits.
pub struct Aggregator {
    sources: Sources,
}

impl Aggregator {
    pub fn new(sources: Sources) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    /// Fetches the series a URL points at (a chapter URL resolves to its
    /// series).
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedSite`] if no source supports `url`
    /// - [`Error::InvalidUrl`] if the URL carries no series slug
    /// - [`Error::Fetch`] / [`Error::Parse`] from the source
    pub async fn get_series(&self, url: &str) -> Result<SiteSeries> {
        let source = self.sources.find_by_supported_url(url)?;
        let parts = source.parse_url(url)?;
        let series_slug = parts
            .series_slug
            .ok_or_else(|| Error::invalid_url(url, "could not read series slug"))?;

        tracing::debug!(site = source.id(), series = %series_slug, "get_series");
        let series = source.get_series(&series_slug).await?;

        Ok(SiteSeries {
            series,
            site: source.identity(),
            supports_reading: source.supports_reading(),
        })
    }

    /// Fetches the chapter a URL points at, with its pages.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedSite`] if no source supports `url`
    /// - [`Error::InvalidUrl`] if the URL carries no chapter slug
    /// - [`Error::UnsupportedOperation`] if the site does not serve pages
    /// - [`Error::Fetch`] / [`Error::Parse`] from the source
    pub async fn get_chapter(&self, url: &str) -> Result<Chapter> {
        let source = self.sources.find_by_supported_url(url)?;
        let parts = source.parse_url(url)?;
        // Only the chapter slug is required: some sites' chapter URLs do not
        // name the series.
        let chapter_slug = parts
            .chapter_slug
            .ok_or_else(|| Error::invalid_url(url, "could not read chapter slug"))?;

        tracing::debug!(site = source.id(), chapter = %chapter_slug, "get_chapter");
        source
            .get_chapter(parts.series_slug.as_deref(), &chapter_slug)
            .await
    }

    /// Builds the canonical URL for a series or chapter of the site
    /// `site_id`, without any network access.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedSite`] if `site_id` is not registered
    /// - [`Error::InvalidArgument`] if the site needs a slug that is missing
    pub fn construct_url(
        &self,
        site_id: &str,
        series_slug: Option<&str>,
        chapter_slug: Option<&str>,
    ) -> Result<String> {
        self.sources
            .find_by_id(site_id)?
            .construct_url(series_slug, chapter_slug)
    }
}
