//! Core data types for series, chapters and pages.
//!
//! This module defines the value objects every source produces:
//!
//! - [`Series`] - A series with its (optional) chapter listing
//! - [`SiteSeries`] - A [`Series`] tagged with the site that produced it
//! - [`ChapterPreview`] - A chapter entry inside a series listing
//! - [`Chapter`] - A readable chapter with its ordered pages
//! - [`Page`] - A single image of a chapter
//! - [`UrlParts`] - The slugs a source extracts from a URL
//!
//! All timestamps are unix seconds. Values are built fresh for every request
//! and never mutated after being returned.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identity of the source that produced a piece of data.
///
/// `id` is a stable, hand-picked slug (e.g. `"mangadex"`), unique across the
/// registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteIdentity {
    pub id: String,
    pub name: String,
}

/// Series and chapter slugs extracted from a source URL.
///
/// Either slug may be absent: a series URL has no chapter slug, and some
/// sources (Mangadex) use chapter URLs that do not mention the series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlParts {
    pub series_slug: Option<String>,
    pub chapter_slug: Option<String>,
}

impl UrlParts {
    pub fn series(series_slug: impl Into<String>) -> Self {
        Self {
            series_slug: Some(series_slug.into()),
            chapter_slug: None,
        }
    }

    pub fn chapter(series_slug: impl Into<String>, chapter_slug: impl Into<String>) -> Self {
        Self {
            series_slug: Some(series_slug.into()),
            chapter_slug: Some(chapter_slug.into()),
        }
    }
}

/// Summary of a chapter as it appears in a series listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterPreview {
    /// Hash of the chapter's canonical URL
    pub id: String,

    pub slug: String,

    /// Canonical chapter URL
    pub url: String,

    /// Chapter number as displayed by the source ("12", "12.5", "Oneshot")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Release time, unix seconds
    pub created_at: i64,
}

/// A manga series.
///
/// When `chapters` is present it is sorted newest first and `updated_at`
/// equals the newest chapter's `created_at`. Sources without a chapter
/// listing set `updated_at` from their own "last updated" signal. Use
/// [`Series::with_chapters`] or [`Series::without_chapters`] to keep the two
/// paths apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    /// Hash of the series' canonical URL
    pub id: String,

    pub slug: String,

    /// Canonical series URL
    pub url: String,

    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapters: Option<Vec<ChapterPreview>>,

    /// Last update time, unix seconds
    pub updated_at: i64,
}

impl Series {
    /// Builds a series from its chapter listing.
    ///
    /// Chapters are sorted by `created_at`, newest first (stable, so chapters
    /// released at the same instant keep the source's order), and
    /// `updated_at` is the newest chapter's timestamp.
    ///
    /// An empty listing gives no update time and fails with [`Error::Parse`];
    /// use [`Series::with_empty_listing`] when the page states one itself.
    pub fn with_chapters(
        id: String,
        slug: impl Into<String>,
        url: String,
        title: impl Into<String>,
        mut chapters: Vec<ChapterPreview>,
    ) -> Result<Self> {
        chapters.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let updated_at = chapters
            .first()
            .map(|c| c.created_at)
            .ok_or_else(|| Error::parse(format!("Could not set updated_at for '{url}': no chapters listed")))?;

        Ok(Self {
            id,
            slug: slug.into(),
            url,
            title: title.into(),
            chapters: Some(chapters),
            updated_at,
        })
    }

    /// Builds a series whose listing is empty but whose page reports its
    /// own last update time.
    pub fn with_empty_listing(
        id: String,
        slug: impl Into<String>,
        url: String,
        title: impl Into<String>,
        updated_at: i64,
    ) -> Self {
        Self {
            chapters: Some(Vec::new()),
            ..Self::without_chapters(id, slug, url, title, updated_at)
        }
    }

    /// Builds a series for a source that exposes no chapter listing.
    pub fn without_chapters(
        id: String,
        slug: impl Into<String>,
        url: String,
        title: impl Into<String>,
        updated_at: i64,
    ) -> Self {
        Self {
            id,
            slug: slug.into(),
            url,
            title: title.into(),
            chapters: None,
            updated_at,
        }
    }
}

/// A [`Series`] returned by the [`Aggregator`](crate::Aggregator), carrying
/// the identity of its site and whether that site can serve pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSeries {
    #[serde(flatten)]
    pub series: Series,

    pub site: SiteIdentity,

    pub supports_reading: bool,
}

impl std::ops::Deref for SiteSeries {
    type Target = Series;

    fn deref(&self) -> &Series {
        &self.series
    }
}

/// One image of a chapter, in reading order.
///
/// `id` is derived from the tail of the image URL's path, so it does not
/// depend on the page's position in the chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,

    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Page {
    /// Creates a page with an id derived from the image URL.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shiori::types::Page;
    ///
    /// let a = Page::new("https://img.example.com/ch1/001.jpg");
    /// let b = Page::new("https://img.example.com/ch1/001.jpg");
    /// assert_eq!(a.id, b.id);
    /// assert_eq!(a.width, None);
    /// ```
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            id: crate::ids::page_id(&url),
            url,
            width: None,
            height: None,
        }
    }

    pub fn with_dimensions(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// A readable chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// Hash of the chapter's canonical URL
    pub id: String,

    pub slug: String,

    /// Canonical chapter URL
    pub url: String,

    /// Id of the series this chapter belongs to
    pub series_id: String,

    /// Pages in reading order
    pub pages: Vec<Page>,
}
