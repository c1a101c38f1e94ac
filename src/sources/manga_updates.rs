use crate::{
    dates,
    error::{Error, Result},
    ids,
    net::{self, Fetcher},
    source::{Source, require_slug},
    types::{Chapter, Series, UrlParts},
};
use async_trait::async_trait;
use chrono_tz::Tz;
use std::sync::Arc;
use url::Url;

const BASE_URL: &str = "https://mangaupdates.com";

const TZ: Tz = chrono_tz::America::Los_Angeles;

/// Source implementation for mangaupdates.com.
///
/// MangaUpdates is a release tracker: it knows a series' title and when it
/// last had a release, but hosts no pages and no usable chapter list.
pub struct MangaUpdatesSource {
    client: Arc<dyn Fetcher>,
}

impl MangaUpdatesSource {
    pub fn new(client: Arc<dyn Fetcher>) -> Self {
        Self { client }
    }

    fn releases_url(series_slug: &str) -> String {
        format!(
            "https://www.mangaupdates.com/releases.html?search={}&stype=series",
            urlencoding::encode(series_slug)
        )
    }
}

#[async_trait]
impl Source for MangaUpdatesSource {
    fn id(&self) -> &'static str {
        "manga-updates"
    }

    fn name(&self) -> &'static str {
        "MangaUpdates"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    fn supports_reading(&self) -> bool {
        false
    }

    fn parse_url(&self, url: &str) -> Result<UrlParts> {
        let canonical = ids::normalize_url(url)?;
        let parsed = Url::parse(&canonical).map_err(|_| Error::malformed_url(url))?;

        if parsed.path() != "/series.html" {
            return Err(Error::invalid_url(url, "not a MangaUpdates series URL"));
        }

        parsed
            .query_pairs()
            .find(|(key, value)| key == "id" && !value.is_empty())
            .map(|(_, value)| UrlParts::series(value.into_owned()))
            .ok_or_else(|| Error::invalid_url(url, "missing id"))
    }

    fn construct_url(&self, series_slug: Option<&str>, chapter_slug: Option<&str>) -> Result<String> {
        if chapter_slug.is_some() {
            return Err(Error::invalid_argument("MangaUpdates has no chapter URLs"));
        }
        let series_slug = require_slug(series_slug, "series")?;
        ids::normalize_url(&format!(
            "{BASE_URL}/series.html?id={}",
            urlencoding::encode(series_slug)
        ))
    }

    async fn get_series(&self, series_slug: &str) -> Result<Series> {
        let url = self.construct_url(Some(series_slug), None)?;
        let html_str = self.client.get_text(&Self::releases_url(series_slug)).await?;
        let document = net::html::parse(&html_str);

        // A trailing '*' marks series whose information changed in the last
        // 24 hours.
        let title = net::html::require_text(&document, "#main_content td.text.pad[bgcolor]:nth-child(2)")?
            .trim_end_matches('*')
            .trim()
            .to_string();
        let released = net::html::require_text(&document, "#main_content td.text.pad[bgcolor]:nth-child(1)")?;
        let updated_at = dates::parse_date(&released, "%m/%d/%y", TZ)?;

        Ok(Series::without_chapters(ids::series_id(&url), series_slug, url, title, updated_at))
    }

    async fn get_chapter(&self, _series_slug: Option<&str>, _chapter_slug: &str) -> Result<Chapter> {
        Err(Error::unsupported_operation(self.id(), "get_chapter"))
    }
}
