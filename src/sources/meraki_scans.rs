use crate::{
    dates,
    error::{Error, Result},
    ids::{self, PathPattern},
    net::{self, Fetcher},
    source::{Source, require_param, require_slug},
    types::{Chapter, ChapterPreview, Page, Series, UrlParts},
};
use async_trait::async_trait;
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

const BASE_URL: &str = "https://merakiscans.com";

/// Naive feed dates are Eastern time.
const TZ: Tz = chrono_tz::America::New_York;

// https://merakiscans.com/senryu-girl/
// https://merakiscans.com/senryu-girl/2/
static PATH: Lazy<PathPattern> =
    Lazy::new(|| PathPattern::new("/:seriesSlug/:chapterSlug?").expect("valid meraki pattern"));

static FEED_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+) - Meraki Scans$").expect("valid feed title regex"));

static CHAPTER_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Chapter ([\d.]+)$").expect("valid chapter number regex"));

/// Source implementation for merakiscans.com, a GlossyBright WordPress site.
///
/// Series metadata comes from the per-series RSS feed; chapters are long
/// strip pages with every image inline.
pub struct MerakiScansSource {
    client: Arc<dyn Fetcher>,
}

impl MerakiScansSource {
    pub fn new(client: Arc<dyn Fetcher>) -> Self {
        Self { client }
    }

    fn preview(&self, series_slug: &str, item: &net::rss::Item) -> Result<ChapterPreview> {
        let link = item.link.trim();
        let slug = self
            .parse_url(link)
            .ok()
            .and_then(|parts| parts.chapter_slug)
            .ok_or_else(|| Error::parse(format!("Unexpected chapter link '{link}'")))?;

        let title = item.title.trim();
        let url = self.construct_url(Some(series_slug), Some(&slug))?;

        Ok(ChapterPreview {
            id: ids::chapter_id(&url),
            slug,
            url,
            number: CHAPTER_NUMBER.captures(title).map(|caps| caps[1].to_string()),
            title: Some(title.to_string()).filter(|t| !t.is_empty()),
            created_at: dates::parse_pub_date(&item.pub_date, TZ)?,
        })
    }
}

#[async_trait]
impl Source for MerakiScansSource {
    fn id(&self) -> &'static str {
        "meraki-scans"
    }

    fn name(&self) -> &'static str {
        "Meraki Scans"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    fn parse_url(&self, url: &str) -> Result<UrlParts> {
        let params = PATH
            .matches(url)
            .ok_or_else(|| Error::invalid_url(url, "not a Meraki Scans series or chapter URL"))?;

        Ok(UrlParts {
            series_slug: Some(require_param(&params, "seriesSlug", url)?),
            chapter_slug: params.get("chapterSlug").cloned(),
        })
    }

    fn construct_url(&self, series_slug: Option<&str>, chapter_slug: Option<&str>) -> Result<String> {
        let series_slug = require_slug(series_slug, "series")?;
        let url = match chapter_slug {
            Some(chapter_slug) => format!("{BASE_URL}/{series_slug}/{chapter_slug}"),
            None => format!("{BASE_URL}/{series_slug}"),
        };
        ids::normalize_url(&url)
    }

    async fn get_series(&self, series_slug: &str) -> Result<Series> {
        let url = self.construct_url(Some(series_slug), None)?;
        let feed_url = format!("{BASE_URL}/manga-rss/{series_slug}");
        let feed = net::rss::parse(&self.client.get_text(&feed_url).await?)?;

        let title = FEED_TITLE
            .captures(feed.title.trim())
            .map(|caps| caps[1].trim().to_string())
            .ok_or_else(|| Error::parse(format!("Unexpected feed title '{}'", feed.title.trim())))?;

        let chapters = feed
            .items
            .iter()
            .map(|item| self.preview(series_slug, item))
            .collect::<Result<Vec<_>>>()?;

        Series::with_chapters(ids::series_id(&url), series_slug, url, title, chapters)
    }

    async fn get_chapter(&self, series_slug: Option<&str>, chapter_slug: &str) -> Result<Chapter> {
        let series_slug = require_slug(series_slug, "series")?;
        let series_url = self.construct_url(Some(series_slug), None)?;
        let url = self.construct_url(Some(series_slug), Some(chapter_slug))?;

        let html_str = self.client.get_text(&url).await?;
        let document = net::html::parse(&html_str);

        let pages: Vec<Page> = net::html::select_all_attr(&document, "#longWrap img", "src")
            .into_iter()
            .map(Page::new)
            .collect();

        if pages.is_empty() {
            return Err(Error::parse(format!("No pages found at '{url}'")));
        }

        Ok(Chapter {
            id: ids::chapter_id(&url),
            slug: chapter_slug.to_string(),
            url,
            series_id: ids::series_id(&series_url),
            pages,
        })
    }
}
