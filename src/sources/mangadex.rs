use crate::{
    config::Config,
    dates,
    error::{Error, Result},
    ids::{self, PathPattern},
    net::{self, Fetcher},
    source::{Source, require_param},
    types::{Chapter, ChapterPreview, Page, Series, UrlParts},
};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

const BASE_URL: &str = "https://mangadex.org";

// https://mangadex.org/manga/13127
// https://mangadex.org/manga/13127/uramikoi-koi-uramikoi
// https://mangadex.org/chapter/37149/1
static PATH: Lazy<PathPattern> = Lazy::new(|| {
    PathPattern::new("/:type(manga|chapter)/:first/:second?").expect("valid mangadex pattern")
});

static CHAPTER_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)chapter (\d+(?:\.\d+)?)$").expect("valid chapter number regex"));

/// Source implementation for mangadex.org.
///
/// Series come from the site's per-manga RSS feed, which mixes every
/// translation; only items tagged with [`Config::language`] are kept.
/// Chapter URLs carry no series slug. The reader page embeds the manga id,
/// which is where a chapter's `series_id` comes from.
pub struct MangadexSource {
    client: Arc<dyn Fetcher>,
    language: String,
}

impl MangadexSource {
    pub fn new(client: Arc<dyn Fetcher>, config: &Config) -> Self {
        Self {
            client,
            language: config.language.clone(),
        }
    }

    fn preview(&self, series_slug: &str, item: &net::rss::Item) -> Result<ChapterPreview> {
        let title = item.title.trim();
        let slug = ids::path_tail(item.link.trim()).to_string();
        if slug.is_empty() {
            return Err(Error::parse(format!("Feed item '{title}' has no chapter link")));
        }

        let number = CHAPTER_NUMBER
            .captures(title)
            .map(|caps| caps[1].to_string())
            .or_else(|| title.rsplit(" - ").next().map(str::to_string));
        let url = self.construct_url(Some(series_slug), Some(&slug))?;

        Ok(ChapterPreview {
            id: ids::chapter_id(&url),
            slug,
            url,
            number,
            title: Some(title.to_string()).filter(|t| !t.is_empty()),
            created_at: dates::parse_pub_date(&item.pub_date, chrono_tz::UTC)?,
        })
    }
}

#[async_trait]
impl Source for MangadexSource {
    fn id(&self) -> &'static str {
        "mangadex"
    }

    fn name(&self) -> &'static str {
        "Mangadex"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    fn parse_url(&self, url: &str) -> Result<UrlParts> {
        let params = PATH
            .matches(url)
            .ok_or_else(|| Error::invalid_url(url, "not a Mangadex manga or chapter URL"))?;
        let first = require_param(&params, "first", url)?;

        Ok(match params.get("type").map(String::as_str) {
            Some("chapter") => UrlParts {
                series_slug: None,
                chapter_slug: Some(first),
            },
            _ => UrlParts::series(first),
        })
    }

    /// A chapter slug wins over a series slug: chapter URLs cannot name
    /// their series.
    fn construct_url(&self, series_slug: Option<&str>, chapter_slug: Option<&str>) -> Result<String> {
        let url = match (series_slug, chapter_slug) {
            (_, Some(chapter_slug)) if !chapter_slug.is_empty() => format!("{BASE_URL}/chapter/{chapter_slug}"),
            (Some(series_slug), _) if !series_slug.is_empty() => format!("{BASE_URL}/manga/{series_slug}"),
            _ => return Err(Error::invalid_argument("either a series or a chapter slug is required")),
        };
        ids::normalize_url(&url)
    }

    async fn get_series(&self, series_slug: &str) -> Result<Series> {
        let url = self.construct_url(Some(series_slug), None)?;
        let feed_url = format!("{BASE_URL}/rss/manga_id/{series_slug}");
        let feed = net::rss::parse(&self.client.get_text(&feed_url).await?)?;

        // Item titles read "<series> - <chapter>".
        let title = feed
            .items
            .first()
            .and_then(|item| item.title.trim().split(" - ").next())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::parse(format!("No series title in feed '{feed_url}'")))?
            .to_string();

        let language_tag = format!("Language: {}", self.language);
        let chapters = feed
            .items
            .iter()
            .filter(|item| item.description.contains(&language_tag))
            .map(|item| self.preview(series_slug, item))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            series = series_slug,
            items = feed.items.len(),
            kept = chapters.len(),
            language = %self.language,
            "filtered mangadex feed"
        );

        Series::with_chapters(ids::series_id(&url), series_slug, url, title, chapters)
    }

    async fn get_chapter(&self, _series_slug: Option<&str>, chapter_slug: &str) -> Result<Chapter> {
        let url = self.construct_url(None, Some(chapter_slug))?;
        let html = self.client.get_text(&url).await?;

        let server = net::json::extract_var(&html, "server")
            .map(|v| net::json::as_string(&v))?
            .ok_or_else(|| Error::parse("'server' is not a string"))?;
        let hash = net::json::extract_var(&html, "dataurl")
            .map(|v| net::json::as_string(&v))?
            .ok_or_else(|| Error::parse("'dataurl' is not a string"))?;
        let files: Vec<String> = net::json::extract_var_as(&html, "page_array")?;
        if files.is_empty() {
            return Err(Error::parse(format!("Empty page_array at '{url}'")));
        }
        let manga_id = net::json::extract_var(&html, "manga_id")
            .map(|v| net::json::as_string(&v))?
            .ok_or_else(|| Error::parse("'manga_id' is not a string or number"))?;

        let series_url = self.construct_url(Some(&manga_id), None)?;
        let pages = files
            .iter()
            .map(|file| Page::new(format!("{server}{hash}/{file}")))
            .collect();

        Ok(Chapter {
            id: ids::chapter_id(&url),
            slug: chapter_slug.to_string(),
            url,
            series_id: ids::series_id(&series_url),
            pages,
        })
    }
}
