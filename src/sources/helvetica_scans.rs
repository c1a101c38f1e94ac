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
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

const BASE_URL: &str = "https://helveticascans.com";

const TZ: Tz = chrono_tz::America::Los_Angeles;

// https://helveticascans.com/r/series/talentless-nana/
// https://helveticascans.com/r/read/talentless-nana/en/2/11/page/1
static PATH: Lazy<PathPattern> = Lazy::new(|| {
    PathPattern::new(
        r"/r/:type(read|series)/:seriesSlug/:chapterSlug([a-z]{2}/\d+/\d+(?:/\d+)?)?/:page(page/\d+)?",
    )
    .expect("valid helvetica pattern")
});

#[derive(Debug, Deserialize)]
struct ComicResponse {
    comic: Comic,
    #[serde(default)]
    chapters: Vec<ChapterEntry>,
}

#[derive(Debug, Deserialize)]
struct Comic {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ChapterEntry {
    chapter: ChapterInfo,
}

/// FoolSlide serves the numeric fields as strings or numbers depending on
/// version.
#[derive(Debug, Deserialize)]
struct ChapterInfo {
    language: String,
    volume: Value,
    chapter: Value,
    #[serde(default)]
    subchapter: Value,
    created: String,
    #[serde(default)]
    name: Option<String>,
}

impl ChapterInfo {
    fn field(value: &Value, what: &str) -> Result<String> {
        net::json::as_string(value).ok_or_else(|| Error::parse(format!("Chapter has no {what}")))
    }

    /// `lang/volume/chapter`, plus `/subchapter` when there is one.
    fn slug(&self) -> Result<String> {
        let mut slug = format!(
            "{}/{}/{}",
            self.language,
            Self::field(&self.volume, "volume")?,
            Self::field(&self.chapter, "chapter")?
        );
        if let Some(sub) = self.subchapter().filter(|s| s != "0") {
            slug.push('/');
            slug.push_str(&sub);
        }
        Ok(slug)
    }

    fn subchapter(&self) -> Option<String> {
        net::json::as_string(&self.subchapter).filter(|s| !s.is_empty())
    }

    fn number(&self) -> Option<String> {
        let chapter = net::json::as_string(&self.chapter)?;
        Some(match self.subchapter().filter(|s| s != "0") {
            Some(sub) => format!("{chapter}.{sub}"),
            None => chapter,
        })
    }
}

/// Source implementation for helveticascans.com, a FoolSlide reader.
///
/// Series come from the FoolSlide JSON API. Reader pages embed every image
/// of a chapter, with dimensions, in a `var pages` script blob.
pub struct HelveticaScansSource {
    client: Arc<dyn Fetcher>,
}

impl HelveticaScansSource {
    pub fn new(client: Arc<dyn Fetcher>) -> Self {
        Self { client }
    }

    fn page(entry: &Value) -> Result<Page> {
        let url = entry
            .get("url")
            .and_then(net::json::as_string)
            .ok_or_else(|| Error::parse("Page entry without url"))?;
        let width = entry.get("width").and_then(net::json::as_u32);
        let height = entry.get("height").and_then(net::json::as_u32);

        Ok(Page::new(url).with_dimensions(width, height))
    }
}

#[async_trait]
impl Source for HelveticaScansSource {
    fn id(&self) -> &'static str {
        "helvetica-scans"
    }

    fn name(&self) -> &'static str {
        "Helvetica Scans"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    fn parse_url(&self, url: &str) -> Result<UrlParts> {
        let params = PATH
            .matches(url)
            .ok_or_else(|| Error::invalid_url(url, "not a Helvetica Scans series or reader URL"))?;

        Ok(UrlParts {
            series_slug: Some(require_param(&params, "seriesSlug", url)?),
            chapter_slug: params.get("chapterSlug").cloned(),
        })
    }

    fn construct_url(&self, series_slug: Option<&str>, chapter_slug: Option<&str>) -> Result<String> {
        let series_slug = require_slug(series_slug, "series")?;
        let url = match chapter_slug {
            Some(chapter_slug) => format!("{BASE_URL}/r/read/{series_slug}/{chapter_slug}"),
            None => format!("{BASE_URL}/r/series/{series_slug}"),
        };
        ids::normalize_url(&url)
    }

    async fn get_series(&self, series_slug: &str) -> Result<Series> {
        let url = self.construct_url(Some(series_slug), None)?;
        let api_url = format!("{BASE_URL}/r/api/reader/comic/stub/{series_slug}/format/json");

        let response: ComicResponse = serde_json::from_value(self.client.get_json(&api_url).await?)
            .map_err(|e| Error::parse(format!("Unexpected comic JSON from '{api_url}': {e}")))?;

        let chapters = response
            .chapters
            .iter()
            .map(|entry| {
                let info = &entry.chapter;
                let slug = info.slug()?;
                let chapter_url = self.construct_url(Some(series_slug), Some(&slug))?;
                Ok(ChapterPreview {
                    id: ids::chapter_id(&chapter_url),
                    slug,
                    url: chapter_url,
                    number: info.number(),
                    title: info.name.clone().filter(|n| !n.trim().is_empty()),
                    created_at: dates::parse_datetime(&info.created, "%Y-%m-%d %H:%M:%S", TZ)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Series::with_chapters(
            ids::series_id(&url),
            series_slug,
            url,
            response.comic.name.trim(),
            chapters,
        )
    }

    async fn get_chapter(&self, series_slug: Option<&str>, chapter_slug: &str) -> Result<Chapter> {
        let series_slug = require_slug(series_slug, "series")?;
        let series_url = self.construct_url(Some(series_slug), None)?;
        let url = self.construct_url(Some(series_slug), Some(chapter_slug))?;

        let html = self.client.get_text(&format!("{url}/page/1")).await?;
        let blob = net::json::extract_var(&html, "pages")?;
        let pages = blob
            .as_array()
            .ok_or_else(|| Error::parse("'pages' is not an array"))?
            .iter()
            .map(Self::page)
            .collect::<Result<Vec<_>>>()?;

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
