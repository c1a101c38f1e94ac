use crate::{
    dates,
    error::{Error, Result},
    ids::{self, PathPattern},
    net::{self, Fetcher},
    source::{Source, require_param, require_slug},
    types::{Chapter, ChapterPreview, Page, Series, UrlParts},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use std::sync::Arc;

const BASE_URL: &str = "https://mangakakalot.com";

/// Mangakakalot displays every date in Hong Kong time.
const TZ: Tz = chrono_tz::Asia::Hong_Kong;

static SERIES_PATH: Lazy<PathPattern> =
    Lazy::new(|| PathPattern::new("/manga/:seriesSlug").expect("valid series pattern"));
static CHAPTER_PATH: Lazy<PathPattern> = Lazy::new(|| {
    PathPattern::new("/chapter/:seriesSlug/:chapterSlug(chapter_[^/]+)").expect("valid chapter pattern")
});

/// One row of the chapter table, before dates are resolved.
struct ChapterRow {
    slug: String,
    title: Option<String>,
    stamp: String,
}

/// Source implementation for mangakakalot.com.
///
/// Chapter rows show release stamps as `MM-DD HH:mm` or as relative phrases
/// ("2 hours ago", "yesterday"), never with a year. The series page does show
/// a full "Last updated" date, whose year seeds [`dates::infer_years`] for
/// the chapter list.
pub struct MangakakalotSource {
    client: Arc<dyn Fetcher>,
    now: Option<DateTime<Utc>>,
}

impl MangakakalotSource {
    pub fn new(client: Arc<dyn Fetcher>) -> Self {
        Self { client, now: None }
    }

    /// Pins the clock relative phrases are resolved against.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    fn now(&self) -> DateTime<Tz> {
        self.now.unwrap_or_else(Utc::now).with_timezone(&TZ)
    }

    /// Parses the "Last updated : Jan-02-2018 10:15:33 AM" line.
    fn parse_updated_at(line: &str) -> Result<i64> {
        let text = line.rsplit("Last updated :").next().unwrap_or(line).trim();
        dates::parse_datetime(text, "%b-%d-%Y %I:%M:%S %p", TZ)
            .or_else(|_| dates::parse_datetime(text, "%b-%d-%Y %H:%M:%S", TZ))
    }

    fn parse_rows(document: &scraper::Html) -> Result<Vec<ChapterRow>> {
        let rows = net::html::parse_items(document, ".chapter-list .row", |row| {
            // The header row has no link.
            let Some(href) = net::html::element_attr(row, "a", "href") else {
                return Ok(None);
            };
            let slug = href
                .trim_end_matches('/')
                .rsplit_once('/')
                .and_then(|(_, segment)| segment.strip_prefix("chapter_"))
                .map(str::to_string)
                .ok_or_else(|| Error::parse(format!("Unexpected chapter link '{href}'")))?;

            let title = net::html::element_text(row, "a").filter(|t| !t.is_empty());
            let stamp = {
                let spans = scraper::Selector::parse("span").map_err(|e| Error::parse(e.to_string()))?;
                row.select(&spans)
                    .nth(2)
                    .map(|el| el.text().collect::<String>().trim().to_string())
                    .ok_or_else(|| Error::parse(format!("No release date for chapter '{slug}'")))?
            };

            Ok(Some(ChapterRow { slug, title, stamp }))
        })?;

        Ok(rows.into_iter().flatten().collect())
    }
}

#[async_trait]
impl Source for MangakakalotSource {
    fn id(&self) -> &'static str {
        "mangakakalot"
    }

    fn name(&self) -> &'static str {
        "Mangakakalot"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    fn parse_url(&self, url: &str) -> Result<UrlParts> {
        if let Some(params) = SERIES_PATH.matches(url) {
            return Ok(UrlParts::series(require_param(&params, "seriesSlug", url)?));
        }

        let params = CHAPTER_PATH
            .matches(url)
            .ok_or_else(|| Error::invalid_url(url, "not a Mangakakalot series or chapter URL"))?;
        let series_slug = require_param(&params, "seriesSlug", url)?;
        let chapter_slug = require_param(&params, "chapterSlug", url)?;
        let chapter_slug = chapter_slug.strip_prefix("chapter_").unwrap_or(chapter_slug.as_str());

        Ok(UrlParts::chapter(series_slug, chapter_slug))
    }

    fn construct_url(&self, series_slug: Option<&str>, chapter_slug: Option<&str>) -> Result<String> {
        let series_slug = require_slug(series_slug, "series")?;
        let url = match chapter_slug {
            Some(chapter_slug) => format!("{BASE_URL}/chapter/{series_slug}/chapter_{chapter_slug}"),
            None => format!("{BASE_URL}/manga/{series_slug}"),
        };
        ids::normalize_url(&url)
    }

    async fn get_series(&self, series_slug: &str) -> Result<Series> {
        let url = self.construct_url(Some(series_slug), None)?;
        let html_str = self.client.get_text(&url).await?;
        let document = net::html::parse(&html_str);

        let title = net::html::require_text(&document, "ul.manga-info-text h1")?;
        let updated_line = net::html::select_all_text(&document, "ul.manga-info-text li")
            .into_iter()
            .find(|line| line.contains("Last updated"))
            .ok_or_else(|| Error::parse("No 'Last updated' line on series page"))?;
        let updated_at = Self::parse_updated_at(&updated_line)?;

        let rows = Self::parse_rows(&document)?;

        let now = self.now();
        let stamps: Vec<String> = rows
            .iter()
            .map(|row| dates::relative_to_month_day(&row.stamp, now).unwrap_or_else(|| row.stamp.clone()))
            .collect();
        let created = dates::infer_years(&stamps, dates::year_in(updated_at, TZ)?, TZ)?;

        let chapters = rows
            .into_iter()
            .zip(created)
            .map(|(row, created_at)| {
                let chapter_url = self.construct_url(Some(series_slug), Some(&row.slug))?;
                Ok(ChapterPreview {
                    id: ids::chapter_id(&chapter_url),
                    number: Some(row.slug.clone()),
                    slug: row.slug,
                    url: chapter_url,
                    title: row.title,
                    created_at,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if chapters.is_empty() {
            return Ok(Series::with_empty_listing(
                ids::series_id(&url),
                series_slug,
                url,
                title,
                updated_at,
            ));
        }

        Series::with_chapters(ids::series_id(&url), series_slug, url, title, chapters)
    }

    async fn get_chapter(&self, series_slug: Option<&str>, chapter_slug: &str) -> Result<Chapter> {
        let series_slug = require_slug(series_slug, "series")?;
        let series_url = self.construct_url(Some(series_slug), None)?;
        let url = self.construct_url(Some(series_slug), Some(chapter_slug))?;

        let html_str = self.client.get_text(&url).await?;
        let document = net::html::parse(&html_str);

        let pages: Vec<Page> = net::html::select_all_attr(&document, "#vungdoc img", "src")
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
