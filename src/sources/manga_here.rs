use crate::{
    config::Config,
    dates,
    error::{Error, Result},
    ids::{self, PathPattern},
    net::{self, Fetcher, Throttled},
    source::{Source, require_param, require_slug},
    types::{Chapter, ChapterPreview, Page, Series, UrlParts},
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use futures::{StreamExt, TryStreamExt, stream};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use url::Url;

const BASE_URL: &str = "http://mangahere.cc";

const TZ: Tz = chrono_tz::America::Los_Angeles;

static PATH: Lazy<PathPattern> = Lazy::new(|| {
    PathPattern::new(r"/manga/:seriesSlug/:chapterSlug((?:v\w+/)?c[\d.]+)?/:page(\d+\.html)?")
        .expect("valid manga here pattern")
});

static CHAPTER_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"c0*(\d+(?:\.\d+)?)$").expect("valid chapter number regex"));

/// A chapter list entry before its date is resolved.
struct ChapterRow {
    slug: String,
    title: Option<String>,
    date: String,
}

/// Source implementation for mangahere.cc (and the older mangahere.co).
///
/// MangaHere bans clients that request too fast, so every request made by
/// this source goes through one [`Throttled`] fetcher spaced by
/// [`Config::manga_here_interval`].
///
/// The reader splits a chapter into one sub-page per image, but each
/// sub-page also embeds the following page's image. [`get_chapter`] only
/// requests every other sub-page and pairs the images back up.
///
/// [`get_chapter`]: Source::get_chapter
pub struct MangaHereSource {
    client: Arc<dyn Fetcher>,
    page_concurrency: usize,
    now: Option<DateTime<Utc>>,
}

impl MangaHereSource {
    pub fn new(client: Arc<dyn Fetcher>, config: &Config) -> Self {
        Self {
            client: Arc::new(Throttled::new(client, config.manga_here_interval)),
            page_concurrency: config.page_concurrency.max(1),
            now: None,
        }
    }

    /// Pins the clock that "Today" and "Yesterday" are resolved against.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    fn today(&self) -> NaiveDate {
        self.now.unwrap_or_else(Utc::now).with_timezone(&TZ).date_naive()
    }

    fn parse_release_date(&self, text: &str) -> Result<i64> {
        let text = text.trim();
        let day = if text.eq_ignore_ascii_case("today") {
            self.today()
        } else if text.eq_ignore_ascii_case("yesterday") {
            self.today() - Duration::days(1)
        } else {
            return dates::parse_date(text, "%b %d, %Y", TZ);
        };
        dates::local_to_unix(day.and_time(chrono::NaiveTime::MIN), TZ)
    }

    fn parse_rows(document: &scraper::Html) -> Result<Vec<ChapterRow>> {
        let rows = net::html::parse_items(document, ".detail_list ul li", |row| {
            let Some(href) = net::html::element_attr(row, "span.left a", "href") else {
                return Ok(None);
            };
            let slug = resolve(BASE_URL, &href)
                .and_then(|url| PATH.matches(&url))
                .and_then(|params| params.get("chapterSlug").cloned())
                .ok_or_else(|| Error::parse(format!("Unexpected chapter link '{href}'")))?;

            let link_text = net::html::element_text(row, "span.left a").unwrap_or_default();
            let title = net::html::element_text(row, "span.left")
                .map(|text| text.trim_start_matches(link_text.as_str()).trim().to_string())
                .filter(|t| !t.is_empty());

            let date = net::html::element_text(row, "span.right")
                .ok_or_else(|| Error::parse(format!("No release date for chapter '{slug}'")))?;

            Ok(Some(ChapterRow { slug, title, date }))
        })?;

        Ok(rows.into_iter().flatten().collect())
    }

    /// Returns the (current, next) image URLs of a reader sub-page.
    fn image_pair(html: &str, page_url: &str) -> Result<(String, Option<String>)> {
        let document = net::html::parse(html);
        let mut images = net::html::select_all_attr(&document, "section.read_img img", "src").into_iter();

        let current = images
            .next()
            .ok_or_else(|| Error::parse(format!("No page image at '{page_url}'")))?;
        Ok((current, images.next()))
    }
}

/// Resolves a possibly relative or protocol-relative `href` against `base`.
fn resolve(base: &str, href: &str) -> Option<String> {
    Url::parse(base).ok()?.join(href).ok().map(String::from)
}

#[async_trait]
impl Source for MangaHereSource {
    fn id(&self) -> &'static str {
        "manga-here"
    }

    fn name(&self) -> &'static str {
        "MangaHere"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    fn supports_url(&self, url: &str) -> bool {
        matches!(
            ids::normalized_host(url).as_deref(),
            Some("mangahere.cc" | "mangahere.co")
        )
    }

    fn parse_url(&self, url: &str) -> Result<UrlParts> {
        let params = PATH
            .matches(url)
            .ok_or_else(|| Error::invalid_url(url, "not a MangaHere series or chapter URL"))?;

        Ok(UrlParts {
            series_slug: Some(require_param(&params, "seriesSlug", url)?),
            chapter_slug: params.get("chapterSlug").cloned(),
        })
    }

    fn construct_url(&self, series_slug: Option<&str>, chapter_slug: Option<&str>) -> Result<String> {
        let series_slug = require_slug(series_slug, "series")?;
        let url = match chapter_slug {
            Some(chapter_slug) => format!("{BASE_URL}/manga/{series_slug}/{chapter_slug}"),
            None => format!("{BASE_URL}/manga/{series_slug}"),
        };
        ids::normalize_url(&url)
    }

    async fn get_series(&self, series_slug: &str) -> Result<Series> {
        let url = self.construct_url(Some(series_slug), None)?;
        let html_str = self.client.get_text(&url).await?;
        let document = net::html::parse(&html_str);

        let title = net::html::require_attr(&document, r#"meta[property="og:title"]"#, "content")?;

        let chapters = Self::parse_rows(&document)?
            .into_iter()
            .map(|row| {
                let chapter_url = self.construct_url(Some(series_slug), Some(&row.slug))?;
                Ok(ChapterPreview {
                    id: ids::chapter_id(&chapter_url),
                    number: CHAPTER_NUMBER.captures(&row.slug).map(|caps| caps[1].to_string()),
                    created_at: self.parse_release_date(&row.date)?,
                    slug: row.slug,
                    url: chapter_url,
                    title: row.title,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Series::with_chapters(ids::series_id(&url), series_slug, url, title, chapters)
    }

    async fn get_chapter(&self, series_slug: Option<&str>, chapter_slug: &str) -> Result<Chapter> {
        let series_slug = require_slug(series_slug, "series")?;
        let series_url = self.construct_url(Some(series_slug), None)?;
        let url = self.construct_url(Some(series_slug), Some(chapter_slug))?;

        let first_url = format!("{url}/1.html");
        let first_html = self.client.get_text(&first_url).await?;

        let page_urls: Vec<String> = {
            let document = net::html::parse(&first_html);
            net::html::select_all_attr(&document, "select.wid60 option", "value")
                .iter()
                .filter(|value| !value.contains("featured.html"))
                .filter_map(|value| resolve(&first_url, value))
                .collect()
        };
        let total = page_urls.len();
        if total == 0 {
            return Err(Error::parse(format!("No page list at '{first_url}'")));
        }

        // Sub-page 2k embeds images 2k and 2k + 1, so only even indices are
        // requested. Index 0 is the page already in hand.
        let first_pair = Self::image_pair(&first_html, &first_url)?;
        let sub_pages: Vec<String> = page_urls.iter().skip(2).step_by(2).cloned().collect();
        let rest: Vec<(String, Option<String>)> = stream::iter(sub_pages)
            .map(|page_url| {
                let client = Arc::clone(&self.client);
                async move {
                    let html = client.get_text(&page_url).await?;
                    Self::image_pair(&html, &page_url)
                }
            })
            .buffered(self.page_concurrency)
            .try_collect()
            .await?;

        tracing::debug!(
            chapter = %url,
            pages = total,
            requests = rest.len() + 1,
            "resolved paginated chapter"
        );

        let mut images = Vec::with_capacity(total);
        for (index, (current, next)) in std::iter::once(first_pair).chain(rest).enumerate() {
            images.push(current);
            match next {
                Some(next) => images.push(next),
                None if index * 2 + 1 < total => {
                    return Err(Error::parse(format!(
                        "Sub-page {} of '{url}' is missing the next page's image",
                        index * 2 + 1
                    )));
                }
                None => {}
            }
        }
        images.truncate(total);

        Ok(Chapter {
            id: ids::chapter_id(&url),
            slug: chapter_slug.to_string(),
            url,
            series_id: ids::series_id(&series_url),
            pages: images.into_iter().map(Page::new).collect(),
        })
    }
}
