//! Common test utilities and fixtures
//!
//! Shared functionality used across all test modules. Nothing here touches
//! the network: sources are wired to a [`FixtureFetcher`] serving canned
//! pages.

use async_trait::async_trait;
use parking_lot::Mutex;
use shiori::error::{Error, Result};
use shiori::net::Fetcher;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Instant;

/// A [`Fetcher`] serving bodies from a URL map and recording every request.
///
/// Unknown URLs fail with a 404 [`Error::Fetch`], like a real server would.
#[derive(Default)]
pub struct FixtureFetcher {
    routes: HashMap<String, String>,
    requests: Mutex<Vec<(String, Instant)>>,
}

#[allow(dead_code)]
impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.routes.insert(url.into(), body.into());
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Requested URLs, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().iter().map(|(url, _)| url.clone()).collect()
    }

    /// Instants at which requests arrived, in request order.
    pub fn request_times(&self) -> Vec<Instant> {
        self.requests.lock().iter().map(|(_, at)| *at).collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl Fetcher for FixtureFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        self.requests.lock().push((url.to_string(), Instant::now()));
        self.routes
            .get(url)
            .cloned()
            .ok_or_else(|| Error::http_status(url, 404))
    }
}

// ---------------------------------------------------------------------------
// Mangakakalot
// ---------------------------------------------------------------------------

#[allow(dead_code)]
pub const KAKALOT_SERIES_URL: &str = "https://mangakakalot.com/manga/gleipnir";

#[allow(dead_code)]
pub fn kakalot_series_page(updated: &str, rows: &[(&str, &str)]) -> String {
    let rows: String = rows
        .iter()
        .map(|(slug, stamp)| {
            format!(
                r#"<div class="row">
                    <span><a href="https://mangakakalot.com/chapter/gleipnir/chapter_{slug}" title="Gleipnir Chapter {slug}">Gleipnir Chapter {slug}</a></span>
                    <span>1,024</span>
                    <span title="{stamp}">{stamp}</span>
                </div>"#
            )
        })
        .collect();

    format!(
        r##"<html><body>
        <div class="manga-info-top">
            <ul class="manga-info-text">
                <li><h1>Gleipnir</h1><h2 class="story-alternative">Alternative : グレイプニル</h2></li>
                <li>Author(s) : <a href="#">Sun Takeda</a></li>
                <li>Status : Ongoing</li>
                <li>Last updated : {updated}</li>
                <li>View : 1,234,567</li>
            </ul>
        </div>
        <div class="chapter-list">{rows}</div>
        </body></html>"##
    )
}

#[allow(dead_code)]
pub const KAKALOT_CHAPTER_URL: &str = "https://mangakakalot.com/chapter/gleipnir/chapter_42";

#[allow(dead_code)]
pub const KAKALOT_CHAPTER_PAGE: &str = r#"<html><body>
    <div id="vungdoc">
        <img src="https://s8.mkklcdn.com/mangakakalot/g1/gleipnir/chapter_42/1.jpg" alt="page 1">
        <img src="https://s8.mkklcdn.com/mangakakalot/g1/gleipnir/chapter_42/2.jpg" alt="page 2">
        <img src="https://s8.mkklcdn.com/mangakakalot/g1/gleipnir/chapter_42/3.jpg" alt="page 3">
    </div>
</body></html>"#;

// ---------------------------------------------------------------------------
// MangaHere
// ---------------------------------------------------------------------------

#[allow(dead_code)]
pub const HERE_SERIES_URL: &str = "http://mangahere.cc/manga/urami_koi_koi_urami_koi";

#[allow(dead_code)]
pub const HERE_SERIES_PAGE: &str = r#"<html>
<head>
    <meta property="og:title" content="Urami Koi, Koi, Urami Koi.">
</head>
<body>
<div class="manga_detail">
    <div class="detail_list">
        <ul>
            <li>
                <span class="left"><a class="color_0077" href="//www.mangahere.cc/manga/urami_koi_koi_urami_koi/c038/">Urami Koi, Koi, Urami Koi. 38</a> <span class="mr6">Vol 01</span></span>
                <span class="right">Jan 05, 2018</span>
            </li>
            <li>
                <span class="left"><a class="color_0077" href="//www.mangahere.cc/manga/urami_koi_koi_urami_koi/v01/c037/">Urami Koi, Koi, Urami Koi. 37</a></span>
                <span class="right">Today</span>
            </li>
            <li>
                <span class="left"><a class="color_0077" href="http://www.mangahere.cc/manga/urami_koi_koi_urami_koi/c036.5/">Urami Koi, Koi, Urami Koi. 36.5</a></span>
                <span class="right">Dec 20, 2017</span>
            </li>
        </ul>
    </div>
</div>
</body>
</html>"#;

#[allow(dead_code)]
pub const HERE_CHAPTER_URL: &str = "http://mangahere.cc/manga/urami_koi_koi_urami_koi/c038";

/// URL a MangaHere sub-page is requested from, as listed in the reader's
/// page selector.
#[allow(dead_code)]
pub fn here_sub_page_url(page: usize) -> String {
    format!("http://www.mangahere.cc/manga/urami_koi_koi_urami_koi/c038/{page}.html")
}

#[allow(dead_code)]
pub fn here_image_url(page: usize) -> String {
    format!("https://l.mangahere.cc/store/manga/13542/038.0/compressed/{page:03}.jpg")
}

/// A reader sub-page of a `total`-page chapter. Each page shows its own
/// image and preloads the next one, unless `drop_next` is set.
#[allow(dead_code)]
pub fn here_sub_page(page: usize, total: usize, drop_next: bool) -> String {
    let options: String = (1..=total)
        .map(|n| {
            format!(
                r#"<option value="//www.mangahere.cc/manga/urami_koi_koi_urami_koi/c038/{n}.html">{n}</option>"#
            )
        })
        .chain(std::iter::once(
            r#"<option value="//www.mangahere.cc/manga/urami_koi_koi_urami_koi/c038/featured.html">Featured</option>"#
                .to_string(),
        ))
        .collect();

    let next = if page < total && !drop_next {
        format!(r#"<img src="{}" id="next-image" style="display:none">"#, here_image_url(page + 1))
    } else {
        String::new()
    };

    format!(
        r#"<html><body>
        <div class="go_page"><select class="wid60" onchange="javascript:location.href=this.value;">{options}</select></div>
        <section class="read_img" id="viewer">
            <a href="javascript:void(0);"><img src="{current}" id="image" onerror="this.src=this.src"></a>
            {next}
        </section>
        </body></html>"#,
        current = here_image_url(page),
    )
}

/// A fixture fetcher serving every sub-page of a `total`-page chapter.
#[allow(dead_code)]
pub fn here_chapter_fixtures(total: usize) -> FixtureFetcher {
    (1..=total).fold(FixtureFetcher::new(), |fixtures, page| {
        let body = here_sub_page(page, total, false);
        let fixtures = fixtures.with(here_sub_page_url(page), body.clone());
        if page == 1 {
            fixtures.with(format!("{HERE_CHAPTER_URL}/1.html"), body)
        } else {
            fixtures
        }
    })
}

// ---------------------------------------------------------------------------
// MangaUpdates
// ---------------------------------------------------------------------------

#[allow(dead_code)]
pub const UPDATES_SERIES_URL: &str = "https://www.mangaupdates.com/series.html?id=15";

#[allow(dead_code)]
pub const UPDATES_RELEASES_URL: &str =
    "https://www.mangaupdates.com/releases.html?search=15&stype=series";

#[allow(dead_code)]
pub const UPDATES_RELEASES_PAGE: &str = r##"<html><body>
<div id="main_content">
    <table>
        <tr>
            <td class="text pad" bgcolor="#D4E8FF">02/05/18</td>
            <td class="text pad" bgcolor="#D4E8FF">Urami Koi, Koi, Urami Koi*</td>
            <td class="text pad" bgcolor="#D4E8FF">v.2 c.38</td>
        </tr>
        <tr>
            <td class="text pad" bgcolor="#FFFFFF">01/28/18</td>
            <td class="text pad" bgcolor="#FFFFFF">Urami Koi, Koi, Urami Koi</td>
            <td class="text pad" bgcolor="#FFFFFF">v.2 c.37</td>
        </tr>
    </table>
</div>
</body></html>"##;

// ---------------------------------------------------------------------------
// Mangadex
// ---------------------------------------------------------------------------

#[allow(dead_code)]
pub const DEX_FEED_URL: &str = "https://mangadex.org/rss/manga_id/13127";

#[allow(dead_code)]
pub const DEX_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
    <channel>
        <title>Uramikoi, Koi, Uramikoi. - MangaDex RSS</title>
        <link>https://mangadex.org/manga/13127</link>
        <item>
            <title>Uramikoi, Koi, Uramikoi. - Chapter 38</title>
            <link>https://mangadex.org/chapter/37149</link>
            <pubDate>Sat, 03 Mar 2018 12:00:00 +0000</pubDate>
            <description>Group: Some Scans - Uploader: someone - Language: English</description>
        </item>
        <item>
            <title>Uramikoi, Koi, Uramikoi. - Chapter 38</title>
            <link>https://mangadex.org/chapter/37150</link>
            <pubDate>Sat, 03 Mar 2018 13:00:00 +0000</pubDate>
            <description>Group: Altre Scans - Uploader: qualcuno - Language: Italian</description>
        </item>
        <item>
            <title>Uramikoi, Koi, Uramikoi. - Oneshot</title>
            <link>https://mangadex.org/chapter/30001/</link>
            <pubDate>Thursday, 1 Feb 2018, 08:00:00</pubDate>
            <description>Group: Some Scans - Uploader: someone - Language: English</description>
        </item>
    </channel>
</rss>"#;

#[allow(dead_code)]
pub const DEX_CHAPTER_URL: &str = "https://mangadex.org/chapter/37149";

#[allow(dead_code)]
pub const DEX_CHAPTER_PAGE: &str = r#"<html><head>
<script type="text/javascript">
    var chapter_id = 37149;
    var manga_id = 13127;
    var server = 'https://s5.mangadex.org/data/';
    var dataurl = '8a1e4bd5c44f5c4d5c2e';
    var page_array = [
'x1.png','x2.png','x3.png',];
    var prev_chapter_id = 37100;
</script>
</head><body></body></html>"#;

// ---------------------------------------------------------------------------
// Meraki Scans
// ---------------------------------------------------------------------------

#[allow(dead_code)]
pub const MERAKI_FEED_URL: &str = "https://merakiscans.com/manga-rss/senryu-girl";

#[allow(dead_code)]
pub fn meraki_feed(channel_title: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
    <channel>
        <title>{channel_title}</title>
        <link>https://merakiscans.com/senryu-girl/</link>
        <item>
            <title>Senryu Girl Chapter 1.5</title>
            <link>http://www.merakiscans.com/senryu-girl/1.5/</link>
            <pubDate>2018-02-20 08:00:00</pubDate>
        </item>
        <item>
            <title>Senryu Girl Chapter 2</title>
            <link>https://merakiscans.com/senryu-girl/2/</link>
            <pubDate>Sat, 03 Mar 2018 12:00:00 +0000</pubDate>
        </item>
    </channel>
</rss>"#
    )
}

#[allow(dead_code)]
pub const MERAKI_CHAPTER_URL: &str = "https://merakiscans.com/senryu-girl/2";

#[allow(dead_code)]
pub const MERAKI_CHAPTER_PAGE: &str = r#"<html><body>
<div id="longWrap">
    <img src="https://merakiscans.com/wp-content/manga/senryu-girl/2/01.jpg" class="manga_page">
    <img src="https://merakiscans.com/wp-content/manga/senryu-girl/2/02.jpg" class="manga_page">
</div>
</body></html>"#;

// ---------------------------------------------------------------------------
// Helvetica Scans
// ---------------------------------------------------------------------------

#[allow(dead_code)]
pub const HELVETICA_API_URL: &str =
    "https://helveticascans.com/r/api/reader/comic/stub/talentless-nana/format/json";

#[allow(dead_code)]
pub const HELVETICA_COMIC_JSON: &str = r#"{
    "comic": {"id": "3", "name": "Talentless Nana", "stub": "talentless-nana"},
    "chapters": [
        {"chapter": {"language": "en", "volume": "2", "chapter": "11", "subchapter": "0", "name": "", "created": "2018-02-10 12:00:00"}},
        {"chapter": {"language": "en", "volume": "2", "chapter": "12", "subchapter": "5", "name": "Extra", "created": "2018-03-01 09:30:00"}},
        {"chapter": {"language": "en", "volume": 0, "chapter": 13, "subchapter": 0, "name": null, "created": "2018-03-15 18:00:00"}}
    ]
}"#;

#[allow(dead_code)]
pub const HELVETICA_READER_URL: &str =
    "https://helveticascans.com/r/read/talentless-nana/en/2/11/page/1";

#[allow(dead_code)]
pub const HELVETICA_READER_PAGE: &str = r#"<html><body>
<script type="text/javascript">
    var title = 'Talentless Nana';
    var pages = [{"id":"101","chapter_id":"45","filename":"01.png","url":"https:\/\/helveticascans.com\/r\/content\/comics\/talentless-nana\/en_2_11\/01.png","width":"800","height":"1200"},{"id":"102","chapter_id":"45","filename":"02.png","url":"https:\/\/helveticascans.com\/r\/content\/comics\/talentless-nana\/en_2_11\/02.png","width":"800","height":"1150"}];
</script>
</body></html>"#;
