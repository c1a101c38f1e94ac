//! Integration tests for Shiori
//!
//! End-to-end tests through the [`Aggregator`] facade with the default
//! registry wired to canned pages.

use shiori::config::ConfigBuilder;
use shiori::ids;
use shiori::net::{Fetcher, Throttle, Throttled};
use shiori::prelude::*;
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::*;

fn aggregator(fixtures: Arc<FixtureFetcher>) -> Aggregator {
    let config = ConfigBuilder::default()
        .manga_here_interval(Duration::ZERO)
        .build()
        .unwrap();
    Aggregator::new(Sources::with_fetcher(fixtures, &config))
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_default_registry_order() {
        let sources = Sources::from_config(&Config::default());

        assert_eq!(
            sources.list_ids(),
            vec![
                "manga-here",
                "manga-updates",
                "mangadex",
                "mangakakalot",
                "meraki-scans",
                "helvetica-scans",
            ]
        );
    }

    #[tokio::test]
    async fn test_unsupported_urls() {
        let fixtures = FixtureFetcher::new().shared();
        let aggregator = aggregator(fixtures.clone());

        for url in ["banana", "https://www.google.com/", "http://he.lveticascans.com/r/series/x"] {
            let err = aggregator.get_series(url).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedSite, "url: {url}");
            assert!(matches!(err, Error::UnsupportedSite(ref what) if what == url));
        }

        let err = aggregator.get_chapter("https://www.google.com/").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedSite);
        assert_eq!(fixtures.request_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_slug_is_invalid_url() {
        let fixtures = FixtureFetcher::new().shared();
        let aggregator = aggregator(fixtures.clone());

        // Supported site, but no series path
        let err = aggregator.get_series("https://mangakakalot.com/").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUrl);

        // Mangadex chapter URLs do not name their series
        let err = aggregator
            .get_series("https://mangadex.org/chapter/37149")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUrl);

        // A series URL has no chapter slug
        let err = aggregator
            .get_chapter("https://helveticascans.com/r/series/talentless-nana")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUrl);

        assert_eq!(fixtures.request_count(), 0);
    }

    #[tokio::test]
    async fn test_get_series_tags_site() {
        let fixtures = FixtureFetcher::new()
            .with(HELVETICA_API_URL, HELVETICA_COMIC_JSON)
            .with(UPDATES_RELEASES_URL, UPDATES_RELEASES_PAGE)
            .shared();
        let aggregator = aggregator(fixtures);

        let series = aggregator
            .get_series("http://www.helveticascans.com/r/series/talentless-nana/")
            .await
            .unwrap();
        assert_eq!(series.site.id, "helvetica-scans");
        assert_eq!(series.site.name, "Helvetica Scans");
        assert!(series.supports_reading);
        assert_eq!(series.slug, "talentless-nana");
        assert_eq!(series.chapters.as_ref().map(Vec::len), Some(3));

        let series = aggregator.get_series(UPDATES_SERIES_URL).await.unwrap();
        assert_eq!(series.site.id, "manga-updates");
        assert!(!series.supports_reading);
        assert!(series.chapters.is_none());
    }

    #[tokio::test]
    async fn test_series_identity_is_independent_of_url_spelling() {
        let page = kakalot_series_page("Jan-02-2018 10:15:33 AM", &[("42", "01-02 10:00")]);
        let fixtures = FixtureFetcher::new().with(KAKALOT_SERIES_URL, page).shared();
        let aggregator = aggregator(fixtures);

        let a = aggregator
            .get_series("https://www.MangaKakalot.com/manga/gleipnir/")
            .await
            .unwrap();
        let b = aggregator
            .get_series("http://mangakakalot.com//manga/gleipnir#chapters")
            .await
            .unwrap();
        let c = aggregator.get_series(KAKALOT_CHAPTER_URL).await.unwrap();

        assert_eq!(a.id, b.id);
        assert_eq!(a.id, c.id);
        assert_eq!(a.url, KAKALOT_SERIES_URL);
    }

    #[tokio::test]
    async fn test_get_chapter_without_series_slug() {
        let fixtures = FixtureFetcher::new()
            .with(DEX_CHAPTER_URL, DEX_CHAPTER_PAGE)
            .shared();
        let aggregator = aggregator(fixtures);

        let chapter = aggregator
            .get_chapter("https://mangadex.org/chapter/37149/1")
            .await
            .unwrap();

        assert_eq!(chapter.slug, "37149");
        assert_eq!(chapter.pages.len(), 3);
        assert_eq!(chapter.series_id, ids::series_id("https://mangadex.org/manga/13127"));
    }

    #[tokio::test]
    async fn test_get_chapter_through_listing() {
        let fixtures = FixtureFetcher::new()
            .with(MERAKI_FEED_URL, meraki_feed("Senryu Girl - Meraki Scans"))
            .with(MERAKI_CHAPTER_URL, MERAKI_CHAPTER_PAGE)
            .shared();
        let aggregator = aggregator(fixtures);

        let series = aggregator
            .get_series("https://merakiscans.com/senryu-girl/")
            .await
            .unwrap();
        let latest = &series.chapters.as_ref().unwrap()[0];

        let chapter = aggregator.get_chapter(&latest.url).await.unwrap();
        assert_eq!(chapter.id, latest.id);
        assert_eq!(chapter.series_id, series.id);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates() {
        let aggregator = aggregator(FixtureFetcher::new().shared());

        let err = aggregator
            .get_series("https://merakiscans.com/senryu-girl")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert!(matches!(err, Error::Fetch { ref url, status: Some(404), .. } if url == MERAKI_FEED_URL));
    }

    #[test]
    fn test_construct_url() {
        let aggregator = aggregator(FixtureFetcher::new().shared());

        assert_eq!(
            aggregator.construct_url("mangakakalot", Some("gleipnir"), Some("42")).unwrap(),
            KAKALOT_CHAPTER_URL
        );
        assert_eq!(
            aggregator.construct_url("mangadex", Some("13127"), None).unwrap(),
            "https://mangadex.org/manga/13127"
        );
        assert_eq!(
            aggregator.construct_url("banana", Some("x"), None).unwrap_err().kind(),
            ErrorKind::UnsupportedSite
        );
        assert_eq!(
            aggregator.construct_url("manga-updates", Some("15"), Some("1")).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            aggregator.construct_url("meraki-scans", None, None).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn test_every_source_round_trips_its_own_urls() {
        let aggregator = aggregator(FixtureFetcher::new().shared());

        for source in aggregator.sources().iter() {
            let series = source.construct_url(Some("some-series"), None).unwrap();
            assert!(source.supports_url(&series), "{}", source.id());
            assert_eq!(
                aggregator.sources().find_by_supported_url(&series).unwrap().id(),
                source.id()
            );
            assert_eq!(
                source.parse_url(&series).unwrap().series_slug.as_deref(),
                Some("some-series"),
                "{}",
                source.id()
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_serializes_concurrent_callers() {
        let throttle = Throttle::new(Duration::from_millis(500));
        let start = tokio::time::Instant::now();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let throttle = throttle.clone();
            handles.push(tokio::spawn(async move {
                throttle.acquire().await;
                tokio::time::Instant::now()
            }));
        }

        let mut times = Vec::new();
        for handle in handles {
            times.push(handle.await.unwrap());
        }
        times.sort();

        assert_eq!(times[0], start);
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(500));
        }
        assert!(times[3] - start >= Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttled_fetcher_spaces_requests() {
        let fixtures = FixtureFetcher::new()
            .with("https://example.org/a", "a")
            .with("https://example.org/b", "b")
            .shared();
        let fetcher = Throttled::new(fixtures.clone(), Duration::from_secs(2));

        let (a, b) = tokio::join!(
            fetcher.get_text("https://example.org/a"),
            fetcher.get_text("https://example.org/b"),
        );
        assert_eq!(a.unwrap(), "a");
        assert_eq!(b.unwrap(), "b");

        let times = fixtures.request_times();
        assert_eq!(times.len(), 2);
        assert!(times[1] - times[0] >= Duration::from_secs(2));
    }
}
