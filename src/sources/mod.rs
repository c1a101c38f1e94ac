//! Site implementations with conditional compilation support.
//!
//! Every source sits behind its own feature flag, so a build can include
//! only the sites it needs. [`Sources::from_config`](crate::Sources::from_config)
//! registers whichever of them are compiled in.
//!
//! # Feature Flags
//!
//! - `source-manga-here` - MangaHere (throttled, paginated reader)
//! - `source-manga-updates` - MangaUpdates (metadata only, no reading)
//! - `source-mangadex` - Mangadex
//! - `source-mangakakalot` - Mangakakalot
//! - `source-meraki-scans` - Meraki Scans
//! - `source-helvetica-scans` - Helvetica Scans
//! - `all-sources` - all of the above (default)
//!
//! # Examples
//!
//! Build with only Mangadex and Helvetica Scans:
//! ```bash
//! cargo build --no-default-features --features "source-mangadex,source-helvetica-scans"
//! ```

#[cfg(feature = "source-manga-here")]
pub mod manga_here;

#[cfg(feature = "source-manga-updates")]
pub mod manga_updates;

#[cfg(feature = "source-mangadex")]
pub mod mangadex;

#[cfg(feature = "source-mangakakalot")]
pub mod mangakakalot;

#[cfg(feature = "source-meraki-scans")]
pub mod meraki_scans;

#[cfg(feature = "source-helvetica-scans")]
pub mod helvetica_scans;

#[cfg(feature = "source-manga-here")]
pub use manga_here::MangaHereSource;

#[cfg(feature = "source-manga-updates")]
pub use manga_updates::MangaUpdatesSource;

#[cfg(feature = "source-mangadex")]
pub use mangadex::MangadexSource;

#[cfg(feature = "source-mangakakalot")]
pub use mangakakalot::MangakakalotSource;

#[cfg(feature = "source-meraki-scans")]
pub use meraki_scans::MerakiScansSource;

#[cfg(feature = "source-helvetica-scans")]
pub use helvetica_scans::HelveticaScansSource;
