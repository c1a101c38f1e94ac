//! Minimal RSS 2.0 model for series feeds.
//!
//! Only the fields sources read are modelled; unknown elements are ignored.
//!
//! # Examples
//!
//! ```rust
//! use shiori::net::rss;
//!
//! let feed = rss::parse(r#"<?xml version="1.0"?>
//!     <rss version="2.0"><channel>
//!         <title>Senryu Girl - Meraki Scans</title>
//!         <item>
//!             <title>Senryu Girl Chapter 2</title>
//!             <link>https://merakiscans.com/senryu-girl/2/</link>
//!             <pubDate>Sat, 03 Mar 2018 12:00:00 +0000</pubDate>
//!         </item>
//!     </channel></rss>"#).unwrap();
//!
//! assert_eq!(feed.title, "Senryu Girl - Meraki Scans");
//! assert_eq!(feed.items.len(), 1);
//! ```

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct Document {
    channel: Channel,
}

/// The `<channel>` of a feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub title: String,

    #[serde(rename = "item", default)]
    pub items: Vec<Item>,
}

/// One `<item>` of a feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub link: String,

    #[serde(rename = "pubDate", default)]
    pub pub_date: String,

    #[serde(default)]
    pub description: String,
}

/// Parses an RSS document and returns its channel.
///
/// # Errors
///
/// [`Error::Parse`] if the text is not XML or has no `<channel>`.
pub fn parse(xml: &str) -> Result<Channel> {
    quick_xml::de::from_str::<Document>(xml)
        .map(|doc| doc.channel)
        .map_err(|e| Error::parse(format!("Invalid RSS feed: {e}")))
}
