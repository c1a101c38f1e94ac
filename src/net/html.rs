//! HTML querying utilities for source pages.
//!
//! Thin wrappers over the `scraper` crate's CSS selectors, plus
//! [`parse_items`], which parses repeated row markup (chapter lists) in
//! parallel with `rayon`.
//!
//! # Examples
//!
//! ```rust
//! use shiori::net::html;
//!
//! let document = html::parse(r#"
//!     <ul class="manga-info-text">
//!         <li><h1>Gleipnir</h1></li>
//!     </ul>
//!     <div id="vungdoc"><img src="https://img.example.com/1.jpg"></div>
//! "#);
//!
//! assert_eq!(html::select_text(&document, "ul.manga-info-text h1").as_deref(), Some("Gleipnir"));
//! assert_eq!(html::select_all_attr(&document, "#vungdoc img", "src").len(), 1);
//! ```

use rayon::prelude::*;
use scraper::{ElementRef, Html, Selector};

use crate::error::{Error, Result};

/// Parses an HTML document from a string.
pub fn parse(html: &str) -> Html {
    Html::parse_document(html)
}

/// Returns the trimmed text of the first element matching `selector`.
///
/// `None` if nothing matches or the selector is invalid.
pub fn select_text(html: &Html, selector: &str) -> Option<String> {
    Selector::parse(selector).ok().and_then(|sel| {
        html.select(&sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    })
}

/// Like [`select_text`], but a missing element is a [`Error::Parse`] naming
/// the selector.
pub fn require_text(html: &Html, selector: &str) -> Result<String> {
    select_text(html, selector)
        .ok_or_else(|| Error::parse(format!("No element matches '{selector}'")))
}

/// Returns the value of `attr` on the first element matching `selector`.
pub fn select_attr(html: &Html, selector: &str, attr: &str) -> Option<String> {
    Selector::parse(selector).ok().and_then(|sel| {
        html.select(&sel)
            .next()
            .and_then(|el| el.value().attr(attr).map(|v| v.trim().to_string()))
    })
}

/// Like [`select_attr`], but a missing element or attribute is a
/// [`Error::Parse`].
pub fn require_attr(html: &Html, selector: &str, attr: &str) -> Result<String> {
    select_attr(html, selector, attr)
        .ok_or_else(|| Error::parse(format!("No '{attr}' on element matching '{selector}'")))
}

/// Returns the trimmed text of every element matching `selector`.
pub fn select_all_text(html: &Html, selector: &str) -> Vec<String> {
    Selector::parse(selector)
        .ok()
        .map(|sel| {
            html.select(&sel)
                .map(|el| el.text().collect::<String>().trim().to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Returns `attr` of every element matching `selector`, skipping elements
/// without it.
pub fn select_all_attr(html: &Html, selector: &str, attr: &str) -> Vec<String> {
    Selector::parse(selector)
        .ok()
        .map(|sel| {
            html.select(&sel)
                .filter_map(|el| el.value().attr(attr).map(|v| v.trim().to_string()))
                .collect()
        })
        .unwrap_or_default()
}

/// Returns the trimmed text of the first descendant of `element` matching
/// `selector`.
pub fn element_text(element: ElementRef<'_>, selector: &str) -> Option<String> {
    Selector::parse(selector).ok().and_then(|sel| {
        element
            .select(&sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    })
}

/// Returns `attr` of the first descendant of `element` matching `selector`.
pub fn element_attr(element: ElementRef<'_>, selector: &str, attr: &str) -> Option<String> {
    Selector::parse(selector).ok().and_then(|sel| {
        element
            .select(&sel)
            .next()
            .and_then(|el| el.value().attr(attr).map(|v| v.trim().to_string()))
    })
}

/// Parses every element matching `selector` with `parser`, in parallel.
///
/// Matching elements are serialized to HTML fragments so they can be handed
/// to rayon's workers; results come back in document order. The parser sees
/// the fragment's root element, so it should query descendants with
/// [`element_text`]/[`element_attr`].
///
/// # Errors
///
/// The first error returned by `parser`.
///
/// # Examples
///
/// ```rust
/// use shiori::net::html;
///
/// let document = html::parse(r#"
///     <div class="row"><a href="/c/1">One</a></div>
///     <div class="row"><a href="/c/2">Two</a></div>
/// "#);
///
/// let rows = html::parse_items(&document, ".row", |row| {
///     html::element_attr(row, "a", "href").ok_or_else(|| shiori::Error::parse("no link"))
/// })
/// .unwrap();
/// assert_eq!(rows, vec!["/c/1", "/c/2"]);
/// ```
pub fn parse_items<T, F>(html: &Html, selector: &str, parser: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(ElementRef<'_>) -> Result<T> + Sync,
{
    let sel = Selector::parse(selector)
        .map_err(|e| Error::parse(format!("Invalid selector '{selector}': {e}")))?;

    let fragments: Vec<String> = html.select(&sel).map(|el| el.html()).collect();

    fragments
        .into_par_iter()
        .map(|fragment| {
            let doc = Html::parse_fragment(&fragment);
            parser(doc.root_element())
        })
        .collect()
}
