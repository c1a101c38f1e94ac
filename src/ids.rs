//! URL normalization, path matching and identifier derivation.
//!
//! Every id Shiori hands out is a hash of a canonical URL (or of a path tail
//! for pages). Ids are a pure function of their input bytes, so they can be
//! regenerated from a raw URL or from slugs via a source's `construct_url`.
//!
//! # Examples
//!
//! ```rust
//! use shiori::ids;
//!
//! let canonical = ids::normalize_url("HTTP://WWW.Mangadex.org//manga/13127/").unwrap();
//! assert_eq!(canonical, "http://mangadex.org/manga/13127");
//!
//! let params = ids::match_path(&canonical, "/:type(manga|chapter)/:id").unwrap();
//! assert_eq!(params["id"], "13127");
//! ```

use std::collections::HashMap;

use regex::Regex;
use url::Url;

use crate::error::{Error, Result};

/// Joins the parts of a derived id. Not expected inside URLs or slugs.
const ID_SEPARATOR: char = '\u{1f}';

/// Normalizes a URL into its canonical form.
///
/// The host is lower-cased and stripped of a leading `www.`, default ports
/// are dropped, duplicate slashes in the path are collapsed, the fragment is
/// removed and the path never ends with a slash (the root path becomes empty).
///
/// # Errors
///
/// [`Error::MalformedUrl`] if `url` is not an absolute http(s) URL.
///
/// # Examples
///
/// ```rust
/// use shiori::ids::normalize_url;
///
/// assert_eq!(
///     normalize_url("https://www.helveticascans.com:443/r/series/talentless-nana/").unwrap(),
///     "https://helveticascans.com/r/series/talentless-nana",
/// );
/// assert!(normalize_url("banana").is_err());
/// ```
pub fn normalize_url(url: &str) -> Result<String> {
    let parsed = parse_absolute(url)?;
    let host = normalized_host_of(&parsed).ok_or_else(|| Error::malformed_url(url))?;

    let mut canonical = format!("{}://{}", parsed.scheme(), host);
    if let Some(port) = parsed.port() {
        canonical.push_str(&format!(":{port}"));
    }

    let path = collapse_slashes(parsed.path());
    canonical.push_str(path.trim_end_matches('/'));

    if let Some(query) = parsed.query().filter(|q| !q.is_empty()) {
        canonical.push('?');
        canonical.push_str(query);
    }

    Ok(canonical)
}

/// Returns the normalized host of `url` (lower-cased, without `www.`), or
/// `None` when the URL cannot be parsed.
pub fn normalized_host(url: &str) -> Option<String> {
    parse_absolute(url).ok().as_ref().and_then(normalized_host_of)
}

/// Returns true when both URLs have the same normalized host.
///
/// # Examples
///
/// ```rust
/// use shiori::ids::compare_domain;
///
/// assert!(compare_domain("https://www.mangakakalot.com/manga/x", "http://mangakakalot.com"));
/// assert!(!compare_domain("http://he.lveticascans.com", "http://helveticascans.com"));
/// assert!(!compare_domain("banana", "http://helveticascans.com"));
/// ```
pub fn compare_domain(a: &str, b: &str) -> bool {
    match (normalized_host(a), normalized_host(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Non-cryptographic string hash rendered in base 10.
///
/// This is the djb2-xor variant (`h = h * 33 ^ c`, seeded with 5381) walked
/// over the UTF-16 code units of `input` from the last to the first, with
/// 32-bit wrapping arithmetic. It is stable across runs and platforms.
///
/// # Examples
///
/// ```rust
/// use shiori::ids::hash;
///
/// assert_eq!(hash(""), "5381");
/// assert_eq!(hash("a"), "177604");
/// assert_ne!(hash("ab"), hash("ba"));
/// ```
pub fn hash(input: &str) -> String {
    let units: Vec<u16> = input.encode_utf16().collect();
    let value = units
        .iter()
        .rev()
        .fold(5381u32, |h, &unit| h.wrapping_mul(33) ^ u32::from(unit));
    value.to_string()
}

/// Joins `parts` with a separator that does not occur in URLs or slugs, then
/// hashes the result.
pub fn derive_id(parts: &[&str]) -> String {
    let mut joined = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            joined.push(ID_SEPARATOR);
        }
        joined.push_str(part);
    }
    hash(&joined)
}

/// Id of a series, from its canonical URL.
pub fn series_id(canonical_url: &str) -> String {
    derive_id(&[canonical_url])
}

/// Id of a chapter, from its canonical URL.
pub fn chapter_id(canonical_url: &str) -> String {
    derive_id(&[canonical_url])
}

/// Id of a page, from the last segment of its image URL's path.
///
/// Image hosts rotate between mirrors, so only the tail is used.
pub fn page_id(image_url: &str) -> String {
    derive_id(&[path_tail(image_url)])
}

/// Returns the last non-empty segment of a URL's path, ignoring any query
/// string or fragment. Works on relative and protocol-relative URLs too.
///
/// # Examples
///
/// ```rust
/// use shiori::ids::path_tail;
///
/// assert_eq!(path_tail("https://s5.mangadex.org/data/abc/x1.png?v=2"), "x1.png");
/// assert_eq!(path_tail("//cdn.example.com/a/b/"), "b");
/// ```
pub fn path_tail(url: &str) -> &str {
    let end = url.find(|c: char| c == '?' || c == '#').unwrap_or(url.len());
    url[..end]
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("")
}

/// Matches the path of `url` against a route-style `pattern`.
///
/// Compiles the pattern on every call; sources keep a [`PathPattern`] in a
/// static instead. Returns `None` when the URL is unparseable, the pattern is
/// invalid or the path does not match.
pub fn match_path(url: &str, pattern: &str) -> Option<HashMap<String, String>> {
    PathPattern::new(pattern).ok()?.matches(url)
}

/// A compiled route pattern.
///
/// Patterns are `/`-separated. A segment is either literal text or a named
/// parameter `:name`, optionally followed by a custom regex in parentheses
/// and a `?` marking the whole segment optional:
///
/// ```text
/// /r/:type(read|series)/:seriesSlug/:chapterSlug([a-z]{2}/\d+/\d+)?
/// ```
///
/// A parameter without a custom regex matches one path segment. Custom
/// regexes may span segments but must not contain capture groups.
#[derive(Debug, Clone)]
pub struct PathPattern {
    pattern: String,
    regex: Regex,
    names: Vec<String>,
}

impl PathPattern {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the pattern is not well formed.
    pub fn new(pattern: &str) -> Result<Self> {
        let invalid = |why: &str| Error::invalid_argument(format!("path pattern '{pattern}': {why}"));

        let mut source = String::from("^");
        let mut names = Vec::new();
        let mut rest = pattern;

        while !rest.is_empty() {
            rest = rest
                .strip_prefix('/')
                .ok_or_else(|| invalid("segments must start with '/'"))?;

            let Some(param) = rest.strip_prefix(':') else {
                let end = rest.find('/').unwrap_or(rest.len());
                source.push('/');
                source.push_str(&regex::escape(&rest[..end]));
                rest = &rest[end..];
                continue;
            };

            let name_len = param
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(param.len());
            if name_len == 0 {
                return Err(invalid("empty parameter name"));
            }
            let name = &param[..name_len];
            rest = &param[name_len..];

            let mut segment_regex = "[^/]+?";
            if rest.starts_with('(') {
                let close = closing_paren(rest).ok_or_else(|| invalid("unbalanced parenthesis"))?;
                segment_regex = &rest[1..close];
                rest = &rest[close + 1..];
            }

            let optional = rest.starts_with('?');
            if optional {
                rest = &rest[1..];
            }

            let group = format!("/(?P<{name}>{segment_regex})");
            if optional {
                source.push_str(&format!("(?:{group})?"));
            } else {
                source.push_str(&group);
            }
            names.push(name.to_string());
        }

        source.push_str("/?$");

        let regex = Regex::new(&source).map_err(|e| invalid(&e.to_string()))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            names,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Matches the normalized path of `url`, returning the captured
    /// (percent-decoded) parameters. Optional parameters that did not
    /// participate in the match are absent from the map.
    pub fn matches(&self, url: &str) -> Option<HashMap<String, String>> {
        let canonical = normalize_url(url).ok()?;
        let parsed = Url::parse(&canonical).ok()?;
        // A trailing slash lets `/:series/:chapter?` match with or without
        // the optional segment.
        let path = format!("{}/", parsed.path().trim_end_matches('/'));

        let captures = self.regex.captures(&path)?;
        let params = self
            .names
            .iter()
            .filter_map(|name| {
                let value = captures.name(name)?.as_str();
                let decoded = urlencoding::decode(value)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| value.to_string());
                Some((name.clone(), decoded))
            })
            .collect();

        Some(params)
    }
}

fn closing_paren(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_absolute(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim()).map_err(|_| Error::malformed_url(url))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
        _ => Err(Error::malformed_url(url)),
    }
}

fn normalized_host_of(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    Some(host.trim_end_matches('.').to_string())
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}
