//! Extraction of JSON-like data embedded in reader page scripts.
//!
//! Several readers ship their page list as a script assignment such as
//!
//! ```text
//! var pages = [{'url':'https://img.example.com/1.jpg'},{'url':'...'},];
//! ```
//!
//! which is almost, but not quite, JSON: single quotes and a dangling comma
//! before the closing bracket. [`extract_var`] finds the assignment,
//! repairs the text and parses it.
//!
//! # Examples
//!
//! ```rust
//! use shiori::net::json;
//!
//! let script = "var pages = [{'url':'a'},{'url':'b'},];";
//! let pages = json::extract_var(script, "pages").unwrap();
//! assert_eq!(pages.as_array().map(Vec::len), Some(2));
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

static TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*([\]}])").expect("valid trailing comma regex"));

/// Rewrites script literal text into parseable JSON: single quotes become
/// double quotes and a comma directly before `]` or `}` is dropped.
pub fn normalize(raw: &str) -> String {
    let quoted = raw.trim().replace('\'', "\"");
    TRAILING_COMMA.replace_all(&quoted, "$1").into_owned()
}

/// Finds `var <name> = <value>;` in `body` and returns the value's raw text.
///
/// # Errors
///
/// [`Error::Parse`] if there is no such assignment.
pub fn find_var<'a>(body: &'a str, name: &str) -> Result<&'a str> {
    let pattern = format!(r"(?ms)\bvar\s+{}\s*=\s*(.+?);\s*(?:$|var\b|</script>)", regex::escape(name));
    let re = Regex::new(&pattern).map_err(|e| Error::parse(format!("Bad pattern for '{name}': {e}")))?;

    re.captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::parse(format!("Could not find 'var {name}' in page")))
}

/// Extracts and parses the JSON value assigned to `var <name>` in `body`.
///
/// # Errors
///
/// [`Error::Parse`] if the assignment is missing or its value parses
/// neither as-is nor after [`normalize`].
pub fn extract_var(body: &str, name: &str) -> Result<Value> {
    let raw = find_var(body, name)?;
    serde_json::from_str(raw.trim())
        .or_else(|_| serde_json::from_str(&normalize(raw)))
        .map_err(|e| Error::parse(format!("Could not parse JSON from 'var {name}': {e}")))
}

/// Like [`extract_var`], deserializing into `T`.
pub fn extract_var_as<T>(body: &str, name: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let value = extract_var(body, name)?;
    serde_json::from_value(value)
        .map_err(|e| Error::parse(format!("Unexpected shape for 'var {name}': {e}")))
}

/// Reads `value` as a string, accepting numbers too (`13127` or `"13127"`).
pub fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads `value` as an unsigned integer, accepting numeric strings.
pub fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
