//! Error types and result handling for Shiori operations.
//!
//! Every fallible operation returns a [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. The error set is closed: callers (a REST
//! layer, a bookmark store) switch on [`Error::kind`] rather than on messages.
//!
//! # Error Categories
//!
//! - **Invalid URL**: the URL is unparseable or matches no known path shape
//! - **Unsupported Site**: no registered source claims the URL or site id
//! - **Unsupported Operation**: the source exists but lacks the capability
//! - **Fetch**: transport failure or non-2xx response, with the failing URL
//! - **Parse**: a fetched page is missing the markup/script/JSON we expected
//!
//! # Examples
//!
//! ```rust
//! use shiori::error::{Error, ErrorKind};
//!
//! let error = Error::unsupported_site("http://google.com");
//! assert_eq!(error.kind(), ErrorKind::UnsupportedSite);
//! ```

use thiserror::Error;

/// Type alias for Results with Shiori errors.
///
/// # Examples
///
/// ```rust
/// use shiori::{Error, Result};
///
/// fn example_with_error() -> Result<()> {
///     Err(Error::parse("Missing chapter list"))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all Shiori operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The URL is recognised by a source but does not match any of its
    /// series/chapter path shapes, or a required slug is absent.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The input is not a parseable absolute URL.
    #[error("Malformed URL '{url}'")]
    MalformedUrl { url: String },

    /// No registered source claims the given URL or site id.
    #[error("Unsupported site: {0}")]
    UnsupportedSite(String),

    /// The source is known but does not provide the requested capability.
    ///
    /// Raised before any network request is made.
    #[error("Source '{site}' does not support {operation}")]
    UnsupportedOperation {
        site: String,
        operation: &'static str,
    },

    /// A caller passed arguments that cannot form a valid request, e.g.
    /// constructing a URL with neither a series nor a chapter slug.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport failure or non-success HTTP status for `url`.
    ///
    /// `status` is set when the server answered; `source` carries the
    /// underlying client error when it did not.
    #[error("Failed to fetch '{url}' (status: {status:?})")]
    Fetch {
        url: String,
        status: Option<u16>,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Expected page structure (markup, embedded script, JSON or XML) was
    /// absent or malformed in an otherwise successful response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Tag identifying the category of an [`enum@Error`].
///
/// [`Error::MalformedUrl`] reports [`ErrorKind::InvalidUrl`]: both mean the
/// caller handed us a URL we cannot work with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidUrl,
    UnsupportedSite,
    UnsupportedOperation,
    InvalidArgument,
    Fetch,
    Parse,
}

impl Error {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidUrl { .. } | Error::MalformedUrl { .. } => ErrorKind::InvalidUrl,
            Error::UnsupportedSite(_) => ErrorKind::UnsupportedSite,
            Error::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::Fetch { .. } => ErrorKind::Fetch,
            Error::Parse(_) => ErrorKind::Parse,
        }
    }

    /// Creates a parse error with the given message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shiori::Error;
    ///
    /// let error = Error::parse("Could not find 'var pages' in page");
    /// ```
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Creates an invalid URL error for `url` with a short reason.
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed_url(url: impl Into<String>) -> Self {
        Error::MalformedUrl { url: url.into() }
    }

    /// Creates an unsupported site error naming the URL or site id that
    /// could not be resolved.
    pub fn unsupported_site(what: impl Into<String>) -> Self {
        Error::UnsupportedSite(what.into())
    }

    /// Creates an unsupported operation error for a source.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shiori::error::{Error, ErrorKind};
    ///
    /// let error = Error::unsupported_operation("manga-updates", "reading");
    /// assert_eq!(error.kind(), ErrorKind::UnsupportedOperation);
    /// ```
    pub fn unsupported_operation(site: impl Into<String>, operation: &'static str) -> Self {
        Error::UnsupportedOperation {
            site: site.into(),
            operation,
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Creates a fetch error for a response with a non-success status.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Error::Fetch {
            url: url.into(),
            status: Some(status),
            source: None,
        }
    }

    /// Creates a fetch error wrapping a transport failure.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Error::Fetch {
            url: url.into(),
            status: source.status().map(|s| s.as_u16()),
            source: Some(source),
        }
    }
}
