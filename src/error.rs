use ::scraper::error::SelectorErrorKind;
use std::time::Duration;

/// All errors that can occur while rendering pages or writing pipeline output.
///
/// Extraction itself never fails: heuristic misses become `Unknown` records,
/// so these variants only come out of the session and sink layers.
#[derive(thiserror::Error, Debug)]
pub enum VlrError {
    /// HTTP request failed (network, DNS, TLS, timeout, etc.).
    #[error("http request failed for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Server returned a non-success HTTP status code.
    #[error("unexpected status {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Failed to read the response body as text.
    #[error("failed to read response body from {url}: {source}")]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },

    /// A CSS selector string could not be parsed.
    #[error("invalid CSS selector: {0}")]
    Selector(String),

    /// A page operation did not finish within its time bound.
    #[error("{operation} timed out after {limit:?}")]
    Timeout {
        operation: &'static str,
        limit: Duration,
    },

    /// An expected HTML element was not found on the page.
    #[error("expected element not found: {context}")]
    ElementNotFound { context: &'static str },

    /// An in-page interaction (e.g. switching map tabs) could not be performed.
    #[error("interaction failed: {0}")]
    Interaction(String),

    /// A worker could not obtain a page session.
    #[error("could not start page session: {0}")]
    SessionUnavailable(String),

    /// No page has been opened in the session yet.
    #[error("no page loaded")]
    NoPage,

    /// Writing an output file failed.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Serializing a record set failed.
    #[error("csv error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    /// The run was cancelled before this unit of work finished.
    #[error("cancelled")]
    Cancelled,
}

impl<'a> From<SelectorErrorKind<'a>> for VlrError {
    fn from(err: SelectorErrorKind<'a>) -> Self {
        VlrError::Selector(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VlrError>;
