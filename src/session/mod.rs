//! The rendering layer the extractors read pages through.
//!
//! Extraction only ever sees a [`PageSession`]: the visible text of the
//! current page state, its raw markup, its title, element snapshots, and an
//! `activate` interaction that switches in-page views (map tabs).

pub mod http;
pub(crate) mod render;

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, VlrError};

pub use http::{HttpSession, HttpSessionFactory};

/// A snapshot of one rendered element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageElement {
    pub tag: String,
    /// Visible text, one rendered line per `\n`.
    pub text: String,
    pub attributes: BTreeMap<String, String>,
    /// `href`s of descendant links, in document order.
    pub descendant_links: Vec<String>,
}

impl PageElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// The element's own `href` when it is a link, else its first descendant link.
    pub fn link(&self) -> Option<&str> {
        if self.tag.eq_ignore_ascii_case("a") {
            if let Some(href) = self.attr("href").filter(|h| !h.is_empty()) {
                return Some(href);
            }
        }
        self.descendant_links
            .iter()
            .map(String::as_str)
            .find(|h| !h.is_empty())
    }
}

/// A stateful browsing session holding one loaded page at a time.
pub trait PageSession: Send {
    /// Navigate to `url` and wait until its content is available.
    fn open(&mut self, url: &str) -> impl Future<Output = Result<()>> + Send;

    /// Visible text of the current page state.
    fn body_text(&self) -> Result<String>;

    /// Raw markup of the current page, including content hidden from the text render.
    fn page_source(&self) -> Result<String>;

    fn title(&self) -> Result<String>;

    /// Snapshots of every element matching the CSS `selector`, in document order.
    fn elements(&self, selector: &str) -> Result<Vec<PageElement>>;

    /// Interact with an element (e.g. click a map tab), changing the visible content.
    fn activate(&mut self, element: &PageElement) -> impl Future<Output = Result<()>> + Send;
}

/// Creates one independent session per worker.
pub trait SessionFactory: Send + Sync {
    type Session: PageSession + 'static;

    fn create(&self) -> Result<Self::Session>;
}

/// Wraps a session so that no page load or interaction can hang the run.
pub struct TimedSession<S> {
    inner: S,
    limit: Duration,
}

impl<S: PageSession> TimedSession<S> {
    pub fn new(inner: S, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

impl<S: PageSession> PageSession for TimedSession<S> {
    async fn open(&mut self, url: &str) -> Result<()> {
        let limit = self.limit;
        match tokio::time::timeout(limit, self.inner.open(url)).await {
            Ok(result) => result,
            Err(_) => {
                debug!(url, ?limit, "page load timed out");
                Err(VlrError::Timeout {
                    operation: "page load",
                    limit,
                })
            }
        }
    }

    fn body_text(&self) -> Result<String> {
        self.inner.body_text()
    }

    fn page_source(&self) -> Result<String> {
        self.inner.page_source()
    }

    fn title(&self) -> Result<String> {
        self.inner.title()
    }

    fn elements(&self, selector: &str) -> Result<Vec<PageElement>> {
        self.inner.elements(selector)
    }

    async fn activate(&mut self, element: &PageElement) -> Result<()> {
        let limit = self.limit;
        tokio::time::timeout(limit, self.inner.activate(element))
            .await
            .map_err(|_| VlrError::Timeout {
                operation: "interaction",
                limit,
            })?
    }
}
