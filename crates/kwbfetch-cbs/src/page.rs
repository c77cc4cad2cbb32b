//! OData page model and server-driven pagination
//!
//! Each response carries the page's records in `value` and, while more
//! data remains, an absolute continuation URL in `@odata.nextLink`.
//! The next link is an opaque token: it is followed verbatim, never
//! parsed or reconstructed.

use serde::Deserialize;

use crate::error::DownloadError;

/// One flat observation record; `preserve_order` on serde_json keeps
/// the field order the server sent, which defines the CSV header.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// One page of an Observations collection
#[derive(Debug, Deserialize)]
pub struct Page {
    /// Records on this page; absent decodes as empty
    #[serde(default)]
    pub value: Vec<Record>,
    /// Continuation URL; absent or null means this is the last page
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

impl Page {
    /// Parse a page from a response body, attributing failures to `url`.
    pub fn from_json(body: &str, url: &str) -> Result<Self, DownloadError> {
        serde_json::from_str(body).map_err(|source| DownloadError::Json {
            url: url.to_string(),
            source,
        })
    }
}

/// Lazy iterator over the pages of an Observations collection.
///
/// Each `next()` issues one GET for the current URL and advances to the
/// page's continuation URL. The iterator fuses after the last page and
/// after the first error; restarting means constructing a new `Pager`
/// with the original URL.
pub struct Pager {
    next_url: Option<String>,
}

impl Pager {
    pub fn new(initial_url: impl Into<String>) -> Self {
        Self {
            next_url: Some(initial_url.into()),
        }
    }
}

impl Iterator for Pager {
    type Item = Result<Page, DownloadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let url = self.next_url.take()?;
        let body = match kwbfetch_core::get_text(&url) {
            Ok(body) => body,
            Err(e) => return Some(Err(e.into())),
        };
        match Page::from_json(&body, &url) {
            Ok(page) => {
                self.next_url = page.next_link.clone();
                Some(Ok(page))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
