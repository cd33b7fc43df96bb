//! Document fetcher: HTTP GET plus HTML parsing.
//!
//! Every scraper and the WebDAV crawler go through the [`Fetch`] trait so a
//! test can swap libcurl for canned responses. [`fetch_document`] is the
//! "never throws" boundary: any transport, status or URL failure comes back as
//! `None`, and callers skip that branch.

mod charset;
mod client;
mod headers;
#[cfg(test)]
pub(crate) mod testing;

use encoding_rs::{Encoding, UTF_8};
use scraper::{ElementRef, Html, Selector};
use url::Url;

pub use self::client::{CurlFetcher, FetchOptions};

/// Error from a single GET.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("transfer failed: {0}")]
    Transport(#[from] curl::Error),
    #[error("HTTP {0}")]
    Http(u32),
}

/// Body and metadata of a successful (2xx) response.
#[derive(Debug, Clone, Default)]
pub struct FetchedBody {
    pub status: u32,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub bytes: Vec<u8>,
}

impl FetchedBody {
    /// Body as text; undeclared charsets are read as UTF-8.
    pub fn text(&self) -> String {
        self.text_or(UTF_8)
    }

    /// Body as text, using `default` when neither the headers nor the page declare a charset.
    pub fn text_or(&self, default: &'static Encoding) -> String {
        charset::decode(&self.bytes, self.content_type.as_deref(), default)
    }
}

/// Blocking HTTP GET. Implementations must be shareable across the download workers.
pub trait Fetch: Send + Sync {
    fn get(&self, url: &str) -> Result<FetchedBody, FetchError>;

    /// Base for portal-relative URLs (`/portal/site/...`); `None` accepts absolute URLs only.
    fn base_url(&self) -> Option<&str> {
        None
    }
}

/// A parsed HTML page and the URL it was fetched from.
pub struct Document {
    html: Html,
    url: Url,
}

impl Document {
    pub fn parse(text: &str, url: Url) -> Self {
        Self {
            html: Html::parse_document(text),
            url,
        }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Resolves an `href` found in this page to an absolute URL.
    pub fn resolve(&self, href: &str) -> Option<Url> {
        self.url.join(href.trim()).ok()
    }

    /// All elements matching `css`; empty when the selector does not parse.
    pub fn select_all<'a>(&'a self, css: &str) -> Vec<ElementRef<'a>> {
        let Some(sel) = selector(css) else {
            return Vec::new();
        };
        let found: Vec<ElementRef<'a>> = self.html.select(&sel).collect();
        found
    }

    /// First element matching `css`.
    pub fn select_first<'a>(&'a self, css: &str) -> Option<ElementRef<'a>> {
        let sel = selector(css)?;
        let first = self.html.select(&sel).next();
        first
    }
}

/// Compiles a CSS selector, logging (not failing) on a bad one from config.
pub fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            tracing::warn!(selector = css, "invalid CSS selector: {:?}", e);
            None
        }
    }
}

/// Collapsed, trimmed text content of an element (like `innerText` for simple markup).
pub fn element_text(el: &ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolves `url` against `base` when it is portal-relative; absolute URLs pass through.
pub fn resolve_url(base: &str, url: &str) -> Option<Url> {
    match Url::parse(url) {
        Ok(u) => Some(u),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(base).ok()?.join(url).ok(),
        Err(_) => None,
    }
}

/// Fetches and parses a page. Returns `None` on any failure; the caller
/// treats that as "skip this branch", never as fatal.
pub fn fetch_document(fetcher: &dyn Fetch, url: &str) -> Option<Document> {
    let (target, parsed) = match Url::parse(url) {
        Ok(u) => (url.to_string(), u),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let Some(u) = fetcher.base_url().and_then(|base| resolve_url(base, url)) else {
                tracing::warn!(url, "cannot fetch page: relative URL without a portal base");
                return None;
            };
            (u.to_string(), u)
        }
        Err(e) => {
            tracing::warn!(url, "cannot fetch page: {}", e);
            return None;
        }
    };
    match fetcher.get(&target) {
        Ok(body) => Some(Document::parse(&body.text(), parsed)),
        Err(e) => {
            tracing::warn!(url = %target, "fetch failed: {}", e);
            None
        }
    }
}
