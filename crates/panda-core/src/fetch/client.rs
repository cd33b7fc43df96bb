//! libcurl-backed [`Fetch`] implementation.

use std::str;
use std::time::Duration;

use super::headers::parse_headers;
use super::{Fetch, FetchError, FetchedBody};
use crate::config::PandaConfig;

/// Per-request settings shared by every handle a fetcher creates.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub user_agent: String,
    /// Raw `Cookie` header value (portal session).
    pub cookie: Option<String>,
    /// Host the cookie belongs to; other hosts never see it. `None` sends it everywhere.
    pub cookie_host: Option<String>,
    /// Portal origin that portal-relative page URLs are resolved against.
    pub base_url: Option<String>,
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl FetchOptions {
    pub fn from_config(cfg: &PandaConfig) -> Self {
        Self {
            user_agent: cfg.user_agent.clone(),
            cookie: cfg.cookie.clone(),
            cookie_host: url::Url::parse(&cfg.portal_base_url)
                .ok()
                .and_then(|u| u.host_str().map(|h| h.to_string())),
            base_url: Some(cfg.portal_base_url.clone()),
            connect_timeout: cfg.connect_timeout(),
            timeout: cfg.request_timeout(),
        }
    }
}

/// Blocking GET over a fresh `curl::easy::Easy` per request. Safe to share
/// between download workers; call from `spawn_blocking` in async code.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    options: FetchOptions,
}

impl CurlFetcher {
    pub fn new(options: FetchOptions) -> Self {
        Self { options }
    }
}

impl Fetch for CurlFetcher {
    fn base_url(&self) -> Option<&str> {
        self.options.base_url.as_deref()
    }

    fn get(&self, url: &str) -> Result<FetchedBody, FetchError> {
        let parsed = url::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        let mut header_lines: Vec<String> = Vec::new();
        let mut bytes: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.options.connect_timeout)?;
        easy.timeout(self.options.timeout)?;
        easy.useragent(&self.options.user_agent)?;
        if let Some(cookie) = &self.options.cookie {
            let same_host = match &self.options.cookie_host {
                Some(host) => parsed.host_str() == Some(host.as_str()),
                None => true,
            };
            if same_host {
                easy.cookie(cookie)?;
            }
        }

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                bytes.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        if !(200..300).contains(&status) {
            return Err(FetchError::Http(status));
        }

        let headers = parse_headers(&header_lines);
        tracing::debug!(url, status, len = bytes.len(), declared = ?headers.content_length, "GET ok");
        Ok(FetchedBody {
            status,
            content_type: headers.content_type,
            content_disposition: headers.content_disposition,
            bytes,
        })
    }
}
