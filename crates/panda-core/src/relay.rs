//! Fetch relay: a newline-delimited JSON request/response protocol that
//! fetches a URL on behalf of a caller and returns the raw bytes base64-encoded.
//!
//! Used by front-ends that cannot reach the syllabus catalogue themselves.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::fetch::Fetch;

pub const FETCH_ACTION: &str = "fetchKulasis";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRequest {
    pub action: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayResponse {
    pub fn ok(data: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

pub fn handle(fetcher: &dyn Fetch, req: &RelayRequest) -> RelayResponse {
    if req.action != FETCH_ACTION {
        return RelayResponse::err(format!("unknown action: {}", req.action));
    }
    let Some(url) = req.url.as_deref() else {
        return RelayResponse::err("missing url");
    };
    match fetcher.get(url) {
        Ok(body) => RelayResponse::ok(STANDARD.encode(&body.bytes)),
        Err(e) => {
            tracing::warn!(url, "relay fetch failed: {}", e);
            RelayResponse::err(e.to_string())
        }
    }
}

/// Handles one protocol line; malformed JSON yields an error response.
pub fn handle_line(fetcher: &dyn Fetch, line: &str) -> RelayResponse {
    match serde_json::from_str::<RelayRequest>(line) {
        Ok(req) => handle(fetcher, &req),
        Err(e) => RelayResponse::err(format!("bad request: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;

    #[test]
    fn fetch_returns_base64_bytes() {
        let fetcher = StaticFetcher::new().bytes("https://k.example/entry", &[0x82, 0xa0, 0x41]);
        let resp = handle_line(
            &fetcher,
            r#"{"action":"fetchKulasis","url":"https://k.example/entry"}"#,
        );
        assert_eq!(resp, RelayResponse::ok("gqBB".into()));
        assert_eq!(
            serde_json::to_string(&resp).unwrap(),
            r#"{"success":true,"data":"gqBB"}"#
        );
    }

    #[test]
    fn errors_are_responses() {
        let fetcher = StaticFetcher::new().status("https://k.example/x", 503);
        let resp = handle_line(&fetcher, r#"{"action":"fetchKulasis","url":"https://k.example/x"}"#);
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("HTTP 503"));

        assert!(!handle_line(&fetcher, r#"{"action":"other"}"#).success);
        assert!(!handle_line(&fetcher, r#"{"action":"fetchKulasis"}"#).success);
        assert!(!handle_line(&fetcher, "not json").success);
    }
}
