//! Parse HTTP response header lines into the metadata a fetch keeps.

/// Header values kept from a response. With redirects followed, libcurl
/// reports the headers of every hop; only the final response counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResponseHeaders {
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub content_length: Option<u64>,
}

/// Parse collected header lines. A status line (`HTTP/...`) starts a new
/// response and discards values collected from earlier hops.
pub(crate) fn parse_headers(lines: &[String]) -> ResponseHeaders {
    let mut out = ResponseHeaders::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            out = ResponseHeaders::default();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-type") {
                out.content_type = Some(value.to_string());
            } else if name.eq_ignore_ascii_case("content-disposition") {
                out.content_disposition = Some(value.to_string());
            } else if name.eq_ignore_ascii_case("content-length") {
                out.content_length = value.parse::<u64>().ok();
            }
        }
    }

    out
}

/// Extracts the `charset` parameter of a `Content-Type` value.
pub(crate) fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"'))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_headers_type_and_disposition() {
        let h = parse_headers(&lines(&[
            "HTTP/1.1 200 OK",
            "Content-Type: application/pdf",
            "content-disposition: attachment; filename=\"week1.pdf\"",
            "Content-Length: 2048",
        ]));
        assert_eq!(h.content_type.as_deref(), Some("application/pdf"));
        assert!(h.content_disposition.as_deref().unwrap().contains("week1.pdf"));
        assert_eq!(h.content_length, Some(2048));
    }

    #[test]
    fn parse_headers_keeps_only_final_hop() {
        let h = parse_headers(&lines(&[
            "HTTP/1.1 302 Found",
            "Content-Type: text/html",
            "Location: /access/content/x.pdf",
            "",
            "HTTP/1.1 200 OK",
            "Content-Length: 10",
        ]));
        assert!(h.content_type.is_none());
        assert_eq!(h.content_length, Some(10));
    }

    #[test]
    fn charset_param_variants() {
        assert_eq!(charset_param("text/html; charset=Shift_JIS"), Some("Shift_JIS"));
        assert_eq!(charset_param("text/html;CHARSET=\"utf-8\""), Some("utf-8"));
        assert_eq!(charset_param("text/html"), None);
    }
}
