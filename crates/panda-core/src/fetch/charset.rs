//! Body decoding: declared charset, then `<meta>` sniffing, then a caller default.

use encoding_rs::Encoding;

use super::headers::charset_param;

const SNIFF_LEN: usize = 1024;

/// Decodes `bytes` to text. A BOM wins over everything; then the
/// `Content-Type` charset; then a `charset=` found in the first kilobyte
/// (`<meta charset>` / `http-equiv`); then `default`.
pub(crate) fn decode(
    bytes: &[u8],
    content_type: Option<&str>,
    default: &'static Encoding,
) -> String {
    let encoding = content_type
        .and_then(charset_param)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| sniff_meta_charset(bytes))
        .unwrap_or(default);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    let start = head.find("charset=")? + "charset=".len();
    let label: String = head[start..]
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
        .collect();
    Encoding::for_label(label.as_bytes())
}
