//! Filename and archive-path sanitization.

/// Characters not allowed in a downloaded archive's filename.
const ILLEGAL: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replaces each run of `<>:"/\|?*` with a single `_` and trims surrounding
/// whitespace. Returns an empty string for an all-whitespace name.
pub fn sanitize_site_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;

    for c in name.trim().chars() {
        if ILLEGAL.contains(&c) {
            if !in_run {
                out.push('_');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }

    out
}

/// Normalizes a relative path for use as an archive entry name.
///
/// - `\` is treated as a separator
/// - empty, `.` and `..` segments are dropped, so no entry escapes its root
/// - control characters are removed
///
/// Returns `None` when nothing usable remains.
pub fn sanitize_entry_path(path: &str) -> Option<String> {
    let segments: Vec<String> = path
        .split(['/', '\\'])
        .map(|s| s.chars().filter(|c| !c.is_control()).collect::<String>())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "." && s != "..")
        .collect();

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}
