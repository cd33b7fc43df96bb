//! Names inside and of archives.
//!
//! Derives display names for resource files, the downloaded archive's
//! filename, and collision-free entry paths.

mod collision;
mod content_disposition;
mod path;
mod sanitize;

use chrono::NaiveDate;

pub use collision::{disambiguate, NameRegistry};
pub use content_disposition::parse_content_disposition_filename;
pub use path::{last_segment, percent_decode};
pub use sanitize::{sanitize_entry_path, sanitize_site_name};

/// Name used when neither link text, headers nor URL yield a filename.
pub const UNKNOWN_FILE: &str = "unknown_file";

/// Root folder / archive stem when the site name is missing or empty.
pub const DEFAULT_SITE_NAME: &str = "Course_Resources";

/// Literal marker between site name and date ("course materials").
pub const ARCHIVE_MARKER: &str = "授業資料";

/// Sanitized site name, or [`DEFAULT_SITE_NAME`] when nothing is left.
pub fn archive_root_folder(site_name: &str) -> String {
    let safe = sanitize_site_name(site_name);
    if safe.is_empty() {
        DEFAULT_SITE_NAME.to_string()
    } else {
        safe
    }
}

/// Filename of the archive for a site on a given day:
/// `{sanitized site}_授業資料_{YYYYMMDD}.zip`.
///
/// # Examples
///
/// - `archive_file_name("Algebra: I/II", 2024-04-01)` → `"Algebra_ I_II_授業資料_20240401.zip"`
pub fn archive_file_name(site_name: &str, date: NaiveDate) -> String {
    format!(
        "{}_{}_{}.zip",
        archive_root_folder(site_name),
        ARCHIVE_MARKER,
        date.format("%Y%m%d")
    )
}

/// Display name of a resource: link text, else the `Content-Disposition`
/// filename, else the URL's last path segment, else [`UNKNOWN_FILE`].
pub fn derive_display_name(
    link_text: &str,
    content_disposition: Option<&str>,
    url: &str,
) -> String {
    let text = link_text.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    content_disposition
        .and_then(parse_content_disposition_filename)
        .or_else(|| last_segment(url))
        .unwrap_or_else(|| UNKNOWN_FILE.to_string())
}
