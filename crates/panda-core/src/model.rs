//! Records passed between the scrapers, the crawler and the archive builder.

use serde::Serialize;

/// One downloadable resource and its destination inside an archive.
///
/// Produced by the WebDAV crawler or the resources page scraper; consumed
/// exactly once by the archive builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute URL the file bytes are fetched from.
    pub download_url: String,
    /// Path relative to the archive's root folder (`/`-separated, decoded).
    pub relative_path: String,
    /// Human-readable name, as listed by the server.
    pub display_name: String,
}

/// A pending assignment scraped from a course site's assignment list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub course: String,
    pub title: String,
    pub status: String,
    /// Due date as displayed by the portal (parsed on demand by `due`).
    pub due_date: String,
    pub description: String,
    pub url: String,
}
