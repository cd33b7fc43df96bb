//! Download-all: build one archive of a course site's resources.
//!
//! Two stages run in order and the first one that produces an archive wins:
//! the WebDAV crawl of the site's group collection, then a scrape of the
//! resources page itself. Each stage starts from an empty [`ArchiveJob`];
//! nothing a failed stage downloaded is carried over.

use std::fmt;

use chrono::NaiveDate;
use url::Url;

use crate::archive::{download_all, Archive, ArchiveError, ArchiveJob, ArchiveProgress, Downloaded};
use crate::config::{NavigationSelectors, PandaConfig};
use crate::fetch::{element_text, fetch_document, Fetch};
use crate::model::FileEntry;
use crate::naming::{archive_file_name, archive_root_folder, derive_display_name, DEFAULT_SITE_NAME};
use crate::resources::scrape_resource_entries;
use crate::webdav::{crawl, CrawlLimits};

/// Archive-producing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    WebDav,
    PageScrape,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::WebDav => f.write_str("WebDAV"),
            Stage::PageScrape => f.write_str("page scrape"),
        }
    }
}

/// Why a single stage produced no archive.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("could not determine the site id from {0}")]
    MissingSiteId(String),
    #[error("no files found")]
    NoFilesFound,
    #[error("all {attempted} downloads failed")]
    NoFilesDownloaded { attempted: usize },
    #[error("resources page unavailable: {0}")]
    PageUnavailable(String),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// Both stages failed.
#[derive(Debug)]
pub struct FailureReason {
    pub webdav: StageError,
    pub page_scrape: StageError,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WebDAV: {}; page scrape: {}",
            self.webdav, self.page_scrape
        )
    }
}

impl std::error::Error for FailureReason {}

#[derive(Debug)]
pub enum ArchiveOutcome {
    Succeeded { archive: Archive, stage: Stage },
    Failed(FailureReason),
}

/// Where a download-all runs: the resources page and what is known about its site.
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub page_url: Url,
    pub site_id: Option<String>,
    pub site_name: String,
}

impl SiteContext {
    pub fn from_url(page_url: &str, site_name: &str) -> Result<Self, url::ParseError> {
        let page_url = Url::parse(page_url)?;
        let site_id = site_id_from_url(&page_url);
        let site_name = match site_name.trim() {
            "" => DEFAULT_SITE_NAME.to_string(),
            name => name.to_string(),
        };
        Ok(Self {
            page_url,
            site_id,
            site_name,
        })
    }

    /// Builds the context from the page itself, reading the site title from
    /// the navigation header. An unreachable page still yields a context
    /// (with the default site name); the stages report the failure.
    pub fn discover(
        fetcher: &dyn Fetch,
        page_url: &str,
        selectors: &NavigationSelectors,
    ) -> Result<Self, url::ParseError> {
        let site_name = fetch_document(fetcher, page_url)
            .and_then(|doc| doc.select_first(&selectors.site_name).map(|el| element_text(&el)))
            .unwrap_or_default();
        Self::from_url(page_url, &site_name)
    }

    /// `{origin}/dav/group/{site_id}/`.
    pub fn webdav_url(&self) -> Option<String> {
        let id = self.site_id.as_deref()?;
        Some(format!(
            "{}/dav/group/{}/",
            self.page_url.origin().ascii_serialization(),
            id
        ))
    }
}

/// Site id from the first `/site/<id>` of a portal URL (`[A-Za-z0-9-]+`).
pub fn site_id_from_url(url: &Url) -> Option<String> {
    let path = url.path();
    let start = path.find("/site/")? + "/site/".len();
    let id: String = path[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Runs the stages and returns the first archive produced.
///
/// `today` stamps the archive name.
pub fn run_download_all(
    fetcher: &dyn Fetch,
    ctx: &SiteContext,
    cfg: &PandaConfig,
    progress: Option<&tokio::sync::mpsc::Sender<ArchiveProgress>>,
    today: NaiveDate,
) -> ArchiveOutcome {
    let file_name = archive_file_name(&ctx.site_name, today);
    let root = archive_root_folder(&ctx.site_name);
    let new_job = || ArchiveJob::new(file_name.clone(), root.clone());

    let webdav = match webdav_stage(fetcher, ctx, cfg, progress, new_job()) {
        Ok(archive) => {
            tracing::info!(file = %archive.file_name, files = archive.file_count, "archive built via WebDAV");
            return ArchiveOutcome::Succeeded {
                archive,
                stage: Stage::WebDav,
            };
        }
        Err(e) => e,
    };
    tracing::warn!(site = ?ctx.site_id, "WebDAV stage failed ({}); falling back to page scrape", webdav);

    match page_scrape_stage(fetcher, ctx, cfg, progress, new_job()) {
        Ok(archive) => {
            tracing::info!(file = %archive.file_name, files = archive.file_count, "archive built via page scrape");
            ArchiveOutcome::Succeeded {
                archive,
                stage: Stage::PageScrape,
            }
        }
        Err(page_scrape) => {
            tracing::error!(webdav = %webdav, page_scrape = %page_scrape, "download-all failed");
            ArchiveOutcome::Failed(FailureReason {
                webdav,
                page_scrape,
            })
        }
    }
}

fn webdav_stage(
    fetcher: &dyn Fetch,
    ctx: &SiteContext,
    cfg: &PandaConfig,
    progress: Option<&tokio::sync::mpsc::Sender<ArchiveProgress>>,
    mut job: ArchiveJob,
) -> Result<Archive, StageError> {
    let root = ctx
        .webdav_url()
        .ok_or_else(|| StageError::MissingSiteId(ctx.page_url.to_string()))?;
    let entries = crawl(fetcher, &root, CrawlLimits::from(cfg.crawl.clone()));
    let downloaded = download_stage(fetcher, entries, cfg, progress)?;
    for d in downloaded {
        job.add(&d.entry.relative_path, d.bytes);
    }
    Ok(job.finish()?)
}

fn page_scrape_stage(
    fetcher: &dyn Fetch,
    ctx: &SiteContext,
    cfg: &PandaConfig,
    progress: Option<&tokio::sync::mpsc::Sender<ArchiveProgress>>,
    mut job: ArchiveJob,
) -> Result<Archive, StageError> {
    let doc = fetch_document(fetcher, ctx.page_url.as_str())
        .ok_or_else(|| StageError::PageUnavailable(ctx.page_url.to_string()))?;
    let entries = scrape_resource_entries(&doc, &cfg.selectors.resources);
    let downloaded = download_stage(fetcher, entries, cfg, progress)?;
    for d in downloaded {
        let name = derive_display_name(
            &d.entry.display_name,
            d.content_disposition.as_deref(),
            &d.entry.download_url,
        );
        job.add(&name, d.bytes);
    }
    Ok(job.finish()?)
}

fn download_stage(
    fetcher: &dyn Fetch,
    entries: Vec<FileEntry>,
    cfg: &PandaConfig,
    progress: Option<&tokio::sync::mpsc::Sender<ArchiveProgress>>,
) -> Result<Vec<Downloaded>, StageError> {
    if entries.is_empty() {
        return Err(StageError::NoFilesFound);
    }
    let attempted = entries.len();
    let downloaded = download_all(fetcher, entries, cfg.max_concurrent_downloads, progress);
    if downloaded.is_empty() {
        return Err(StageError::NoFilesDownloaded { attempted });
    }
    if downloaded.len() < attempted {
        tracing::warn!(attempted, downloaded = downloaded.len(), "some downloads failed");
    }
    Ok(downloaded)
}
