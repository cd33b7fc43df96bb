//! `panda crawl <url>` – list a WebDAV collection.

use anyhow::{Context, Result};
use panda_core::config::PandaConfig;
use panda_core::webdav::{crawl, CrawlLimits};

use super::fetcher;

pub async fn run_crawl(cfg: &PandaConfig, url: &str) -> Result<()> {
    let entries = tokio::task::spawn_blocking({
        let url = url.to_string();
        let cfg = cfg.clone();
        move || crawl(&fetcher(&cfg), &url, CrawlLimits::from(cfg.crawl.clone()))
    })
    .await
    .context("crawl task join")?;

    if entries.is_empty() {
        println!("No files found.");
    }
    for e in &entries {
        println!("{}\t{}", e.relative_path, e.download_url);
    }
    Ok(())
}
