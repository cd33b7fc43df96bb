//! `panda download <url>` – archive every resource of a course site.

use anyhow::{Context, Result};
use panda_core::archive::ArchiveProgress;
use panda_core::config::PandaConfig;
use panda_core::pipeline::{run_download_all, ArchiveOutcome, SiteContext};
use panda_core::storage::{unused_path, write_atomic};
use std::path::Path;

use super::fetcher;

pub async fn run_download(
    cfg: &PandaConfig,
    url: &str,
    output_dir: &Path,
    site_name: Option<String>,
) -> Result<()> {
    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<ArchiveProgress>(64);
    let progress_handle = tokio::spawn(async move {
        let mut printed = false;
        while let Some(p) = progress_rx.recv().await {
            eprint!("\r  {}/{} files ({} failed)  ", p.settled, p.total, p.failed);
            printed = true;
        }
        if printed {
            eprintln!();
        }
    });

    let today = chrono::Utc::now().date_naive();
    let outcome = tokio::task::spawn_blocking({
        let url = url.to_string();
        let cfg = cfg.clone();
        move || -> Result<ArchiveOutcome> {
            let fetcher = fetcher(&cfg);
            let ctx = match site_name {
                Some(name) => SiteContext::from_url(&url, &name),
                None => SiteContext::discover(&fetcher, &url, &cfg.selectors.navigation),
            }
            .with_context(|| format!("invalid page URL: {}", url))?;
            tracing::info!(site = ?ctx.site_id, name = %ctx.site_name, "download-all started");
            Ok(run_download_all(&fetcher, &ctx, &cfg, Some(&progress_tx), today))
        }
    })
    .await
    .context("download task join")??;
    let _ = progress_handle.await;

    match outcome {
        ArchiveOutcome::Succeeded { archive, stage } => {
            let path = unused_path(output_dir, &archive.file_name);
            write_atomic(&path, &archive.bytes)?;
            println!(
                "{} files via {} -> {}",
                archive.file_count,
                stage,
                path.display()
            );
            Ok(())
        }
        ArchiveOutcome::Failed(reason) => {
            anyhow::bail!("download failed. Please check the session and try again ({})", reason)
        }
    }
}
