//! `panda assignments` – pending assignments across all courses.

use anyhow::{Context, Result};
use panda_core::assignments::{list_courses, scan_assignments};
use panda_core::config::PandaConfig;
use panda_core::fetch::fetch_document;
use panda_core::sidebar::{render, SidebarState};

use super::fetcher;

pub async fn run_assignments(cfg: &PandaConfig, json: bool) -> Result<()> {
    let cfg = cfg.clone();
    let now = chrono::Local::now().naive_local();
    let found = tokio::task::spawn_blocking(move || -> Result<_> {
        let fetcher = fetcher(&cfg);
        let home = cfg.portal_home_url();
        let doc = fetch_document(&fetcher, &home)
            .with_context(|| format!("portal home unavailable: {} (is the session cookie set?)", home))?;
        let courses = list_courses(&doc, &cfg.selectors.navigation);
        Ok(scan_assignments(
            &fetcher,
            &courses,
            &cfg.selectors.navigation,
            &cfg.selectors.assignments,
            now,
            &mut |msg: &str| eprintln!("{}", msg),
        ))
    })
    .await
    .context("assignment scan task join")??;

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }
    let state = SidebarState::load().unwrap_or_else(|e| {
        tracing::warn!("sidebar state unreadable, using defaults: {:#}", e);
        SidebarState::default()
    });
    print!("{}", render(&state, &found, now));
    Ok(())
}
