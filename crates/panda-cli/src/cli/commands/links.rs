//! `panda links <title>` and `panda syllabus <title>`.

use anyhow::{Context, Result};
use panda_core::config::PandaConfig;
use panda_core::links::{parse_course_string, resolve_syllabus, CourseTitle, ExternalLinks};
use panda_core::state::SyllabusCache;

use super::fetcher;

/// Resolves the syllabus page, consulting and updating the on-disk cache.
async fn resolve_cached(cfg: &PandaConfig, title: CourseTitle) -> Result<Option<String>> {
    let cfg = cfg.clone();
    tokio::task::spawn_blocking(move || {
        let mut cache = SyllabusCache::load().unwrap_or_else(|e| {
            tracing::warn!("syllabus cache unreadable, starting empty: {:#}", e);
            SyllabusCache::default()
        });
        let before = cache.entries.len();
        let url = resolve_syllabus(&fetcher(&cfg), &title, &mut cache);
        if cache.entries.len() != before {
            if let Err(e) = cache.save() {
                tracing::warn!("could not save syllabus cache: {:#}", e);
            }
        }
        url
    })
    .await
    .context("syllabus task join")
}

pub async fn run_links(cfg: &PandaConfig, title: &str, resolve: bool) -> Result<()> {
    let course = parse_course_string(title);
    let mut links = ExternalLinks::for_course(&course).context("build course links")?;
    if resolve {
        links = links.with_syllabus(resolve_cached(cfg, course.clone()).await?);
    }
    println!("シラバス (KULASIS)  {}", links.syllabus);
    println!("過去問 (ku1025)     {}", links.ku1025);
    println!("過去問 (kuwiki)     {}", links.kuwiki);
    Ok(())
}

pub async fn run_syllabus(cfg: &PandaConfig, title: &str) -> Result<()> {
    let course = parse_course_string(title);
    match resolve_cached(cfg, course.clone()).await? {
        Some(url) => println!("{}", url),
        None => {
            let fallback = panda_core::links::entry_url(course.semester);
            eprintln!("syllabus page not found for {}; catalogue: {}", course.name, fallback);
            println!("{}", fallback);
        }
    }
    Ok(())
}
