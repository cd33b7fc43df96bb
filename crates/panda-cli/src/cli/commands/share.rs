//! `panda share <url>` – share post for a submission confirmation.

use anyhow::{Context, Result};
use panda_core::assignments::assignment_tool_url;
use panda_core::config::PandaConfig;
use panda_core::fetch::fetch_document;
use panda_core::submission::{find_due_in_list, parse_confirmation, remaining, share_text, share_url};

use super::fetcher;

pub async fn run_share(cfg: &PandaConfig, url: &str) -> Result<()> {
    let text = tokio::task::spawn_blocking({
        let url = url.to_string();
        let cfg = cfg.clone();
        move || -> Result<String> {
            let fetcher = fetcher(&cfg);
            let page = fetch_document(&fetcher, &url)
                .with_context(|| format!("confirmation page unavailable: {}", url))?;
            let submission =
                parse_confirmation(&page).context("page does not confirm a submission")?;

            let selectors = &cfg.selectors;
            let due = assignment_tool_url(&page, &selectors.navigation, &selectors.assignments)
                .and_then(|list_url| fetch_document(&fetcher, &list_url))
                .and_then(|list| find_due_in_list(&list, &submission.title, &selectors.assignments));
            let left = due.and_then(|d| remaining(&submission.submitted_at, &d));
            Ok(share_text(&submission, left.as_deref()))
        }
    })
    .await
    .context("share task join")??;

    println!("{}", text);
    println!();
    println!("{}", share_url(&text));
    Ok(())
}
