//! `panda relay` – fetch relay over stdin/stdout.

use anyhow::{Context, Result};
use panda_core::config::PandaConfig;
use panda_core::relay::handle_line;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::fetcher;

/// One JSON request per input line, one JSON response per output line, until EOF.
pub async fn run_relay(cfg: &PandaConfig) -> Result<()> {
    let fetcher = Arc::new(fetcher(cfg));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("read relay request")? {
        if line.trim().is_empty() {
            continue;
        }
        let response = tokio::task::spawn_blocking({
            let fetcher = Arc::clone(&fetcher);
            move || handle_line(&*fetcher, &line)
        })
        .await
        .context("relay task join")?;
        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }
    Ok(())
}
