//! CLI command handlers, one file per subcommand.

mod assignments;
mod completions;
mod crawl;
mod download;
mod links;
mod relay;
mod share;
mod sidebar;

pub use assignments::run_assignments;
pub use completions::run_completions;
pub use crawl::run_crawl;
pub use download::run_download;
pub use links::{run_links, run_syllabus};
pub use relay::run_relay;
pub use share::run_share;
pub use sidebar::run_sidebar;

use panda_core::config::PandaConfig;
use panda_core::fetch::{CurlFetcher, FetchOptions};

/// Fetcher for portal requests, carrying the configured session cookie.
fn fetcher(cfg: &PandaConfig) -> CurlFetcher {
    CurlFetcher::new(FetchOptions::from_config(cfg))
}
