//! CLI for the PandA portal toolkit.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use panda_core::config;
use std::path::PathBuf;

use commands::{
    run_assignments, run_completions, run_crawl, run_download, run_links,
    run_relay, run_share, run_sidebar, run_syllabus,
};

/// Top-level CLI for the PandA portal toolkit.
#[derive(Debug, Parser)]
#[command(name = "panda")]
#[command(about = "PandA: pending assignments, course links and resource archives from the course portal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Scan every course for pending assignments and show them as the sidebar.
    Assignments {
        /// Print the assignments as JSON instead of the sidebar.
        #[arg(long)]
        json: bool,
    },

    /// Download all resources of a course site into one zip archive.
    Download {
        /// Resources page URL of the course site (contains `/site/<id>`).
        url: String,
        /// Directory to write the archive to (default: config `output_dir`, else current directory).
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
        /// Site name used for the archive; read from the page when omitted.
        #[arg(long)]
        site_name: Option<String>,
    },

    /// List the files of a WebDAV collection, recursively.
    Crawl {
        /// Collection URL (e.g. `https://.../dav/group/<site id>/`).
        url: String,
    },

    /// Show syllabus and past-exam links for a course.
    Links {
        /// Site title as shown by the portal, e.g. `[2024前期月2]線形代数学`.
        title: String,
        /// Skip the syllabus lookup and print the catalogue entry page.
        #[arg(long)]
        no_resolve: bool,
    },

    /// Resolve the syllabus page of a course.
    Syllabus {
        /// Site title as shown by the portal.
        title: String,
    },

    /// Compose a share post for a submission confirmation page.
    Share {
        /// URL of the confirmation page shown after submitting.
        url: String,
    },

    /// Show or change the sidebar layout.
    Sidebar {
        #[command(subcommand)]
        action: SidebarAction,
    },

    /// Serve fetch requests as newline-delimited JSON on stdin/stdout.
    Relay,

    /// Print shell completions.
    Completions {
        shell: Shell,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum SidebarAction {
    /// Collapse or expand.
    Toggle,
    /// Set the expanded width in pixels (clamped to 150-600).
    Width { px: u32 },
    /// Print the current layout.
    Show,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Assignments { json } => run_assignments(&cfg, json).await?,
            CliCommand::Download {
                url,
                output_dir,
                site_name,
            } => {
                let dir = match output_dir.or_else(|| cfg.output_dir.clone()) {
                    Some(d) => d,
                    None => std::env::current_dir()?,
                };
                run_download(&cfg, &url, &dir, site_name).await?;
            }
            CliCommand::Crawl { url } => run_crawl(&cfg, &url).await?,
            CliCommand::Links { title, no_resolve } => run_links(&cfg, &title, !no_resolve).await?,
            CliCommand::Syllabus { title } => run_syllabus(&cfg, &title).await?,
            CliCommand::Share { url } => run_share(&cfg, &url).await?,
            CliCommand::Sidebar { action } => run_sidebar(action)?,
            CliCommand::Relay => run_relay(&cfg).await?,
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
