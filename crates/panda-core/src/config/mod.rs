use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

mod selectors;

pub use selectors::{AssignmentSelectors, NavigationSelectors, ResourceSelectors, Selectors};

/// WebDAV crawl bounds (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Deepest sub-collection level visited below the crawl root.
    pub max_depth: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self { max_depth: 16 }
    }
}

/// Global configuration loaded from `~/.config/panda/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PandaConfig {
    /// Portal origin; portal-relative URLs are resolved against it.
    pub portal_base_url: String,
    /// User-Agent sent with every request.
    pub user_agent: String,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds (covers large resource files).
    pub request_timeout_secs: u64,
    /// Maximum concurrent file downloads while building an archive (0 = all at once).
    pub max_concurrent_downloads: usize,
    /// Raw `Cookie` header value of a logged-in portal session.
    #[serde(default)]
    pub cookie: Option<String>,
    /// Directory archives are written to (None = current directory).
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub crawl: CrawlConfig,
    /// CSS selectors for portal markup; defaults match the stock portal skin.
    #[serde(default)]
    pub selectors: Selectors,
}

impl Default for PandaConfig {
    fn default() -> Self {
        Self {
            portal_base_url: "https://panda.ecs.kyoto-u.ac.jp".to_string(),
            user_agent: concat!("panda-toolkit/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout_secs: 15,
            request_timeout_secs: 300,
            max_concurrent_downloads: 8,
            cookie: None,
            output_dir: None,
            crawl: CrawlConfig::default(),
            selectors: Selectors::default(),
        }
    }
}

impl PandaConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Landing page listing every enrolled course site.
    pub fn portal_home_url(&self) -> String {
        format!("{}/portal", self.portal_base_url.trim_end_matches('/'))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("panda")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PandaConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PandaConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data =
        fs::read_to_string(&path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: PandaConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
