//! Command-line and environment configuration

use crate::site::{JobSite, DEFAULT_ORIGIN};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

/// Page acquisition strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererKind {
    /// Plain HTTP GET, no script execution
    Fetch,
    /// Locally installed headless Chrome
    Browser,
    /// Externally supplied Chromium build with serverless launch flags
    Serverless,
}

/// Options shared by `serve` and `scrape`
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Page acquisition strategy
    #[arg(long, env = "RENDERER", value_enum, default_value = "fetch")]
    pub renderer: RendererKind,

    /// Origin of the job-search site
    #[arg(long, env = "SITE_ORIGIN", default_value = DEFAULT_ORIGIN)]
    pub site_origin: Url,

    /// User-Agent sent with every request
    #[arg(long, env = "USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Chromium executable for the serverless renderer
    #[arg(long, env = "CHROMIUM_PATH")]
    pub chromium_path: Option<PathBuf>,

    /// Navigation (or request) timeout in milliseconds
    #[arg(long, default_value = "30000")]
    pub timeout: u64,

    /// Listing selector wait in milliseconds (serverless renderer)
    #[arg(long, default_value = "25000")]
    pub selector_timeout: u64,
}

impl RenderArgs {
    pub fn site(&self) -> JobSite {
        JobSite::new(self.site_origin.clone())
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    pub fn selector_wait(&self) -> Duration {
        Duration::from_millis(self.selector_timeout)
    }
}

impl Default for RenderArgs {
    fn default() -> Self {
        let site = JobSite::default();
        Self {
            renderer: RendererKind::Fetch,
            site_origin: site.origin().clone(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            chromium_path: None,
            timeout: 30000,
            selector_timeout: 25000,
        }
    }
}
