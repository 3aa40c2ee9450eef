//! Externally supplied Chromium for constrained hosts
//!
//! Supplies the executable and launch flags used by the serverless renderer.
//! The binary is not bundled: it comes from `--chromium-path`/`CHROMIUM_PATH`
//! or, failing that, from `PATH`.

use crate::error::RenderError;
use std::path::PathBuf;

/// Binary names tried on `PATH` when no explicit executable is configured
const PATH_CANDIDATES: &[&str] = &["chromium", "chromium-browser", "headless-shell", "google-chrome"];

/// Flags for single-process Chromium on hosts without /dev/shm, GPU or a sandbox
const SERVERLESS_ARGS: &[&str] = &[
    "--allow-pre-commit-input",
    "--disable-background-networking",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-breakpad",
    "--disable-client-side-phishing-detection",
    "--disable-component-extensions-with-background-pages",
    "--disable-component-update",
    "--disable-default-apps",
    "--disable-dev-shm-usage",
    "--disable-extensions",
    "--disable-hang-monitor",
    "--disable-ipc-flooding-protection",
    "--disable-popup-blocking",
    "--disable-prompt-on-repost",
    "--disable-renderer-backgrounding",
    "--disable-sync",
    "--disable-gpu",
    "--disable-setuid-sandbox",
    "--disable-site-isolation-trials",
    "--disable-features=Translate,BackForwardCache,AcceptCHFrame,MediaRouter,OptimizationHints",
    "--enable-automation",
    "--force-color-profile=srgb",
    "--hide-scrollbars",
    "--ignore-gpu-blocklist",
    "--in-process-gpu",
    "--metrics-recording-only",
    "--mute-audio",
    "--no-default-browser-check",
    "--no-first-run",
    "--no-pings",
    "--no-sandbox",
    "--no-zygote",
    "--password-store=basic",
    "--single-process",
    "--use-gl=angle",
    "--use-angle=swiftshader",
    "--use-mock-keychain",
    "--window-size=1920,1080",
    "--headless=new",
];

/// Source of the Chromium executable and its default launch arguments
#[derive(Debug, Clone, Default)]
pub struct ChromiumProvider {
    executable: Option<PathBuf>,
}

impl ChromiumProvider {
    pub fn new(executable: Option<PathBuf>) -> Self {
        Self { executable }
    }

    /// Resolve the executable. Checked at launch time so a missing binary
    /// surfaces as a render failure rather than a startup crash.
    pub fn executable_path(&self) -> Result<PathBuf, RenderError> {
        if let Some(path) = &self.executable {
            if path.exists() {
                return Ok(path.clone());
            }
            return Err(RenderError::ExecutableNotFound(path.display().to_string()));
        }

        PATH_CANDIDATES
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or_else(|| {
                RenderError::ExecutableNotFound(format!(
                    "none of {} on PATH; set CHROMIUM_PATH",
                    PATH_CANDIDATES.join(", ")
                ))
            })
    }

    pub fn default_args(&self) -> Vec<String> {
        SERVERLESS_ARGS.iter().map(|a| a.to_string()).collect()
    }
}
