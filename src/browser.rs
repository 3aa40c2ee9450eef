//! Headless Chrome rendering via chromiumoxide
//!
//! Every render launches its own browser with a private profile directory
//! and closes it before returning, whether capture succeeded or not. If the
//! render future is dropped mid-capture, `ChromeSession`'s fields release the
//! process, the CDP handler task and the profile directory on drop.

use crate::error::RenderError;
use crate::provider::ChromiumProvider;
use crate::render::Renderer;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde::Deserialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

/// Network must stay quiet this long before the page counts as settled
pub const IDLE_WINDOW: Duration = Duration::from_millis(500);
const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// How long a closed or killed browser gets to exit before it is killed again
const EXIT_GRACE: Duration = Duration::from_secs(5);

const LOAD_STATE_SCRIPT: &str = r#"(() => ({
    complete: document.readyState === 'complete',
    resources: performance.getEntriesByType('resource').length
}))()"#;

/// Document readiness and the number of network resources fetched so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LoadState {
    pub complete: bool,
    pub resources: usize,
}

/// A selector that must appear before HTML is captured
#[derive(Debug, Clone)]
pub struct SelectorWait {
    pub selector: String,
    pub timeout: Duration,
}

/// Wait and timeout sequence applied to a page
#[derive(Debug, Clone)]
pub struct CapturePlan {
    pub navigation_timeout: Duration,
    pub idle_window: Duration,
    pub ready_selector: Option<SelectorWait>,
}

impl CapturePlan {
    pub fn network_idle(navigation_timeout: Duration) -> Self {
        Self {
            navigation_timeout,
            idle_window: IDLE_WINDOW,
            ready_selector: None,
        }
    }

    pub fn wait_for(mut self, selector: &str, timeout: Duration) -> Self {
        self.ready_selector = Some(SelectorWait {
            selector: selector.to_string(),
            timeout,
        });
        self
    }
}

/// How to start the browser process
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    provider: Option<ChromiumProvider>,
    args: Vec<String>,
}

impl LaunchOptions {
    /// Locally installed Chrome, found by chromiumoxide
    pub fn local() -> Self {
        Self {
            provider: None,
            args: [
                "--disable-gpu",
                "--disable-dev-shm-usage",
                "--disable-setuid-sandbox",
                "--no-first-run",
                "--headless=new",
            ]
            .iter()
            .map(|a| a.to_string())
            .collect(),
        }
    }

    /// Executable and arguments come from the provider
    pub fn from_provider(provider: &ChromiumProvider) -> Self {
        Self {
            provider: Some(provider.clone()),
            args: provider.default_args(),
        }
    }

    fn browser_config(&self, profile_dir: &Path) -> Result<BrowserConfig, RenderError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .user_data_dir(profile_dir)
            .args(self.args.iter().cloned());

        if let Some(provider) = &self.provider {
            builder = builder.chrome_executable(provider.executable_path()?);
        }

        builder.build().map_err(RenderError::Launch)
    }
}

/// One open browser page. `close` consumes the session so it runs at most
/// once; implementations must also release their resources on drop.
#[async_trait]
pub trait PageSession: Send + Sized {
    async fn set_user_agent(&mut self, user_agent: &str) -> Result<(), RenderError>;

    /// Navigate and wait for the load event
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError>;

    async fn load_state(&mut self) -> Result<LoadState, RenderError>;

    /// Whether `selector` currently matches. Transport failures are errors, not `false`.
    async fn has_element(&mut self, selector: &str) -> Result<bool, RenderError>;

    async fn html(&mut self) -> Result<String, RenderError>;

    async fn close(self) -> Result<(), RenderError>;
}

/// Run the capture plan on a session, then close it on every path
pub async fn capture<S: PageSession>(
    mut session: S,
    url: &Url,
    user_agent: &str,
    plan: &CapturePlan,
) -> Result<String, RenderError> {
    let outcome = drive(&mut session, url, user_agent, plan).await;

    if let Err(e) = session.close().await {
        warn!(error = %e, "browser did not close cleanly");
    }

    outcome
}

async fn drive<S: PageSession>(
    session: &mut S,
    url: &Url,
    user_agent: &str,
    plan: &CapturePlan,
) -> Result<String, RenderError> {
    session.set_user_agent(user_agent).await?;

    let start = Instant::now();
    let nav = &mut *session;
    let settled = tokio::time::timeout(plan.navigation_timeout, async move {
        nav.navigate(url.as_str()).await?;
        wait_for_network_idle(nav, plan.idle_window).await
    })
    .await;

    match settled {
        Ok(result) => result?,
        Err(_) => {
            return Err(RenderError::NavigationTimeout {
                url: url.to_string(),
                timeout: plan.navigation_timeout,
            })
        }
    }
    debug!(elapsed_ms = start.elapsed().as_millis() as u64, "page settled");

    if let Some(wait) = &plan.ready_selector {
        wait_for_selector(session, &wait.selector, wait.timeout).await?;
    }

    session.html().await
}

/// Poll until the document is complete and no new resources arrived for `window`
async fn wait_for_network_idle<S: PageSession>(
    session: &mut S,
    window: Duration,
) -> Result<(), RenderError> {
    let mut last_count = None;
    let mut quiet_since = Instant::now();

    loop {
        let state = session.load_state().await?;
        if last_count != Some(state.resources) {
            last_count = Some(state.resources);
            quiet_since = Instant::now();
        } else if state.complete && quiet_since.elapsed() >= window {
            return Ok(());
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

async fn wait_for_selector<S: PageSession>(
    session: &mut S,
    selector: &str,
    timeout: Duration,
) -> Result<(), RenderError> {
    let start = Instant::now();

    loop {
        if session.has_element(selector).await? {
            debug!(selector, elapsed_ms = start.elapsed().as_millis() as u64, "selector found");
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(RenderError::SelectorTimeout {
                selector: selector.to_string(),
                timeout,
            });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// The parts of a browser process needed to shut it down
#[async_trait]
pub trait BrowserProcess: Send {
    /// Ask the browser to exit over CDP
    async fn close(&mut self) -> Result<(), RenderError>;

    async fn kill(&mut self);

    /// Wait for the process to exit
    async fn wait(&mut self);
}

#[async_trait]
impl BrowserProcess for Browser {
    async fn close(&mut self) -> Result<(), RenderError> {
        Browser::close(self)
            .await
            .map(|_| ())
            .map_err(|e| RenderError::Close(e.to_string()))
    }

    async fn kill(&mut self) {
        if let Some(Err(e)) = Browser::kill(self).await {
            warn!(error = %e, "failed to kill browser");
        }
    }

    async fn wait(&mut self) {
        let _ = Browser::wait(self).await;
    }
}

/// Close the browser, falling back to kill when close fails or the process
/// does not exit within `grace`. Never waits unbounded.
pub async fn shutdown<P: BrowserProcess>(process: &mut P, grace: Duration) -> Result<(), RenderError> {
    let closed = process.close().await;
    if let Err(e) = &closed {
        warn!(error = %e, "close failed, killing browser");
        process.kill().await;
    }

    if tokio::time::timeout(grace, process.wait()).await.is_err() {
        warn!(grace_ms = grace.as_millis() as u64, "browser did not exit, killing");
        process.kill().await;
    }

    closed
}

/// A launched Chrome process with a single page
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    _profile: TempDir,
}

impl ChromeSession {
    pub async fn launch(options: &LaunchOptions) -> Result<Self, RenderError> {
        let profile = tempfile::Builder::new()
            .prefix("job-scrape-")
            .tempdir()
            .map_err(|e| RenderError::Launch(format!("failed to create profile dir: {e}")))?;
        let config = options.browser_config(profile.path())?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });

        match browser.new_page("about:blank").await {
            Ok(page) => Ok(Self {
                browser,
                page,
                handler,
                _profile: profile,
            }),
            Err(e) => {
                // no session to hand out, so release the process here
                if let Err(close_err) = shutdown(&mut browser, EXIT_GRACE).await {
                    warn!(error = %close_err, "browser did not close cleanly");
                }
                handler.abort();
                Err(RenderError::Launch(e.to_string()))
            }
        }
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        // Browser kills its child on drop and TempDir removes the profile
        self.handler.abort();
    }
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn set_user_agent(&mut self, user_agent: &str) -> Result<(), RenderError> {
        self.page
            .execute(SetUserAgentOverrideParams::new(user_agent))
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn load_state(&mut self) -> Result<LoadState, RenderError> {
        self.page
            .evaluate(LOAD_STATE_SCRIPT)
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?
            .into_value::<LoadState>()
            .map_err(|e| RenderError::Navigation(e.to_string()))
    }

    async fn has_element(&mut self, selector: &str) -> Result<bool, RenderError> {
        // querySelectorAll yields an empty list for no match; Err is a CDP failure
        self.page
            .find_elements(selector)
            .await
            .map(|found| !found.is_empty())
            .map_err(|e| RenderError::Navigation(e.to_string()))
    }

    async fn html(&mut self) -> Result<String, RenderError> {
        self.page
            .content()
            .await
            .map_err(|e| RenderError::Capture(e.to_string()))
    }

    async fn close(mut self) -> Result<(), RenderError> {
        shutdown(&mut self.browser, EXIT_GRACE).await
    }
}

/// Renderer that runs each request in a fresh headless browser
pub struct BrowserRenderer {
    name: &'static str,
    launch: LaunchOptions,
    plan: CapturePlan,
}

impl BrowserRenderer {
    pub fn new(name: &'static str, launch: LaunchOptions, plan: CapturePlan) -> Self {
        Self { name, launch, plan }
    }
}

#[async_trait]
impl Renderer for BrowserRenderer {
    async fn render(&self, url: &Url, user_agent: &str) -> Result<String, RenderError> {
        let session = ChromeSession::launch(&self.launch).await?;
        debug!(renderer = self.name, "browser launched");
        capture(session, url, user_agent, &self.plan).await
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
