//! Page acquisition strategies
//!
//! One strategy is chosen per deployment with `--renderer`; they are
//! substitutable, never chained.

use crate::browser::{BrowserRenderer, CapturePlan, LaunchOptions};
use crate::config::{RenderArgs, RendererKind};
use crate::error::RenderError;
use crate::extract::LISTING_SELECTOR;
use crate::fetch::FetchRenderer;
use crate::provider::ChromiumProvider;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

/// Acquires the rendered HTML of a search page
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &Url, user_agent: &str) -> Result<String, RenderError>;

    /// Strategy name for logs
    fn name(&self) -> &'static str;
}

/// Build the configured renderer
pub fn build_renderer(args: &RenderArgs) -> Result<Arc<dyn Renderer>> {
    let renderer: Arc<dyn Renderer> = match args.renderer {
        RendererKind::Fetch => Arc::new(
            FetchRenderer::new(args.navigation_timeout())
                .context("Failed to build HTTP client")?,
        ),
        RendererKind::Browser => Arc::new(BrowserRenderer::new(
            "browser",
            LaunchOptions::local(),
            CapturePlan::network_idle(args.navigation_timeout()),
        )),
        RendererKind::Serverless => {
            let provider = ChromiumProvider::new(args.chromium_path.clone());
            Arc::new(BrowserRenderer::new(
                "serverless",
                LaunchOptions::from_provider(&provider),
                CapturePlan::network_idle(args.navigation_timeout())
                    .wait_for(LISTING_SELECTOR, args.selector_wait()),
            ))
        }
    };
    Ok(renderer)
}
