//! Direct HTTP fetch renderer
//!
//! Returns the raw response body. No scripts run, so listings rendered
//! client-side will be missing.

use crate::error::RenderError;
use crate::render::Renderer;
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub struct FetchRenderer {
    client: reqwest::Client,
}

impl FetchRenderer {
    pub fn new(timeout: Duration) -> Result<Self, RenderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Renderer for FetchRenderer {
    async fn render(&self, url: &Url, user_agent: &str) -> Result<String, RenderError> {
        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "fetched page");
        Ok(body)
    }

    fn name(&self) -> &'static str {
        "fetch"
    }
}
