//! scrape command: render a search page and extract its job listings
//!
//! The same pipeline backs the HTTP endpoint and the one-shot CLI.

use crate::config::RenderArgs;
use crate::error::RenderError;
use crate::extract::{extract_jobs, ScrapeResult};
use crate::render::{build_renderer, Renderer};
use crate::site::{JobSite, SearchQuery};
use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Args)]
pub struct ScrapeArgs {
    /// Company to search listings for
    #[arg(long, short)]
    pub company: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    #[command(flatten)]
    pub render: RenderArgs,
}

/// Renderer, target site and User-Agent for one deployment.
/// Holds no per-request state, so it is shared freely across requests.
pub struct JobScraper {
    renderer: Arc<dyn Renderer>,
    site: JobSite,
    user_agent: String,
}

impl JobScraper {
    pub fn new(renderer: Arc<dyn Renderer>, site: JobSite, user_agent: impl Into<String>) -> Self {
        Self {
            renderer,
            site,
            user_agent: user_agent.into(),
        }
    }

    pub fn from_args(args: &RenderArgs) -> Result<Self> {
        Ok(Self::new(
            build_renderer(args)?,
            args.site(),
            args.user_agent.clone(),
        ))
    }

    pub fn renderer_name(&self) -> &'static str {
        self.renderer.name()
    }

    /// Render the search page for `query` and extract its listings
    pub async fn scrape(&self, query: &SearchQuery) -> Result<ScrapeResult, RenderError> {
        let url = self.site.search_url(query);
        info!(
            company = query.company(),
            renderer = self.renderer.name(),
            %url,
            "scraping"
        );

        let html = self.renderer.render(&url, &self.user_agent).await?;
        let result = extract_jobs(&html, self.site.origin());

        if result.is_empty() {
            warn!(
                company = query.company(),
                html_len = html.len(),
                "no listings found; the page markup may have changed or the request was blocked"
            );
        } else {
            info!(company = query.company(), jobs = result.jobs.len(), "scraped listings");
        }

        Ok(result)
    }
}

/// Run the scrape command
pub async fn run_scrape(args: ScrapeArgs) -> Result<()> {
    let query = match SearchQuery::parse(args.company.as_deref()) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Usage:");
            eprintln!("  job-scrape scrape --company <NAME>");
            std::process::exit(1);
        }
    };

    let scraper = JobScraper::from_args(&args.render)?;
    let result = scraper
        .scrape(&query)
        .await
        .with_context(|| format!("Failed to scrape listings for {}", query.company()))?;

    let output = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use url::Url;

    struct StaticRenderer {
        html: &'static str,
        seen: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Renderer for StaticRenderer {
        async fn render(&self, url: &Url, user_agent: &str) -> Result<String, RenderError> {
            self.seen
                .lock()
                .unwrap()
                .push((url.to_string(), user_agent.to_string()));
            Ok(self.html.to_string())
        }

        fn name(&self) -> &'static str {
            "static"
        }
    }

    #[tokio::test]
    async fn test_scrape_passes_url_and_agent() {
        let renderer = Arc::new(StaticRenderer {
            html: r#"<li class="react-job-listing">
                <a data-test="job-title" href="/j/1">Dev</a>
                <div data-test="location">Remote</div>
            </li>"#,
            seen: Mutex::new(Vec::new()),
        });
        let scraper = JobScraper::new(renderer.clone(), JobSite::default(), "ua/2");

        let result = scraper
            .scrape(&SearchQuery::parse(Some("Acme")).unwrap())
            .await
            .unwrap();

        assert_eq!(result.jobs.len(), 1);
        assert_eq!(result.jobs[0].link, "https://www.glassdoor.com.br/j/1");
        let seen = renderer.seen.lock().unwrap();
        assert_eq!(
            seen[0],
            (
                "https://www.glassdoor.com.br/Job/jobs.htm?sc.keyword=Acme%20Jobs".to_string(),
                "ua/2".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_scrape_empty_page() {
        let renderer = Arc::new(StaticRenderer {
            html: "<html><body>captcha</body></html>",
            seen: Mutex::new(Vec::new()),
        });
        let scraper = JobScraper::new(renderer, JobSite::default(), "ua");
        let result = scraper
            .scrape(&SearchQuery::parse(Some("Acme")).unwrap())
            .await
            .unwrap();
        assert!(result.is_empty());
    }
}
