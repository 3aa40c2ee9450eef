//! job-scrape: job listing scraper with interchangeable page renderers
//!
//! Commands:
//! - serve: HTTP endpoint returning listings for a company as JSON
//! - scrape: one-shot scrape printed to stdout

pub mod browser;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod provider;
pub mod render;
pub mod scrape;
pub mod server;
pub mod site;

pub use config::{RenderArgs, RendererKind};
pub use error::{QueryError, RenderError};
pub use extract::{extract_jobs, JobListing, ScrapeResult};
pub use render::Renderer;
pub use scrape::JobScraper;
pub use site::{JobSite, SearchQuery};
