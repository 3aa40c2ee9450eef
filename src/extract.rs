//! Job listing extraction from rendered search pages
//!
//! The selectors below track the search page markup and need updating
//! whenever the site changes it.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

/// One job card on the results page
pub const LISTING_SELECTOR: &str = "li.react-job-listing";
const TITLE_SELECTOR: &str = r#"a[data-test="job-title"]"#;
const LOCATION_SELECTOR: &str = r#"div[data-test="location"]"#;

/// A single job listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    pub title: String,
    pub location: String,
    pub link: String,
}

/// Listings found on one page, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub jobs: Vec<JobListing>,
}

impl ScrapeResult {
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Extract listings from rendered HTML. Never fails: no matches is an empty result.
pub fn extract_jobs(html: &str, base: &Url) -> ScrapeResult {
    let (Ok(listing), Ok(title), Ok(location)) = (
        Selector::parse(LISTING_SELECTOR),
        Selector::parse(TITLE_SELECTOR),
        Selector::parse(LOCATION_SELECTOR),
    ) else {
        return ScrapeResult::default();
    };

    let doc = Html::parse_document(html);
    let jobs = doc
        .select(&listing)
        .filter_map(|card| {
            let title_el = card.select(&title).next()?;
            let location_el = card.select(&location).next()?;
            Some(JobListing {
                title: text_of(title_el),
                location: text_of(location_el),
                link: resolve_link(base, title_el.value().attr("href")),
            })
        })
        .collect();

    ScrapeResult { jobs }
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Resolve an href against the site origin; a missing or unparseable href
/// falls back to the origin itself
fn resolve_link(base: &Url, href: Option<&str>) -> String {
    href.and_then(|h| base.join(h.trim()).ok())
        .unwrap_or_else(|| base.clone())
        .to_string()
}
