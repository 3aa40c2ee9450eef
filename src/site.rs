//! Target site description and search URL construction

use crate::error::QueryError;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

pub const DEFAULT_ORIGIN: &str = "https://www.glassdoor.com.br";

const SEARCH_PATH: &str = "/Job/jobs.htm";
const KEYWORD_PARAM: &str = "sc.keyword";
const KEYWORD_SUFFIX: &str = " Jobs";

/// Characters left unescaped by JavaScript's `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A validated company name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    company: String,
}

impl SearchQuery {
    /// Validate a raw `company` value. Absent or blank input is rejected.
    pub fn parse(company: Option<&str>) -> Result<Self, QueryError> {
        match company.map(str::trim) {
            Some(c) if !c.is_empty() => Ok(Self {
                company: c.to_string(),
            }),
            _ => Err(QueryError::MissingCompany),
        }
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    /// Keyword sent to the search page
    pub fn keyword(&self) -> String {
        format!("{}{}", self.company, KEYWORD_SUFFIX)
    }
}

/// The job-search site listings are scraped from
#[derive(Debug, Clone)]
pub struct JobSite {
    origin: Url,
}

impl JobSite {
    pub fn new(origin: Url) -> Self {
        Self { origin }
    }

    /// Base origin used to resolve relative listing links
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Build the search-results URL for a query
    pub fn search_url(&self, query: &SearchQuery) -> Url {
        let mut url = self.origin.clone();
        url.set_path(SEARCH_PATH);
        // spaces go out as %20, not the form encoding's `+`
        let keyword_raw = query.keyword();
        let keyword = utf8_percent_encode(&keyword_raw, URI_COMPONENT);
        url.set_query(Some(&format!("{}={}", KEYWORD_PARAM, keyword)));
        url
    }
}

impl Default for JobSite {
    fn default() -> Self {
        Self {
            origin: Url::parse(DEFAULT_ORIGIN).expect("default origin is a valid URL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_missing_and_blank() {
        assert_eq!(SearchQuery::parse(None), Err(QueryError::MissingCompany));
        assert_eq!(SearchQuery::parse(Some("")), Err(QueryError::MissingCompany));
        assert_eq!(
            SearchQuery::parse(Some("   ")),
            Err(QueryError::MissingCompany)
        );
    }

    #[test]
    fn test_parse_trims() {
        let q = SearchQuery::parse(Some("  Acme ")).unwrap();
        assert_eq!(q.company(), "Acme");
        assert_eq!(q.keyword(), "Acme Jobs");
    }

    #[test]
    fn test_search_url() {
        let site = JobSite::default();
        let q = SearchQuery::parse(Some("Acme & Sons")).unwrap();
        let url = site.search_url(&q);
        assert_eq!(url.host_str(), Some("www.glassdoor.com.br"));
        assert_eq!(url.path(), "/Job/jobs.htm");
        assert_eq!(url.query(), Some("sc.keyword=Acme%20%26%20Sons%20Jobs"));

        let pairs: Vec<_> = url.query_pairs().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].1, "Acme & Sons Jobs");
    }

    #[test]
    fn test_search_url_custom_origin() {
        let site = JobSite::new(Url::parse("http://127.0.0.1:8080").unwrap());
        let q = SearchQuery::parse(Some("Acme")).unwrap();
        assert_eq!(
            site.search_url(&q).as_str(),
            "http://127.0.0.1:8080/Job/jobs.htm?sc.keyword=Acme%20Jobs"
        );
    }

    #[test]
    fn test_search_url_matches_uri_component_encoding() {
        let site = JobSite::default();
        let q = SearchQuery::parse(Some("Itaú (BR)/Tech+Co")).unwrap();
        assert_eq!(
            site.search_url(&q).query(),
            Some("sc.keyword=Ita%C3%BA%20(BR)%2FTech%2BCo%20Jobs")
        );
    }
}
