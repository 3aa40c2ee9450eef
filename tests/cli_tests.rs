//! E2E tests for the job-scrape CLI

#![allow(deprecated)] // cargo_bin deprecation - will update when assert_cmd stabilizes replacement

use assert_cmd::Command;
use predicates::prelude::*;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACME_PAGE: &str = include_str!("fixtures/acme_search.html");

fn job_scrape() -> Command {
    let mut cmd = Command::cargo_bin("job-scrape").unwrap();
    for var in ["RENDERER", "SITE_ORIGIN", "USER_AGENT", "CHROMIUM_PATH", "PORT", "HOST"] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help() {
    job_scrape()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("scrape"));
}

#[test]
fn test_version() {
    job_scrape()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("job-scrape"));
}

#[test]
fn test_serve_help() {
    job_scrape()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--renderer"))
        .stdout(predicate::str::contains("--chromium-path"));
}

#[test]
fn test_scrape_help() {
    job_scrape()
        .args(["scrape", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--company"))
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("--selector-timeout"));
}

#[test]
fn test_scrape_no_company() {
    job_scrape()
        .arg("scrape")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Company parameter is required."))
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_scrape_blank_company() {
    job_scrape()
        .args(["scrape", "--company", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_unknown_renderer_rejected() {
    job_scrape()
        .args(["scrape", "--company", "Acme", "--renderer", "puppeteer"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("puppeteer"));
}

#[test]
fn test_invalid_port_rejected() {
    job_scrape()
        .args(["serve", "--port", "70000"])
        .assert()
        .failure();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_scrape_fetch_prints_json() {
    let origin = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Job/jobs.htm"))
        .and(query_param("sc.keyword", "Acme Jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ACME_PAGE))
        .mount(&origin)
        .await;
    let uri = origin.uri();

    job_scrape()
        .args(["scrape", "--company", "Acme", "--site-origin", uri.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""title":"Backend Engineer""#))
        .stdout(predicate::str::contains(r#""title":"Site Reliability Engineer""#))
        .stdout(predicate::str::contains("Data Analyst").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_scrape_upstream_error_fails() {
    let origin = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&origin)
        .await;
    let uri = origin.uri();

    job_scrape()
        .args(["scrape", "--company", "Acme", "--site-origin", uri.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to scrape listings for Acme"));
}

#[test]
fn test_serverless_missing_binary_fails() {
    job_scrape()
        .args([
            "scrape",
            "--company",
            "Acme",
            "--renderer",
            "serverless",
            "--chromium-path",
            "/nonexistent/chromium",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("browser executable not found"));
}
