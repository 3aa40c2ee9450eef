//! job-scrape CLI
//!
//! Scrapes job listings for a company from a job-search site, either as an
//! HTTP service or as a one-shot command.

use anyhow::Result;
use clap::{Parser, Subcommand};
use job_scrape::scrape::{run_scrape, ScrapeArgs};
use job_scrape::server::{run_serve, ServeArgs};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "job-scrape")]
#[command(version)]
#[command(about = "Scrape job listings for a company as JSON")]
#[command(long_about = "Renders a job-search results page (plain fetch or headless Chrome) and extracts listing titles, locations and links.\n\nCommands:\n  serve    Run the HTTP endpoint (GET /scrape?company=...)\n  scrape   Scrape once and print JSON to stdout")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP scraping endpoint
    Serve(ServeArgs),
    /// Scrape listings for one company and print them as JSON
    Scrape(ScrapeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("job_scrape=info")),
        )
        .init();

    match cli.command {
        Commands::Serve(args) => run_serve(args).await,
        Commands::Scrape(args) => run_scrape(args).await,
    }
}
