//! serve command: HTTP endpoint for job listing scrapes
//!
//! `GET /scrape?company=<name>` returns `{"jobs": [...]}`. Internal failure
//! details are logged and never sent to the caller.

use crate::config::RenderArgs;
use crate::error::{QueryError, RenderError};
use crate::scrape::JobScraper;
use crate::site::SearchQuery;
use anyhow::{Context, Result};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::Args;
use serde::Serialize;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info};

/// Body returned for any rendering failure
pub const SCRAPE_FAILED: &str = "Failed to scrape Glassdoor.";

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[command(flatten)]
    pub render: RenderArgs,
}

impl ServeArgs {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Handler failures, mapped to status codes in `into_response`
#[derive(Debug)]
pub enum ApiError {
    Invalid(QueryError),
    Render(RenderError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Invalid(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Render(_) => (StatusCode::INTERNAL_SERVER_ERROR, SCRAPE_FAILED.to_string()),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Build the router with permissive CORS
pub fn router(scraper: Arc<JobScraper>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/scrape", get(handle_scrape))
        .layer(cors)
        .with_state(scraper)
}

async fn handle_scrape(
    State(scraper): State<Arc<JobScraper>>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    // first `company` wins; an unreadable query string counts as missing
    let company = match &params {
        Ok(Query(pairs)) => pairs
            .iter()
            .find(|(key, _)| key == "company")
            .map(|(_, value)| value.as_str()),
        Err(rejection) => {
            debug!(error = %rejection, "unreadable query string");
            None
        }
    };
    let query = SearchQuery::parse(company).map_err(ApiError::Invalid)?;

    let result = scraper.scrape(&query).await.map_err(|e| {
        error!(
            company = query.company(),
            kind = e.kind(),
            error = %e,
            "scrape failed"
        );
        ApiError::Render(e)
    })?;

    Ok(Json(result))
}

/// Serve on an already-bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, scraper: Arc<JobScraper>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(scraper))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Run the serve command
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let scraper = Arc::new(JobScraper::from_args(&args.render)?);
    let addr = args.addr();

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(
        %addr,
        renderer = scraper.renderer_name(),
        "scraping server listening"
    );

    serve(listener, scraper, shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_invalid_maps_to_400() {
        let response = ApiError::Invalid(QueryError::MissingCompany).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"error":"Company parameter is required."}"#);
    }

    #[tokio::test]
    async fn test_render_error_is_not_leaked() {
        let err = RenderError::Launch("chrome exited with code 127: /secret/path".to_string());
        let response = ApiError::Render(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"Failed to scrape Glassdoor."}"#);
        assert!(!body.contains("secret"));
    }

    #[test]
    fn test_serve_args_addr() {
        use clap::Parser;

        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            serve: ServeArgs,
        }

        let cli = TestCli::try_parse_from(["test", "--port", "8081", "--host", "127.0.0.1"]).unwrap();
        assert_eq!(cli.serve.addr().to_string(), "127.0.0.1:8081");
    }
}
