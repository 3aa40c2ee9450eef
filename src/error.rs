//! Error types for page acquisition and query validation

use std::time::Duration;
use thiserror::Error;

/// Failure while acquiring the rendered HTML of a search page
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("browser executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} timed out after {}ms", timeout.as_millis())]
    NavigationTimeout { url: String, timeout: Duration },

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("selector `{selector}` did not appear within {}ms", timeout.as_millis())]
    SelectorTimeout { selector: String, timeout: Duration },

    #[error("failed to capture page content: {0}")]
    Capture(String),

    #[error("failed to close browser: {0}")]
    Close(String),
}

impl RenderError {
    /// Short machine-friendly label, used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            RenderError::Http(_) => "http",
            RenderError::Status { .. } => "status",
            RenderError::ExecutableNotFound(_) => "executable_not_found",
            RenderError::Launch(_) => "launch",
            RenderError::NavigationTimeout { .. } => "navigation_timeout",
            RenderError::Navigation(_) => "navigation",
            RenderError::SelectorTimeout { .. } => "selector_timeout",
            RenderError::Capture(_) => "capture",
            RenderError::Close(_) => "close",
        }
    }
}

/// Invalid caller input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Company parameter is required.")]
    MissingCompany,
}
