//! Typed errors for the scraper library.

use common::QueryError;
use thiserror::Error;

/// Failure of a single source. Recovered inside the adapter, never returned
/// from a search.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl SourceError {
    /// Transport failures, rate limiting and server errors are worth another
    /// attempt. Timeouts and client errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Timeout { .. } | Self::Client(_) => false,
        }
    }
}

/// Errors surfaced to the caller of a search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request itself is unusable. Shown to the user as-is.
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] QueryError),

    /// Anything systemic, e.g. a registry target with no adapter.
    /// The message is for logs only.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors loading the source registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read registry file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse registry: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("endpoint {url} must be an absolute http(s) URL")]
    UnsupportedEndpoint { url: String },

    #[error("cannot derive a company name from {url}")]
    NoCompany { url: String },
}

/// Errors reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;

pub type Result<T> = std::result::Result<T, SearchError>;
