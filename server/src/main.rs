//! Job Search API Server
//!
//! Exposes the job board aggregator over HTTP using Axum.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use common::JobListing;
use job_scraper::{Aggregator, HttpFetcher, ScraperConfig, SearchError, SourceRegistry};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Query parameters for the search endpoint
#[derive(Debug, Deserialize)]
struct SearchParams {
    query: Option<String>,
    remote_only: Option<String>,
    after_date: Option<String>,
}

/// Error body returned for non-2xx responses
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Shared application state
struct AppState {
    aggregator: Aggregator,
}

struct ApiError(SearchError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            SearchError::InvalidQuery(reason) => (StatusCode::BAD_REQUEST, reason.to_string()),
            SearchError::Internal(detail) => {
                tracing::error!(error = %detail, "Search failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Handler for GET /api/jobs/search?query=<text>&remote_only=<bool>&after_date=<YYYY-MM-DD>
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<JobListing>>, ApiError> {
    let query = params.query.unwrap_or_default();
    let remote_only = params
        .remote_only
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));

    let jobs = state
        .aggregator
        .search(&query, remote_only, params.after_date.as_deref())
        .await
        .map_err(ApiError)?;

    Ok(Json(jobs))
}

/// Handler for GET / (root)
async fn root_handler() -> &'static str {
    "🔍 Job Search API\n\nEndpoints:\n  GET /api/jobs/search?query=<text>&remote_only=<bool>&after_date=<YYYY-MM-DD>\n\nExample:\n  curl 'http://127.0.0.1:3000/api/jobs/search?query=data%20engineer&remote_only=true'"
}

fn build_router(aggregator: Aggregator) -> Router {
    let state = Arc::new(AppState { aggregator });

    Router::new()
        .route("/", get(root_handler))
        .route("/api/jobs/search", get(search_handler))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server=debug,job_scraper=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Job Search API server");

    // Load .env file if present (development)
    let _ = dotenvy::dotenv();
    let config = ScraperConfig::from_env().context("Failed to load configuration")?;

    let registry = match &config.sources_file {
        Some(path) => SourceRegistry::from_file(path)
            .with_context(|| format!("Failed to load sources from {}", path.display()))?,
        None => SourceRegistry::builtin(),
    };
    tracing::info!(sources = registry.len(), "Source registry loaded");

    let fetcher = HttpFetcher::from_config(&config).context("Failed to create HTTP client")?;
    let aggregator = Aggregator::from_config(&config, Arc::new(registry), Arc::new(fetcher));

    let app = build_router(aggregator);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(addr = %addr, "Server listening");
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
