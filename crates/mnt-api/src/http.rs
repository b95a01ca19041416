use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
    routing::{get, post},
};
use mnt_model::ResultSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::ApiError, handler::DashboardHandler};

/// HTTP API service builder.
pub struct HttpApi<H> {
    handler: Arc<H>,
}

impl<H> HttpApi<H>
where
    H: DashboardHandler,
{
    /// Create new HTTP API with the given handler.
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    /// Build axum router with mounted endpoints.
    ///
    /// Routes:
    /// - POST /api/search-athena - Search telemetry by keyword
    /// - POST /api/toggle-stream - Start or stop synthetic streaming
    /// - GET /api/stream - Current streaming flag
    /// - GET /test - Liveness check
    pub fn router(self) -> Router {
        Router::new()
            .route("/api/search-athena", post(search::<H>))
            .route("/api/toggle-stream", post(toggle_stream::<H>))
            .route("/api/stream", get(stream_status::<H>))
            .route("/test", get(health))
            .with_state(self.handler)
    }
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchRequest {
    #[serde(default)]
    keyword: Option<String>,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    data: ResultSet,
}

#[derive(Debug, Serialize)]
struct ToggleResponse {
    success: bool,
    streaming: bool,
}

#[derive(Debug, Serialize)]
struct StreamStatusResponse {
    streaming: bool,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    message: &'static str,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/search-athena
async fn search<H>(
    State(handler): State<Arc<H>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    H: DashboardHandler,
{
    let keyword = payload
        .map_err(|e| debug!(error = %e, "unreadable search body"))
        .ok()
        .and_then(|Json(req)| req.keyword)
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("Keyword is required".into()))?;

    let data = handler.search(&keyword).await?;
    debug!(rows = data.len(), "search answered");

    Ok(Json(SearchResponse { data }))
}

/// POST /api/toggle-stream
async fn toggle_stream<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: DashboardHandler,
{
    let streaming = handler.toggle_stream().await?;
    Ok(Json(ToggleResponse {
        success: true,
        streaming,
    }))
}

/// GET /api/stream
async fn stream_status<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: DashboardHandler,
{
    let streaming = handler.stream_status().await?;
    Ok(Json(StreamStatusResponse { streaming }))
}

/// GET /test
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        message: "Server is running",
    })
}
