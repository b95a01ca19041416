use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, header},
    response::IntoResponse,
    routing::get,
};
use mnt_api::{ApiError, DashboardHandler, HttpApi};
use mnt_prometheus::{Encoder, PrometheusMetrics, TextEncoder};
use tower_http::cors::{Any, CorsLayer};

/// Dashboard API, `/metrics`, and CORS for the configured origin.
pub fn build<H>(
    handler: Arc<H>,
    metrics: PrometheusMetrics,
    allowed_origin: &str,
) -> anyhow::Result<Router>
where
    H: DashboardHandler,
{
    let metrics_routes = Router::new()
        .route("/metrics", get(export_metrics))
        .with_state(metrics);

    Ok(HttpApi::new(handler)
        .router()
        .merge(metrics_routes)
        .layer(cors(allowed_origin)?))
}

fn cors(origin: &str) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if origin == "*" {
        return Ok(layer.allow_origin(Any));
    }
    let origin: HeaderValue = origin.parse()?;
    Ok(layer.allow_origin(origin).allow_credentials(true))
}

/// GET /metrics
async fn export_metrics(
    State(metrics): State<PrometheusMetrics>,
) -> Result<impl IntoResponse, ApiError> {
    let body = metrics
        .encode_text()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let content_type = TextEncoder::new().format_type().to_string();
    Ok(([(header::CONTENT_TYPE, content_type)], body))
}
