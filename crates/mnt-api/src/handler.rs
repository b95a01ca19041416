use async_trait::async_trait;
use mnt_model::ResultSet;

use crate::error::ApiError;

/// Dashboard API handler.
///
/// Abstracts the backend so the HTTP layer can be mounted over
/// [`DashboardAdapter`](crate::DashboardAdapter) or a custom implementation
/// (auth, rate limiting, test doubles).
#[async_trait]
pub trait DashboardHandler: Send + Sync + 'static {
    /// Search the telemetry table for `keyword`.
    async fn search(&self, keyword: &str) -> Result<ResultSet, ApiError>;

    /// Flip streaming on or off; returns the new flag.
    async fn toggle_stream(&self) -> Result<bool, ApiError>;

    /// Current streaming flag.
    async fn stream_status(&self) -> Result<bool, ApiError>;
}
