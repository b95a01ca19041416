use std::sync::Arc;

use async_trait::async_trait;
use mnt_core::QueryOrchestrator;
use mnt_model::ResultSet;
use mnt_stream::StreamHandle;

use crate::error::ApiError;
use crate::handler::DashboardHandler;

/// Adapter that bridges the query orchestrator and the stream controller to
/// [`DashboardHandler`].
pub struct DashboardAdapter {
    orchestrator: Arc<QueryOrchestrator>,
    stream: StreamHandle,
}

impl DashboardAdapter {
    pub fn new(orchestrator: Arc<QueryOrchestrator>, stream: StreamHandle) -> Self {
        Self {
            orchestrator,
            stream,
        }
    }
}

#[async_trait]
impl DashboardHandler for DashboardAdapter {
    async fn search(&self, keyword: &str) -> Result<ResultSet, ApiError> {
        self.orchestrator.search(keyword).await.map_err(ApiError::from)
    }

    async fn toggle_stream(&self) -> Result<bool, ApiError> {
        self.stream.toggle().await.map_err(ApiError::from)
    }

    async fn stream_status(&self) -> Result<bool, ApiError> {
        self.stream.status().await.map_err(ApiError::from)
    }
}
