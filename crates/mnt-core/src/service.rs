use async_trait::async_trait;
use mnt_model::{JobId, QueryStatus, RawResults};

use crate::{error::ServiceError, search::SearchQuery};

/// A query ready for submission.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    /// Rendered query text.
    pub text: String,
    pub database: String,
    /// Where the service writes result files.
    pub output_location: String,
    /// Structured form of `text`, for services that evaluate filters themselves.
    pub search: SearchQuery,
}

impl QueryRequest {
    pub fn new(
        search: SearchQuery,
        database: impl Into<String>,
        output_location: impl Into<String>,
    ) -> Self {
        Self {
            text: search.render(),
            database: database.into(),
            output_location: output_location.into(),
            search,
        }
    }
}

/// Remote ad-hoc query service.
///
/// Implementations wrap the managed service client; the orchestrator only
/// drives submission, state polling and result retrieval through this trait.
#[async_trait]
pub trait QueryService: Send + Sync + 'static {
    /// Start executing `request`, returning the service's job handle.
    async fn submit(&self, request: &QueryRequest) -> Result<JobId, ServiceError>;

    /// Fetch the authoritative execution state of a job.
    async fn get_state(&self, id: &JobId) -> Result<QueryStatus, ServiceError>;

    /// Fetch the tabular results of a succeeded job.
    async fn get_results(&self, id: &JobId) -> Result<RawResults, ServiceError>;
}
