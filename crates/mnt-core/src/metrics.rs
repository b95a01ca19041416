use std::{sync::Arc, time::Duration};

use crate::error::QueryError;

/// How a search request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    Succeeded,
    InvalidInput,
    RemoteFailure,
    Transient,
    DeadlineExceeded,
}

impl QueryOutcome {
    pub fn of<T>(result: &Result<T, QueryError>) -> Self {
        match result {
            Ok(_) => QueryOutcome::Succeeded,
            Err(QueryError::InvalidInput(_)) => QueryOutcome::InvalidInput,
            Err(QueryError::RemoteFailure(_)) => QueryOutcome::RemoteFailure,
            Err(QueryError::TransientIo(_)) => QueryOutcome::Transient,
            Err(QueryError::DeadlineExceeded(_)) => QueryOutcome::DeadlineExceeded,
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            QueryOutcome::Succeeded => "succeeded",
            QueryOutcome::InvalidInput => "invalid_input",
            QueryOutcome::RemoteFailure => "remote_failure",
            QueryOutcome::Transient => "transient",
            QueryOutcome::DeadlineExceeded => "deadline_exceeded",
        }
    }
}

/// Metrics sink for the query path.
///
/// All hooks default to no-ops so backends only override what they record.
pub trait MetricsBackend: Send + Sync + 'static {
    fn query_submitted(&self) {}
    fn poll_tick(&self) {}
    fn query_finished(&self, _outcome: QueryOutcome, _elapsed: Duration) {}
}

pub type MetricsHandle = Arc<dyn MetricsBackend>;

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsBackend for NoopMetrics {}
