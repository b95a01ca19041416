use std::time::Duration;

use mnt_model::ModelError;
use thiserror::Error;

/// Failure talking to a remote collaborator.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Network or timeout problem; the request may not have reached the service.
    #[error("transient collaborator error: {0}")]
    Transient(String),

    /// The service understood the request and refused it.
    #[error("request rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    RemoteFailure(String),

    #[error("transient io error: {0}")]
    TransientIo(String),

    #[error("query did not reach a terminal state within {0:?}")]
    DeadlineExceeded(Duration),
}

impl From<ServiceError> for QueryError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Transient(msg) => QueryError::TransientIo(msg),
            ServiceError::Rejected(msg) => QueryError::RemoteFailure(msg),
        }
    }
}

impl From<ModelError> for QueryError {
    fn from(e: ModelError) -> Self {
        QueryError::RemoteFailure(format!("service reported {e}"))
    }
}
