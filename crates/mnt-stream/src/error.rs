use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("ingestion rejected record: {0}")]
    Rejected(String),

    #[error("ingestion transport failed: {0}")]
    Transport(String),

    #[error("ingestion timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("missing stream name in configuration")]
    MissingStreamName,

    #[error("invalid stream config: {0}")]
    InvalidConfig(String),

    #[error("stream controller is not running")]
    Closed,
}
