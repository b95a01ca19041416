use async_trait::async_trait;
use mnt_model::TelemetryRecord;

use crate::error::IngestError;

/// Durable record-intake service the emitter forwards to.
#[async_trait]
pub trait IngestSink: Send + Sync + 'static {
    /// Put one encoded record on `stream`, routed by `partition_key`.
    async fn put(&self, stream: &str, data: Vec<u8>, partition_key: &str)
    -> Result<(), IngestError>;
}

/// JSON wire encoding of a record.
pub fn encode_record(record: &TelemetryRecord) -> Result<Vec<u8>, IngestError> {
    Ok(serde_json::to_vec(record)?)
}
