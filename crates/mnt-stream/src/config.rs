use std::time::Duration;

use crate::error::StreamError;

#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Target stream on the ingestion service. Checked when streaming starts.
    pub stream_name: String,
    /// Emission period.
    pub period: Duration,
    /// Upper bound for one `put`; a slower delivery counts as failed.
    pub ingest_timeout: Duration,
    /// Capacity of the controller's command queue.
    pub mailbox: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            stream_name: String::new(),
            period: Duration::from_millis(5_000),
            ingest_timeout: Duration::from_millis(4_000),
            mailbox: 32,
        }
    }
}

impl StreamConfig {
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.period.is_zero() {
            return Err(StreamError::InvalidConfig("period must be positive".into()));
        }
        if self.ingest_timeout.is_zero() {
            return Err(StreamError::InvalidConfig(
                "ingest timeout must be positive".into(),
            ));
        }
        if self.mailbox == 0 {
            return Err(StreamError::InvalidConfig("mailbox must be positive".into()));
        }
        Ok(())
    }
}
