use std::{sync::Arc, time::Duration};

use mnt_model::{QueryJob, QueryState};
use tracing::{error, instrument, trace};

use crate::{
    error::QueryError,
    metrics::{MetricsHandle, NoopMetrics},
    service::QueryService,
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Pause between two state checks.
    pub interval: Duration,
    /// Upper bound on the whole wait. `None` polls until a terminal state arrives.
    pub deadline: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            deadline: None,
        }
    }
}

/// Drives a submitted job to a terminal state.
///
/// The wait between checks is a timer suspension, so many pollers share one
/// runtime without blocking each other. Dropping the returned future stops polling.
pub struct QueryStatusPoller {
    service: Arc<dyn QueryService>,
    config: PollConfig,
    metrics: MetricsHandle,
}

impl QueryStatusPoller {
    pub fn new(service: Arc<dyn QueryService>, config: PollConfig) -> Self {
        Self {
            service,
            config,
            metrics: Arc::new(NoopMetrics),
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    #[inline]
    pub fn config(&self) -> PollConfig {
        self.config
    }

    /// Poll until `job` is terminal.
    ///
    /// Returns the job on `SUCCEEDED`; `FAILED` and `CANCELLED` become
    /// [`QueryError::RemoteFailure`] carrying the service's reason. Collaborator
    /// errors end the wait immediately, nothing is retried.
    #[instrument(level = "debug", skip(self, job), fields(job_id = %job.id))]
    pub async fn await_terminal(&self, job: QueryJob) -> Result<QueryJob, QueryError> {
        match self.config.deadline {
            Some(limit) => tokio::time::timeout(limit, self.poll(job))
                .await
                .map_err(|_| QueryError::DeadlineExceeded(limit))?,
            None => self.poll(job).await,
        }
    }

    async fn poll(&self, mut job: QueryJob) -> Result<QueryJob, QueryError> {
        let mut attempt: u32 = 0;
        loop {
            let status = self.service.get_state(&job.id).await?;
            attempt += 1;
            self.metrics.poll_tick();
            job.advance(&status)?;
            trace!(attempt, state = %job.state, "query state polled");

            match job.state {
                QueryState::Queued | QueryState::Running => {
                    tokio::time::sleep(self.config.interval).await;
                }
                QueryState::Succeeded => return Ok(job),
                QueryState::Failed | QueryState::Cancelled => {
                    let reason = match job.failure_reason.clone() {
                        Some(reason) => reason,
                        None => self
                            .service
                            .get_state(&job.id)
                            .await?
                            .reason
                            .unwrap_or_else(|| "no reason reported".to_string()),
                    };
                    error!(state = %job.state, %reason, "query failed");
                    return Err(QueryError::RemoteFailure(format!(
                        "query failed: {} - {}",
                        job.state, reason
                    )));
                }
            }
        }
    }
}
