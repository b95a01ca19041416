use std::sync::Arc;

use mnt_model::{QueryJob, ResultSet};
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use crate::{
    error::QueryError,
    materialize::materialize,
    metrics::{MetricsHandle, NoopMetrics, QueryOutcome},
    poller::{PollConfig, QueryStatusPoller},
    search::SearchQuery,
    service::{QueryRequest, QueryService},
};

#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub database: String,
    pub table: String,
    /// Result location handed to the service with every submission.
    pub output_location: String,
    pub poll: PollConfig,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            database: "crat1".to_string(),
            table: "mri_logs".to_string(),
            output_location: String::new(),
            poll: PollConfig::default(),
        }
    }
}

impl QueryConfig {
    /// `database.table` as written into the query text.
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.database, self.table)
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [("database", &self.database), ("table", &self.table)] {
            if value.is_empty() {
                return Err(format!("{name} cannot be empty"));
            }
            if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(format!("{name} must be a plain identifier, got '{value}'"));
            }
        }
        if self.poll.interval.is_zero() {
            return Err("poll interval must be positive".into());
        }
        Ok(())
    }
}

/// Entry point of the query path: term in, materialized rows out.
pub struct QueryOrchestrator {
    service: Arc<dyn QueryService>,
    poller: QueryStatusPoller,
    config: QueryConfig,
    metrics: MetricsHandle,
}

impl QueryOrchestrator {
    pub fn new(service: Arc<dyn QueryService>, config: QueryConfig) -> Self {
        let poller = QueryStatusPoller::new(Arc::clone(&service), config.poll);
        Self {
            service,
            poller,
            config,
            metrics: Arc::new(NoopMetrics),
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.poller = self.poller.with_metrics(Arc::clone(&metrics));
        self.metrics = metrics;
        self
    }

    #[inline]
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Search the telemetry table for `term`.
    ///
    /// Blank terms fail with [`QueryError::InvalidInput`] before anything is sent.
    /// Each call owns its job and poll loop; concurrent searches do not interact.
    #[instrument(level = "debug", skip(self))]
    pub async fn search(&self, term: &str) -> Result<ResultSet, QueryError> {
        let started = Instant::now();
        let result = self.run(term).await;
        self.metrics
            .query_finished(QueryOutcome::of(&result), started.elapsed());
        result
    }

    async fn run(&self, term: &str) -> Result<ResultSet, QueryError> {
        let search = SearchQuery::new(self.config.qualified_table(), term)?;
        let request = QueryRequest::new(
            search,
            &self.config.database,
            &self.config.output_location,
        );

        info!(query = %request.text, "executing search query");
        let id = self.service.submit(&request).await?;
        self.metrics.query_submitted();

        let job = QueryJob::submitted(id, request.text);
        let job = self.poller.await_terminal(job).await?;

        let raw = self.service.get_results(&job.id).await?;
        let rows = materialize(raw.columns, raw.rows);
        debug!(job_id = %job.id, rows = rows.len(), "search results materialized");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mnt_model::{QueryState, QueryStatus, RawResults};

    use super::*;
    use crate::memory::ScriptedQueryService;

    fn three_rows() -> RawResults {
        let cell = |s: &str| Some(s.to_string());
        RawResults {
            columns: vec!["timestamp".into(), "machine_id".into(), "status".into()],
            rows: vec![
                vec![cell("1700000000"), cell("MRI_001"), cell("Error")],
                vec![cell("1700000005"), cell("MRI_002"), None],
                vec![cell("1700000010"), cell("MRI_003"), cell("Idle")],
            ],
        }
    }

    fn orchestrator(service: &Arc<ScriptedQueryService>) -> QueryOrchestrator {
        QueryOrchestrator::new(service.clone(), QueryConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn search_materializes_rows_in_column_order() {
        let service = Arc::new(ScriptedQueryService::new(three_rows()).with_script([
            QueryStatus::new(QueryState::Queued),
            QueryStatus::new(QueryState::Running),
            QueryStatus::new(QueryState::Succeeded),
        ]));

        let rows = orchestrator(&service).search("error").await.unwrap();

        assert_eq!(rows.len(), 3);
        for row in rows.rows() {
            assert_eq!(
                row.keys().collect::<Vec<_>>(),
                vec!["timestamp", "machine_id", "status"]
            );
        }
        assert_eq!(rows.rows()[1].get("status"), Some(""));
        assert_eq!(service.submit_count(), 1);
        assert_eq!(service.result_fetch_count(), 1);
    }

    #[tokio::test]
    async fn search_embeds_normalized_term() {
        let service = Arc::new(ScriptedQueryService::new(three_rows()));

        orchestrator(&service).search("  MRI'01 ").await.unwrap();

        let request = service.last_request().unwrap();
        assert_eq!(request.database, "crat1");
        assert_eq!(request.search.keyword(), "mri'01");
        assert!(request.text.contains("FROM crat1.mri_logs"));
        assert!(request.text.contains("LOWER(machine_id) LIKE '%mri''01%'"));
    }

    #[tokio::test]
    async fn blank_term_makes_no_remote_call() {
        let service = Arc::new(ScriptedQueryService::new(three_rows()));
        let orchestrator = orchestrator(&service);

        for term in ["", "  ", "\t"] {
            let err = orchestrator.search(term).await.unwrap_err();
            assert!(matches!(err, QueryError::InvalidInput(_)));
        }
        assert_eq!(service.submit_count(), 0);
        assert_eq!(service.poll_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_query_skips_result_fetch() {
        let service = Arc::new(ScriptedQueryService::new(three_rows()).with_script([
            QueryStatus::new(QueryState::Running),
            QueryStatus::new(QueryState::Failed).with_reason("table not found"),
        ]));

        let err = orchestrator(&service).search("error").await.unwrap_err();

        assert!(matches!(err, QueryError::RemoteFailure(ref m) if m.ends_with("table not found")));
        assert_eq!(service.result_fetch_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_searches_run_independently() {
        let service = Arc::new(ScriptedQueryService::new(three_rows()).with_script([
            QueryStatus::new(QueryState::Running),
            QueryStatus::new(QueryState::Succeeded),
        ]));
        let orchestrator = Arc::new(orchestrator(&service));

        let started = Instant::now();
        let (a, b) = tokio::join!(orchestrator.search("a"), orchestrator.search("b"));

        assert_eq!(a.unwrap().len(), 3);
        assert_eq!(b.unwrap().len(), 3);
        assert_eq!(service.submit_count(), 2);
        // Both waits overlap instead of queueing behind each other.
        assert!(started.elapsed() < Duration::from_millis(2_000));
    }

    #[test]
    fn config_rejects_non_identifier_table() {
        let config = QueryConfig {
            table: "logs; DROP TABLE x".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(QueryConfig::default().validate().is_ok());
    }
}
