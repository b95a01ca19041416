use std::time::Duration;

use mnt_core::{MetricsBackend, QueryOutcome};
use mnt_stream::{StreamEvent, StreamEventKind, StreamSubscriber};
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder, proto::MetricFamily,
};

use crate::error::MetricsError;

const NAMESPACE: &str = "mnt";

#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    queries_submitted: IntCounter,
    queries: IntCounterVec,
    query_duration: Histogram,
    query_polls: IntCounter,
    records_emitted: IntCounter,
    ingest_failures: IntCounter,
    ticks_skipped: IntCounter,
    emitter_restarts: IntCounter,
    streaming: IntGauge,
}

impl PrometheusMetrics {
    /// Fresh metrics on a private registry.
    pub fn new() -> Result<Self, MetricsError> {
        Self::with_registry(Registry::new())
    }

    /// Register every metric on `registry`.
    pub fn with_registry(registry: Registry) -> Result<Self, MetricsError> {
        let queries_submitted = IntCounter::with_opts(
            Opts::new("queries_submitted_total", "Queries accepted by the remote service")
                .namespace(NAMESPACE),
        )?;
        let queries = IntCounterVec::new(
            Opts::new("queries_total", "Search requests by outcome").namespace(NAMESPACE),
            &["outcome"],
        )?;
        let query_duration = Histogram::with_opts(
            HistogramOpts::new(
                "query_duration_seconds",
                "Wall time from search request to materialized rows",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
        )?;
        let query_polls = IntCounter::with_opts(
            Opts::new("query_polls_total", "Job state checks issued").namespace(NAMESPACE),
        )?;
        let records_emitted = IntCounter::with_opts(
            Opts::new("records_emitted_total", "Telemetry records accepted by ingestion")
                .namespace(NAMESPACE),
        )?;
        let ingest_failures = IntCounter::with_opts(
            Opts::new("ingest_failures_total", "Telemetry deliveries that failed")
                .namespace(NAMESPACE),
        )?;
        let ticks_skipped = IntCounter::with_opts(
            Opts::new("ticks_skipped_total", "Emission ticks dropped after an overrun")
                .namespace(NAMESPACE),
        )?;
        let emitter_restarts = IntCounter::with_opts(
            Opts::new("emitter_restarts_total", "Emitter tasks restarted after a crash")
                .namespace(NAMESPACE),
        )?;
        let streaming = IntGauge::with_opts(
            Opts::new("streaming", "1 while the telemetry emitter runs").namespace(NAMESPACE),
        )?;

        registry.register(Box::new(queries_submitted.clone()))?;
        registry.register(Box::new(queries.clone()))?;
        registry.register(Box::new(query_duration.clone()))?;
        registry.register(Box::new(query_polls.clone()))?;
        registry.register(Box::new(records_emitted.clone()))?;
        registry.register(Box::new(ingest_failures.clone()))?;
        registry.register(Box::new(ticks_skipped.clone()))?;
        registry.register(Box::new(emitter_restarts.clone()))?;
        registry.register(Box::new(streaming.clone()))?;

        Ok(Self {
            registry,
            queries_submitted,
            queries,
            query_duration,
            query_polls,
            records_emitted,
            ingest_failures,
            ticks_skipped,
            emitter_restarts,
            streaming,
        })
    }

    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Current values in the Prometheus text exposition format.
    pub fn encode_text(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn query_submitted(&self) {
        self.queries_submitted.inc();
    }

    fn poll_tick(&self) {
        self.query_polls.inc();
    }

    fn query_finished(&self, outcome: QueryOutcome, elapsed: Duration) {
        self.queries.with_label_values(&[outcome.as_label()]).inc();
        if outcome != QueryOutcome::InvalidInput {
            self.query_duration.observe(elapsed.as_secs_f64());
        }
    }
}

impl StreamSubscriber for PrometheusMetrics {
    fn on_event(&self, event: &StreamEvent) {
        match event.kind {
            StreamEventKind::Started => self.streaming.set(1),
            StreamEventKind::Stopped => self.streaming.set(0),
            StreamEventKind::Restarted => self.emitter_restarts.inc(),
            StreamEventKind::Delivered => self.records_emitted.inc(),
            StreamEventKind::DeliveryFailed => self.ingest_failures.inc(),
            StreamEventKind::TickSkipped => {
                self.ticks_skipped.inc_by(u64::from(event.skipped.unwrap_or(1)))
            }
        }
    }

    fn name(&self) -> &'static str {
        "prometheus"
    }
}
