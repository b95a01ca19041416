//! Prometheus metrics backend for the MRI telemetry dashboard.
//!
//! [`PrometheusMetrics`] implements both [`mnt_core::MetricsBackend`] (query path)
//! and [`mnt_stream::StreamSubscriber`] (emitter events), so one registry covers
//! the whole service.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use mnt_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let handle: mnt_core::MetricsHandle = Arc::new(metrics.clone());
//!
//! let body = metrics.encode_text()?;
//! assert!(body.contains("mnt_streaming"));
//! # drop(handle);
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `mnt_queries_submitted_total` - Counter
//! - `mnt_queries_total{outcome}` - Counter
//! - `mnt_query_duration_seconds` - Histogram
//! - `mnt_query_polls_total` - Counter
//! - `mnt_records_emitted_total` - Counter
//! - `mnt_ingest_failures_total` - Counter
//! - `mnt_ticks_skipped_total` - Counter
//! - `mnt_emitter_restarts_total` - Counter
//! - `mnt_streaming` - Gauge (1 while the emitter runs)
//!
//! ## HTTP Server
//! This crate does NOT serve `/metrics`; the daemon mounts [`PrometheusMetrics::encode_text`]
//! on its own router.

mod backend;
pub use backend::PrometheusMetrics;

mod error;
pub use error::MetricsError;

pub use prometheus::{Encoder, Registry, TextEncoder};
