//! Remote query orchestration.
//!
//! A search term is templated into a filter query, submitted to a
//! [`QueryService`], polled until the job is terminal and finally
//! materialized into a [`mnt_model::ResultSet`].

pub mod error;
pub use error::{QueryError, ServiceError};

mod search;
pub use search::{COLUMNS, MatchField, ROW_LIMIT, SearchQuery, escape_literal};

mod service;
pub use service::{QueryRequest, QueryService};

mod poller;
pub use poller::{DEFAULT_POLL_INTERVAL, PollConfig, QueryStatusPoller};

mod materialize;
pub use materialize::materialize;

mod orchestrator;
pub use orchestrator::{QueryConfig, QueryOrchestrator};

mod metrics;
pub use metrics::{MetricsBackend, MetricsHandle, NoopMetrics, QueryOutcome};

pub mod memory;
