//! In-process stand-in for the ingestion stream and the query warehouse.
//!
//! Emitted records land in a bounded buffer; searches are evaluated against
//! that buffer with the same case-insensitive substring filter the rendered
//! query text expresses.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use mnt_core::{COLUMNS, MatchField, QueryRequest, QueryService, ROW_LIMIT, ServiceError};
use mnt_model::{JobId, QueryState, QueryStatus, RawResults, RawRow, TelemetryRecord};
use mnt_stream::{IngestError, IngestSink};
use tracing::{debug, trace};
use uuid::Uuid;

/// Unfetched results kept before the oldest are dropped.
pub const PENDING_JOBS: usize = 64;

pub struct LocalWarehouse {
    capacity: usize,
    records: Mutex<VecDeque<TelemetryRecord>>,
    jobs: Mutex<Jobs>,
}

/// Finished jobs awaiting their fetch, oldest first.
#[derive(Default)]
struct Jobs {
    order: VecDeque<JobId>,
    results: HashMap<JobId, RawResults>,
}

impl Jobs {
    fn insert(&mut self, id: JobId, results: RawResults) {
        while self.order.len() >= PENDING_JOBS {
            if let Some(old) = self.order.pop_front() {
                self.results.remove(&old);
                debug!(job_id = %old, "unfetched query results dropped");
            }
        }
        self.order.push_back(id.clone());
        self.results.insert(id, results);
    }

    fn take(&mut self, id: &JobId) -> Option<RawResults> {
        let results = self.results.remove(id)?;
        self.order.retain(|j| j != id);
        Some(results)
    }
}

impl LocalWarehouse {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity)),
            jobs: Mutex::new(Jobs::default()),
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    /// Matching rows, newest record first, at most [`ROW_LIMIT`].
    fn evaluate(&self, request: &QueryRequest) -> RawResults {
        let records = lock(&self.records);
        let rows = records
            .iter()
            .rev()
            .filter(|r| {
                let timestamp = r.timestamp.to_string();
                request.search.matches_any([
                    (MatchField::Status, r.status.as_str()),
                    (MatchField::MachineId, r.machine_id.as_str()),
                    (MatchField::ErrorCode, r.error_code.as_str()),
                    (MatchField::Timestamp, timestamp.as_str()),
                ])
            })
            .take(ROW_LIMIT)
            .map(to_row)
            .collect();

        RawResults {
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }
}

fn to_row(r: &TelemetryRecord) -> RawRow {
    vec![
        Some(r.timestamp.to_string()),
        Some(r.machine_id.clone()),
        Some(r.error_code.clone()),
        Some(r.status.to_string()),
        Some(r.message.clone()),
        Some(r.start_time.to_string()),
        Some(r.end_time.to_string()),
        Some(r.runtime_seconds.to_string()),
        Some(r.resolved.to_string()),
    ]
}

#[async_trait]
impl IngestSink for LocalWarehouse {
    async fn put(&self, stream: &str, data: Vec<u8>, partition_key: &str) -> Result<(), IngestError> {
        let record: TelemetryRecord = serde_json::from_slice(&data)
            .map_err(|e| IngestError::Rejected(format!("malformed record: {e}")))?;

        let mut records = lock(&self.records);
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(record);
        trace!(stream, partition_key, retained = records.len(), "record stored");
        Ok(())
    }
}

#[async_trait]
impl QueryService for LocalWarehouse {
    async fn submit(&self, request: &QueryRequest) -> Result<JobId, ServiceError> {
        let results = self.evaluate(request);
        let id = JobId::from(Uuid::new_v4().to_string());
        debug!(job_id = %id, rows = results.rows.len(), "local query evaluated");

        lock(&self.jobs).insert(id.clone(), results);
        Ok(id)
    }

    async fn get_state(&self, id: &JobId) -> Result<QueryStatus, ServiceError> {
        if lock(&self.jobs).results.contains_key(id) {
            Ok(QueryStatus::new(QueryState::Succeeded))
        } else {
            Err(ServiceError::Rejected(format!("unknown query execution: {id}")))
        }
    }

    /// Results are handed out once; the job is forgotten afterwards.
    async fn get_results(&self, id: &JobId) -> Result<RawResults, ServiceError> {
        lock(&self.jobs)
            .take(id)
            .ok_or_else(|| ServiceError::Rejected(format!("unknown query execution: {id}")))
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
