//! In-memory [`QueryService`] driven by a fixed script of states.
//!
//! Every submitted job replays the same state sequence, one entry per
//! `get_state` call; the last entry repeats once the script is exhausted.

use std::{
    collections::HashMap,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use mnt_model::{JobId, QueryState, QueryStatus, RawResults};
use tokio::time::Instant;

use crate::{QueryRequest, QueryService, ServiceError};

pub struct ScriptedQueryService {
    script: Vec<QueryStatus>,
    results: RawResults,
    cursors: Mutex<HashMap<JobId, usize>>,
    requests: Mutex<Vec<QueryRequest>>,
    polls: Mutex<Vec<Instant>>,
    submits: AtomicUsize,
    result_fetches: AtomicUsize,
}

impl ScriptedQueryService {
    /// Jobs that go straight to `SUCCEEDED` and return `results`.
    pub fn new(results: RawResults) -> Self {
        Self {
            script: vec![QueryStatus::new(QueryState::Succeeded)],
            results,
            cursors: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            polls: Mutex::new(Vec::new()),
            submits: AtomicUsize::new(0),
            result_fetches: AtomicUsize::new(0),
        }
    }

    /// Replace the state script. An empty script is ignored.
    pub fn with_script(mut self, script: impl IntoIterator<Item = QueryStatus>) -> Self {
        let script: Vec<_> = script.into_iter().collect();
        if !script.is_empty() {
            self.script = script;
        }
        self
    }

    /// Number of `submit` calls seen.
    pub fn submit_count(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    /// Number of `get_state` calls seen.
    pub fn poll_count(&self) -> usize {
        lock(&self.polls).len()
    }

    /// Number of `get_results` calls seen.
    pub fn result_fetch_count(&self) -> usize {
        self.result_fetches.load(Ordering::SeqCst)
    }

    /// Instants at which `get_state` was called, in order.
    pub fn poll_instants(&self) -> Vec<Instant> {
        lock(&self.polls).clone()
    }

    pub fn last_request(&self) -> Option<QueryRequest> {
        lock(&self.requests).last().cloned()
    }
}

#[async_trait]
impl QueryService for ScriptedQueryService {
    async fn submit(&self, request: &QueryRequest) -> Result<JobId, ServiceError> {
        let n = self.submits.fetch_add(1, Ordering::SeqCst);
        lock(&self.requests).push(request.clone());

        let id = JobId::from(format!("scripted-{n}"));
        lock(&self.cursors).insert(id.clone(), 0);
        Ok(id)
    }

    async fn get_state(&self, id: &JobId) -> Result<QueryStatus, ServiceError> {
        lock(&self.polls).push(Instant::now());

        let mut cursors = lock(&self.cursors);
        let cursor = cursors
            .get_mut(id)
            .ok_or_else(|| ServiceError::Rejected(format!("unknown job: {id}")))?;

        let idx = (*cursor).min(self.script.len() - 1);
        *cursor += 1;
        Ok(self.script[idx].clone())
    }

    async fn get_results(&self, id: &JobId) -> Result<RawResults, ServiceError> {
        self.result_fetches.fetch_add(1, Ordering::SeqCst);
        if !lock(&self.cursors).contains_key(id) {
            return Err(ServiceError::Rejected(format!("unknown job: {id}")));
        }
        Ok(self.results.clone())
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
