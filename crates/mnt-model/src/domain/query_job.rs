use serde::{Deserialize, Serialize};

use crate::{JobId, ModelError, QueryState, QueryStatus};

/// A submitted query tracked until it reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryJob {
    pub id: JobId,
    pub submitted_query: String,
    pub state: QueryState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl QueryJob {
    /// Job freshly accepted by the service.
    pub fn submitted(id: JobId, query: impl Into<String>) -> Self {
        Self {
            id,
            submitted_query: query.into(),
            state: QueryState::Queued,
            failure_reason: None,
        }
    }

    /// Apply an authoritative status snapshot.
    ///
    /// Rejects snapshots that would move the job backwards or out of a terminal state.
    pub fn advance(&mut self, status: &QueryStatus) -> Result<(), ModelError> {
        if !self.state.can_transition_to(status.state) {
            return Err(ModelError::IllegalTransition {
                from: self.state,
                to: status.state,
            });
        }
        self.state = status.state;
        if let Some(reason) = &status.reason {
            self.failure_reason = Some(reason.clone());
        }
        Ok(())
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
