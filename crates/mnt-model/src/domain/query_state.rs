use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Execution state of a remote query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryState {
    /// Accepted by the service, waiting for capacity.
    Queued,
    /// Executing.
    Running,
    /// Finished; results can be fetched.
    Succeeded,
    /// Finished with an error.
    Failed,
    /// Stopped before completion.
    Cancelled,
}

impl QueryState {
    /// Returns `true` if no further transition can occur.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            QueryState::Succeeded | QueryState::Failed | QueryState::Cancelled
        )
    }

    /// Returns `true` while the service is still working on the query.
    pub fn is_active(&self) -> bool {
        matches!(self, QueryState::Queued | QueryState::Running)
    }

    /// Returns `true` if moving from `self` to `next` respects
    /// `QUEUED -> RUNNING -> {SUCCEEDED, FAILED, CANCELLED}`.
    ///
    /// Staying in the same state is allowed (repeated polls), leaving a
    /// terminal state is not.
    pub fn can_transition_to(&self, next: QueryState) -> bool {
        if *self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        next.rank() > self.rank()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryState::Queued => "QUEUED",
            QueryState::Running => "RUNNING",
            QueryState::Succeeded => "SUCCEEDED",
            QueryState::Failed => "FAILED",
            QueryState::Cancelled => "CANCELLED",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            QueryState::Queued => 0,
            QueryState::Running => 1,
            QueryState::Succeeded | QueryState::Failed | QueryState::Cancelled => 2,
        }
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryState {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "QUEUED" => Ok(QueryState::Queued),
            "RUNNING" => Ok(QueryState::Running),
            "SUCCEEDED" => Ok(QueryState::Succeeded),
            "FAILED" => Ok(QueryState::Failed),
            "CANCELLED" | "CANCELED" => Ok(QueryState::Cancelled),
            _ => Err(ModelError::UnknownState(s.to_string())),
        }
    }
}

/// Authoritative state snapshot reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryStatus {
    pub state: QueryState,
    /// State-change reason; populated by the service for failed or cancelled queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl QueryStatus {
    pub fn new(state: QueryState) -> Self {
        Self {
            state,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl From<QueryState> for QueryStatus {
    fn from(state: QueryState) -> Self {
        Self::new(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(QueryState::Succeeded.is_terminal());
        assert!(QueryState::Failed.is_terminal());
        assert!(QueryState::Cancelled.is_terminal());

        assert!(!QueryState::Queued.is_terminal());
        assert!(!QueryState::Running.is_terminal());
    }

    #[test]
    fn transitions_are_monotonic() {
        use QueryState::*;

        assert!(Queued.can_transition_to(Running));
        assert!(Queued.can_transition_to(Succeeded));
        assert!(Running.can_transition_to(Failed));
        assert!(Running.can_transition_to(Running));

        assert!(!Running.can_transition_to(Queued));
        assert!(!Succeeded.can_transition_to(Failed));
        assert!(!Cancelled.can_transition_to(Running));
    }

    #[test]
    fn parses_service_spelling() {
        assert_eq!("SUCCEEDED".parse::<QueryState>(), Ok(QueryState::Succeeded));
        assert_eq!(" running ".parse::<QueryState>(), Ok(QueryState::Running));
        assert_eq!("canceled".parse::<QueryState>(), Ok(QueryState::Cancelled));
        assert!(matches!(
            "DONE".parse::<QueryState>(),
            Err(ModelError::UnknownState(_))
        ));
    }

    #[test]
    fn serde_uses_screaming_case() {
        let json = serde_json::to_string(&QueryState::Queued).unwrap();
        assert_eq!(json, r#""QUEUED""#);

        let status: QueryStatus =
            serde_json::from_str(r#"{"state":"FAILED","reason":"syntax error"}"#).unwrap();
        assert_eq!(status.state, QueryState::Failed);
        assert_eq!(status.reason.as_deref(), Some("syntax error"));
    }
}
