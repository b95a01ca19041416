use thiserror::Error;

use crate::QueryState;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown query state: {0}")]
    UnknownState(String),

    #[error("illegal query state transition: {from} -> {to}")]
    IllegalTransition { from: QueryState, to: QueryState },
}
