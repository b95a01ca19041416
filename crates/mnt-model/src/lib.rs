//! Shared data model for the maintenance dashboard backend.
//!
//! Query jobs and their state machine, materialized result sets and the
//! synthetic telemetry records emitted by the stream.

mod error;
pub use error::ModelError;

mod domain;
pub use domain::*;
