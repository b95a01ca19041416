mod job_id;
pub use job_id::JobId;

mod query_state;
pub use query_state::{QueryState, QueryStatus};

mod query_job;
pub use query_job::QueryJob;

mod result_set;
pub use result_set::{RawResults, RawRow, ResultRow, ResultSet};

mod telemetry;
pub use telemetry::{MachineStatus, TelemetryRecord};

/// Unix timestamp in whole seconds.
pub type EpochSecs = u64;
