use std::fmt;

use serde::{Deserialize, Serialize};

use crate::EpochSecs;

/// Operating status reported by a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineStatus {
    Idle,
    Running,
    Error,
}

impl MachineStatus {
    pub const ALL: [MachineStatus; 3] = [
        MachineStatus::Idle,
        MachineStatus::Running,
        MachineStatus::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MachineStatus::Idle => "Idle",
            MachineStatus::Running => "Running",
            MachineStatus::Error => "Error",
        }
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One telemetry sample forwarded to the ingestion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub timestamp: EpochSecs,
    pub machine_id: String,
    pub error_code: String,
    pub status: MachineStatus,
    pub message: String,
    pub start_time: EpochSecs,
    pub end_time: EpochSecs,
    /// `end_time - start_time`, in seconds.
    #[serde(rename = "machine_runtime")]
    pub runtime_seconds: u64,
    pub resolved: bool,
}

impl TelemetryRecord {
    /// Records of one machine land on the same ingestion partition.
    #[inline]
    pub fn partition_key(&self) -> &str {
        &self.machine_id
    }
}
