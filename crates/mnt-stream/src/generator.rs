use std::time::{SystemTime, UNIX_EPOCH};

use mnt_model::{EpochSecs, MachineStatus, TelemetryRecord};
use rand::Rng;

const MACHINE_COUNT: u32 = 4;
const ERROR_CODE_RANGE: u32 = 300;
const MAX_SPAN_SECS: u64 = 1_000;
const MESSAGE: &str = "Generated from backend";

/// Manufactures plausible MRI telemetry samples.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntheticRecordGenerator;

impl SyntheticRecordGenerator {
    pub fn new() -> Self {
        Self
    }

    /// One record stamped with the current wall-clock time.
    pub fn generate(&self) -> TelemetryRecord {
        self.generate_with(&mut rand::thread_rng(), unix_now())
    }

    /// One record at `now` drawing from `rng`.
    ///
    /// `start_time` lies less than 1000 s before `now` and `end_time`
    /// up to the same span after `start_time`, so `end_time >= start_time`.
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R, now: EpochSecs) -> TelemetryRecord {
        let start_time = now.saturating_sub(rng.gen_range(0..MAX_SPAN_SECS));
        let end_time = start_time + rng.gen_range(0..MAX_SPAN_SECS);
        let status = MachineStatus::ALL[rng.gen_range(0..MachineStatus::ALL.len())];

        TelemetryRecord {
            timestamp: now,
            machine_id: format!("MRI_00{}", rng.gen_range(1..=MACHINE_COUNT)),
            error_code: format!("E{}", rng.gen_range(0..ERROR_CODE_RANGE)),
            status,
            message: MESSAGE.to_string(),
            start_time,
            end_time,
            runtime_seconds: end_time - start_time,
            resolved: rng.gen_bool(0.5),
        }
    }
}

fn unix_now() -> EpochSecs {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
