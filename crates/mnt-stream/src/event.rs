use std::time::SystemTime;

/// What happened in the emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEventKind {
    /// Emitter task began its schedule.
    Started,
    /// Emitter task exited after cancellation.
    Stopped,
    /// Emitter task died unexpectedly and was restarted on the same schedule.
    Restarted,
    /// A record was accepted by the ingestion service.
    Delivered,
    /// A delivery failed; the schedule continues.
    DeliveryFailed,
    /// Ticks were missed because a delivery overran the period.
    TickSkipped,
}

#[derive(Debug, Clone)]
pub struct StreamEvent {
    pub kind: StreamEventKind,
    pub at: SystemTime,
    pub machine_id: Option<String>,
    pub reason: Option<String>,
    /// Number of missed ticks, for [`StreamEventKind::TickSkipped`].
    pub skipped: Option<u32>,
}

impl StreamEvent {
    pub fn new(kind: StreamEventKind) -> Self {
        Self {
            kind,
            at: SystemTime::now(),
            machine_id: None,
            reason: None,
            skipped: None,
        }
    }

    pub fn with_machine(mut self, machine_id: impl Into<String>) -> Self {
        self.machine_id = Some(machine_id.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_skipped(mut self, skipped: u32) -> Self {
        self.skipped = Some(skipped);
        self
    }
}
