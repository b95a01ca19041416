use std::borrow::Borrow;

use mnt_stream::{StreamEvent, StreamEventKind};
use tracing::{debug, error, warn};

pub trait View {
    fn kind(&self) -> StreamEventKind;
    fn as_machine(&self) -> &str;
    fn as_reason(&self) -> &str;
    fn skipped(&self) -> u32;
}

impl<T> View for T
where
    T: Borrow<StreamEvent>,
{
    #[inline]
    fn kind(&self) -> StreamEventKind {
        self.borrow().kind
    }
    #[inline]
    fn as_machine(&self) -> &str {
        self.borrow().machine_id.as_deref().unwrap_or("unknown")
    }
    #[inline]
    fn as_reason(&self) -> &str {
        self.borrow().reason.as_deref().unwrap_or("unknown")
    }
    #[inline]
    fn skipped(&self) -> u32 {
        self.borrow().skipped.unwrap_or(0)
    }
}

#[inline]
pub fn message_for(kind: StreamEventKind) -> &'static str {
    match kind {
        // lifecycle
        StreamEventKind::Started => "telemetry stream started",
        StreamEventKind::Stopped => "telemetry stream stopped",
        StreamEventKind::Restarted => "emitter exited unexpectedly and was restarted",

        // delivery
        StreamEventKind::Delivered => "telemetry record delivered",
        StreamEventKind::DeliveryFailed => "telemetry record delivery failed",
        StreamEventKind::TickSkipped => "emission ticks skipped (delivery overran the period)",
    }
}

#[inline]
pub fn log_event<E: View>(e: E) {
    let msg = message_for(e.kind());

    match e.kind() {
        StreamEventKind::Started => debug!("{msg}"),
        StreamEventKind::Stopped => debug!("{msg}"),
        StreamEventKind::Restarted => error!(reason = e.as_reason(), "{msg}"),

        StreamEventKind::Delivered => debug!(machine_id = e.as_machine(), "{msg}"),
        StreamEventKind::DeliveryFailed => error!(
            machine_id = e.as_machine(),
            reason = e.as_reason(),
            "{msg}"
        ),
        StreamEventKind::TickSkipped => warn!(skipped = e.skipped(), "{msg}"),
    }
}
