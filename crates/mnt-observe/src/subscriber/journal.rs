use mnt_stream::{StreamEvent, StreamSubscriber};

use crate::subscriber::view::log_event;

/// Writes every emitter event to the `tracing` log.
#[derive(Debug, Default, Clone, Copy)]
pub struct Journal;

impl Journal {
    pub fn new() -> Self {
        Self
    }
}

impl StreamSubscriber for Journal {
    fn on_event(&self, event: &StreamEvent) {
        log_event(event);
    }

    fn name(&self) -> &'static str {
        "journal"
    }
}
