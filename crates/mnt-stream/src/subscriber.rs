use crate::event::StreamEvent;

/// Observer of emitter events (logging, metrics).
///
/// Called inline on the emitter task; implementations must not block.
pub trait StreamSubscriber: Send + Sync + 'static {
    fn on_event(&self, event: &StreamEvent);

    fn name(&self) -> &'static str;
}
