//! Synthetic telemetry emission.
//!
//! [`StreamController`] owns the process-wide streaming flag. It runs as a
//! single actor task, so toggles are serialized and at most one emitter is
//! ever alive. The emitter manufactures a record per tick with
//! [`SyntheticRecordGenerator`] and forwards it to an [`IngestSink`].

mod error;
pub use error::{IngestError, StreamError};

mod generator;
pub use generator::SyntheticRecordGenerator;

mod sink;
pub use sink::{IngestSink, encode_record};

mod event;
pub use event::{StreamEvent, StreamEventKind};

mod subscriber;
pub use subscriber::StreamSubscriber;

mod config;
pub use config::StreamConfig;

mod controller;
pub use controller::{StreamController, StreamHandle};
