use thiserror::Error;
use tracing_subscriber::{filter::ParseError, util::TryInitError};

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format '{0}', expected text, json or journald")]
    UnknownFormat(String),

    #[error("journald output needs the `journald` feature on Linux")]
    JournaldUnavailable,

    #[error("invalid log filter '{directive}'")]
    InvalidLogLevel {
        directive: String,
        #[source]
        source: ParseError,
    },

    #[error("cannot connect to the journald socket")]
    JournaldSocket(#[source] std::io::Error),

    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized(#[source] TryInitError),
}
