mod config;
mod error;
mod format;
mod level;
mod log;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use format::LoggerFormat;
pub use level::LoggerLevel;

/// Install the global `tracing` subscriber described by `cfg`.
///
/// Succeeds once per process; later calls fail with
/// [`LoggerError::AlreadyInitialized`].
pub fn init_logger(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    log::install(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Only test in this crate that touches the global subscriber.
    #[test]
    fn installs_once_per_process() {
        let cfg = LoggerConfig {
            level: LoggerLevel::new("debug").unwrap(),
            use_color: false,
            ..Default::default()
        };
        init_logger(&cfg).unwrap();
        tracing::info!("logger installed");

        let again = LoggerConfig {
            format: LoggerFormat::Json,
            ..cfg
        };
        assert!(matches!(
            init_logger(&again),
            Err(LoggerError::AlreadyInitialized(_))
        ));
    }
}
