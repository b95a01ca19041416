use std::io::IsTerminal;

use crate::logger::{format::LoggerFormat, level::LoggerLevel};

/// Settings for [`init_logger`](crate::init_logger).
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    pub level: LoggerLevel,
    /// Print the emitting module next to each line.
    pub with_targets: bool,
    /// ANSI colours; only honoured by [`LoggerFormat::Text`].
    pub use_color: bool,
}

impl Default for LoggerConfig {
    /// Text at `info`, coloured when stdout is a terminal and `NO_COLOR` is unset.
    fn default() -> Self {
        let use_color =
            std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal();
        Self {
            format: LoggerFormat::Text,
            level: LoggerLevel::default(),
            with_targets: true,
            use_color,
        }
    }
}
