use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::logger::error::LoggerError;

/// Where and how log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum LoggerFormat {
    /// Human-readable lines on stdout.
    #[default]
    Text,
    /// One JSON object per line on stdout.
    Json,
    /// Native systemd journal fields.
    Journald,
}

impl LoggerFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoggerFormat::Text => "text",
            LoggerFormat::Json => "json",
            LoggerFormat::Journald => "journald",
        }
    }

    /// Whether this build can write to the journal at all.
    pub const fn journald_available() -> bool {
        cfg!(all(target_os = "linux", feature = "journald"))
    }
}

impl fmt::Display for LoggerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoggerFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format = match s.trim().to_ascii_lowercase().as_str() {
            "text" => LoggerFormat::Text,
            "json" => LoggerFormat::Json,
            "journald" | "journal" => LoggerFormat::Journald,
            _ => return Err(LoggerError::UnknownFormat(s.to_string())),
        };
        if format == LoggerFormat::Journald && !Self::journald_available() {
            return Err(LoggerError::JournaldUnavailable);
        }
        Ok(format)
    }
}

impl TryFrom<String> for LoggerFormat {
    type Error = LoggerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
