use std::fmt;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::logger::error::LoggerError;

/// `EnvFilter` directive checked at construction, e.g. `info` or `mnt_core=debug,info`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct LoggerLevel(String);

impl LoggerLevel {
    pub fn new(directive: impl Into<String>) -> Result<Self, LoggerError> {
        let level = Self(directive.into());
        level.filter()?;
        Ok(level)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn filter(&self) -> Result<EnvFilter, LoggerError> {
        EnvFilter::try_new(&self.0).map_err(|source| LoggerError::InvalidLogLevel {
            directive: self.0.clone(),
            source,
        })
    }
}

impl Default for LoggerLevel {
    fn default() -> Self {
        Self("info".to_string())
    }
}

impl fmt::Display for LoggerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LoggerLevel {
    type Error = LoggerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn accepts_directives() {
        assert_eq!(LoggerLevel::new("debug").unwrap().as_str(), "debug");
        assert!(LoggerLevel::new("mnt_core=trace,warn").is_ok());
    }

    #[test]
    fn rejects_garbage_and_keeps_the_parse_error() {
        let err = LoggerLevel::new("mnt_core=loud").unwrap_err();
        match &err {
            LoggerError::InvalidLogLevel { directive, .. } => assert_eq!(directive, "mnt_core=loud"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.source().is_some());
    }
}
