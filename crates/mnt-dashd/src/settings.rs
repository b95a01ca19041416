use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use mnt_core::{PollConfig, QueryConfig};
use mnt_observe::{LoggerConfig, LoggerFormat, LoggerLevel};
use mnt_stream::StreamConfig;
use serde::Deserialize;

/// Daemon configuration.
///
/// Sources, later wins: built-in defaults, optional `mnt-dashd.toml` in the
/// working directory, `MNT__<SECTION>__<KEY>` environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub query: QuerySection,
    pub stream: StreamSection,
    pub http: HttpSection,
    pub log: LogSection,
    pub warehouse: WarehouseSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuerySection {
    pub database: String,
    pub table: String,
    pub output_location: String,
    pub poll_interval_ms: u64,
    pub deadline_ms: Option<u64>,
}

impl Default for QuerySection {
    fn default() -> Self {
        let defaults = QueryConfig::default();
        Self {
            database: defaults.database,
            table: defaults.table,
            output_location: defaults.output_location,
            poll_interval_ms: defaults.poll.interval.as_millis() as u64,
            deadline_ms: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamSection {
    pub stream_name: String,
    pub period_ms: u64,
    pub ingest_timeout_ms: u64,
}

impl Default for StreamSection {
    fn default() -> Self {
        Self {
            stream_name: "mri-telemetry".to_string(),
            period_ms: 5_000,
            ingest_timeout_ms: 4_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub bind: String,
    /// Origin allowed by CORS; `*` allows any.
    pub allowed_origin: String,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3001".to_string(),
            allowed_origin: "http://localhost:3001".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSection {
    pub format: LoggerFormat,
    pub level: LoggerLevel,
    pub with_targets: bool,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            level: LoggerLevel::default(),
            with_targets: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WarehouseSection {
    /// Records retained by the local warehouse.
    pub capacity: usize,
}

impl Default for WarehouseSection {
    fn default() -> Self {
        Self { capacity: 1_000 }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("mnt-dashd").required(false))
                .add_source(env_source()),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    pub fn query_config(&self) -> QueryConfig {
        QueryConfig {
            database: self.query.database.clone(),
            table: self.query.table.clone(),
            output_location: self.query.output_location.clone(),
            poll: PollConfig {
                interval: Duration::from_millis(self.query.poll_interval_ms),
                deadline: self.query.deadline_ms.map(Duration::from_millis),
            },
        }
    }

    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            stream_name: self.stream.stream_name.clone(),
            period: Duration::from_millis(self.stream.period_ms),
            ingest_timeout: Duration::from_millis(self.stream.ingest_timeout_ms),
            ..Default::default()
        }
    }

    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig {
            format: self.log.format,
            level: self.log.level.clone(),
            with_targets: self.log.with_targets,
            ..Default::default()
        }
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("MNT")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
