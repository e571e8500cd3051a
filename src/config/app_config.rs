use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::reconcile::{DesiredStateSource, DesiredTeam};
use crate::domain::DomainError;
use crate::infrastructure::reconcile::{ManifestFileSource, ReconcilerSettings, StaticSource};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub teams: TeamsConfig,
    #[serde(default)]
    pub operator: OperatorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub tracing: TracingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// OTLP span export; off unless `enabled`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    pub enabled: bool,
    pub otlp_endpoint: String,
    pub service_name: String,
    /// Fraction of traces kept, clamped to `0.0..=1.0` by the sampler
    pub sampling_ratio: f64,
}

/// Prometheus scrape endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub path: String,
}

/// Team store policy
#[derive(Debug, Clone, Deserialize)]
pub struct TeamsConfig {
    /// Reject a new team whose name matches an existing one, ignoring case
    #[serde(default = "default_true")]
    pub unique_names: bool,
}

/// Reconciler configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OperatorConfig {
    /// Run the reconciler inside `serve`
    #[serde(default)]
    pub enabled: bool,
    /// TOML or JSON manifest listing desired teams
    #[serde(default)]
    pub manifest_path: Option<PathBuf>,
    /// Inline desired team names, used when no manifest is configured
    #[serde(default)]
    pub teams: Option<Vec<String>>,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_max_backoff_secs() -> u64 {
    300
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            otlp_endpoint: "http://localhost:4317".to_string(),
            service_name: env!("CARGO_PKG_NAME").to_string(),
            sampling_ratio: 1.0,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl Default for TeamsConfig {
    fn default() -> Self {
        Self { unique_names: true }
    }
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            manifest_path: None,
            teams: None,
            poll_interval_secs: default_poll_interval_secs(),
            retry_delay_secs: default_retry_delay_secs(),
            max_backoff_secs: default_max_backoff_secs(),
        }
    }
}

impl OperatorConfig {
    pub fn settings(&self) -> ReconcilerSettings {
        ReconcilerSettings {
            poll_interval: Duration::from_secs(self.poll_interval_secs.max(1)),
            retry_delay: Duration::from_secs(self.retry_delay_secs.max(1)),
            max_backoff: Duration::from_secs(self.max_backoff_secs.max(self.retry_delay_secs)),
            ..ReconcilerSettings::default()
        }
    }

    /// Build the desired-state source; a manifest path takes precedence
    pub fn source(&self) -> Result<Arc<dyn DesiredStateSource>, DomainError> {
        if let Some(path) = &self.manifest_path {
            return Ok(Arc::new(ManifestFileSource::new(path.clone())));
        }

        match &self.teams {
            Some(names) => Ok(Arc::new(StaticSource::new(
                names.iter().map(DesiredTeam::new),
            ))),
            None => Err(DomainError::configuration(
                "operator requires either operator.manifest_path or operator.teams",
            )),
        }
    }
}

impl AppConfig {
    /// Reconciler settings matching the store's naming policy
    pub fn reconciler_settings(&self) -> ReconcilerSettings {
        ReconcilerSettings {
            unique_names: self.teams.unique_names,
            ..self.operator.settings()
        }
    }

    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
