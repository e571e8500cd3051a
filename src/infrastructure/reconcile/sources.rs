//! Desired state sources

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::{watch, Mutex};
use tracing::debug;

use crate::domain::reconcile::{DesiredState, DesiredStateSource, DesiredTeam};
use crate::domain::DomainError;

/// Fixed list of desired teams
#[derive(Debug, Clone)]
pub struct StaticSource {
    teams: Vec<DesiredTeam>,
}

impl StaticSource {
    pub fn new(teams: impl IntoIterator<Item = DesiredTeam>) -> Self {
        Self {
            teams: teams.into_iter().collect(),
        }
    }
}

#[async_trait]
impl DesiredStateSource for StaticSource {
    async fn observe(&self) -> Result<DesiredState, DomainError> {
        DesiredState::from_teams(self.teams.iter().cloned())
    }

    fn describe(&self) -> String {
        format!("static({} teams)", self.teams.len())
    }
}

/// On-disk manifest layout: `teams = [{ name = "..." }]` in TOML, or the
/// same object in JSON. A bare JSON array of entries is also accepted.
///
/// `teams` is required and unknown keys are rejected; an empty desired set
/// must be written out as `teams = []`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ManifestDocument {
    Wrapped(ManifestTable),
    List(Vec<ManifestEntry>),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestTable {
    teams: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestEntry {
    name: String,
}

impl ManifestDocument {
    fn into_teams(self) -> Vec<DesiredTeam> {
        let entries = match self {
            Self::Wrapped(table) => table.teams,
            Self::List(entries) => entries,
        };

        entries.into_iter().map(|e| DesiredTeam::new(e.name)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ManifestFormat {
    Toml,
    Json,
}

impl ManifestFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

/// Polled manifest file, re-read on every cycle
#[derive(Debug, Clone)]
pub struct ManifestFileSource {
    path: PathBuf,
    format: ManifestFormat,
}

impl ManifestFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = ManifestFormat::from_path(&path);
        Self { path, format }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, content: &str) -> Result<Vec<DesiredTeam>, DomainError> {
        let document: ManifestDocument = match self.format {
            ManifestFormat::Json => serde_json::from_str(content).map_err(|e| {
                DomainError::configuration(format!(
                    "Invalid JSON manifest {}: {}",
                    self.path.display(),
                    e
                ))
            })?,
            ManifestFormat::Toml => toml::from_str(content).map_err(|e| {
                DomainError::configuration(format!(
                    "Invalid TOML manifest {}: {}",
                    self.path.display(),
                    e
                ))
            })?,
        };

        Ok(document.into_teams())
    }
}

#[async_trait]
impl DesiredStateSource for ManifestFileSource {
    async fn observe(&self) -> Result<DesiredState, DomainError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            DomainError::backend(format!(
                "Failed to read manifest {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let teams = self.parse(&content)?;
        debug!(path = %self.path.display(), entries = teams.len(), "Read manifest");
        DesiredState::from_teams(teams)
    }

    fn describe(&self) -> String {
        format!("manifest({})", self.path.display())
    }
}

/// Push-based source fed through a watch channel
#[derive(Debug)]
pub struct ChannelSource {
    receiver: Mutex<watch::Receiver<Vec<DesiredTeam>>>,
}

impl ChannelSource {
    /// Create the source and the sender that publishes new desired state
    pub fn new(initial: Vec<DesiredTeam>) -> (Self, watch::Sender<Vec<DesiredTeam>>) {
        let (sender, receiver) = watch::channel(initial);
        let source = Self {
            receiver: Mutex::new(receiver),
        };
        (source, sender)
    }
}

#[async_trait]
impl DesiredStateSource for ChannelSource {
    async fn observe(&self) -> Result<DesiredState, DomainError> {
        let teams = self.receiver.lock().await.borrow_and_update().clone();
        DesiredState::from_teams(teams)
    }

    async fn changed(&self) {
        let mut receiver = self.receiver.lock().await;

        if receiver.changed().await.is_err() {
            // Sender dropped: no more pushes, fall back to polling
            drop(receiver);
            std::future::pending::<()>().await;
        }
    }

    fn describe(&self) -> String {
        "channel".to_string()
    }
}
