//! Desired state types and the source capability

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::team::validate_team_name;
use crate::domain::DomainError;

/// One declared team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredTeam {
    pub name: String,
}

impl DesiredTeam {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The set of team names that should exist after a reconciliation cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredState {
    names: BTreeSet<String>,
}

impl DesiredState {
    /// Build a desired state, rejecting the whole set if any entry is invalid.
    /// Repeated names collapse into one entry.
    pub fn from_teams(
        teams: impl IntoIterator<Item = DesiredTeam>,
    ) -> Result<Self, DomainError> {
        let mut names = BTreeSet::new();

        for team in teams {
            validate_team_name(&team.name).map_err(|e| {
                DomainError::invalid_input(format!("Desired team '{}': {}", team.name, e))
            })?;
            names.insert(team.name);
        }

        Ok(Self { names })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// First two names that are equal ignoring case, in sorted order
    pub fn case_insensitive_duplicate(&self) -> Option<(&str, &str)> {
        let mut seen: HashMap<String, &str> = HashMap::new();

        for name in self.names() {
            if let Some(previous) = seen.insert(name.to_lowercase(), name) {
                return Some((previous, name));
            }
        }

        None
    }
}

/// Where the operator reads what should exist.
///
/// Polling sources are read on every cycle and rely on the reconciler's
/// interval. Push sources additionally complete [`changed`](Self::changed)
/// when new state is available so the next cycle starts immediately.
#[async_trait]
pub trait DesiredStateSource: Send + Sync + std::fmt::Debug {
    /// Read the current desired state. An error aborts the cycle.
    async fn observe(&self) -> Result<DesiredState, DomainError>;

    /// Resolves when the source has new state. Never resolves for
    /// polling-only sources.
    async fn changed(&self) {
        std::future::pending::<()>().await
    }

    /// Short label used in logs
    fn describe(&self) -> String;
}
