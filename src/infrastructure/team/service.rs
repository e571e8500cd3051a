//! Team service for team management

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::reconcile::TeamsBackend;
use crate::domain::team::{validate_team_name, Team, TeamId, TeamRepository};
use crate::domain::DomainError;

pub const HEALTH_MESSAGE: &str = "Teams API is running";

/// Plain status message returned by health and delete operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub message: String,
}

impl StatusMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Confirmation for a removed team
    pub fn team_deleted(team: &Team) -> Self {
        Self::new(format!("Team '{}' deleted successfully", team.name()))
    }
}

/// Stateless orchestration over a team repository
#[derive(Debug, Clone)]
pub struct TeamService {
    repository: Arc<dyn TeamRepository>,
}

impl TeamService {
    /// Create a new team service
    pub fn new(repository: Arc<dyn TeamRepository>) -> Self {
        Self { repository }
    }

    /// Always succeeds while the process is serving
    pub fn health(&self) -> StatusMessage {
        StatusMessage::new(HEALTH_MESSAGE)
    }

    /// Create a new team
    pub async fn create_team(&self, name: &str) -> Result<Team, DomainError> {
        info!(name = %name, "Creating team");

        validate_team_name(name).map_err(|e| DomainError::invalid_input(e.to_string()))?;

        let team = self.repository.create(name).await?;
        info!(id = %team.id(), name = %team.name(), "Team created");
        Ok(team)
    }

    /// List all teams in creation order
    pub async fn list_teams(&self) -> Result<Vec<Team>, DomainError> {
        self.repository.list().await
    }

    /// Get a team by ID
    pub async fn get_team(&self, id: &str) -> Result<Team, DomainError> {
        debug!(id = %id, "Getting team");
        self.repository.get(&TeamId::from(id)).await
    }

    /// Delete a team and confirm by name
    pub async fn delete_team(&self, id: &str) -> Result<StatusMessage, DomainError> {
        info!(id = %id, "Deleting team");

        let removed = self.repository.delete(&TeamId::from(id)).await?;
        info!(id = %removed.id(), name = %removed.name(), "Team deleted");
        Ok(StatusMessage::team_deleted(&removed))
    }

    /// Count live teams
    pub async fn count_teams(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }
}

#[async_trait]
impl TeamsBackend for TeamService {
    async fn list_teams(&self) -> Result<Vec<Team>, DomainError> {
        TeamService::list_teams(self).await
    }

    async fn create_team(&self, name: &str) -> Result<Team, DomainError> {
        TeamService::create_team(self, name).await
    }

    async fn delete_team(&self, id: &TeamId) -> Result<(), DomainError> {
        TeamService::delete_team(self, id.as_str()).await.map(|_| ())
    }
}
