//! Actual-state access used by the operator

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::team::{Team, TeamId};
use crate::domain::DomainError;

/// The Teams operations the reconciler needs, either in-process or remote
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TeamsBackend: Send + Sync + std::fmt::Debug {
    async fn list_teams(&self) -> Result<Vec<Team>, DomainError>;

    async fn create_team(&self, name: &str) -> Result<Team, DomainError>;

    async fn delete_team(&self, id: &TeamId) -> Result<(), DomainError>;
}
