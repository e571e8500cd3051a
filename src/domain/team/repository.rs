//! Team repository trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{Team, TeamId};
use crate::domain::DomainError;

/// Authoritative registry of teams.
///
/// Implementations own identity assignment: `create` allocates the id and the
/// creation timestamp. Mutations must be atomic with respect to concurrent
/// reads.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TeamRepository: Send + Sync + std::fmt::Debug {
    /// Create a team with a freshly allocated id
    async fn create(&self, name: &str) -> Result<Team, DomainError>;

    /// All live teams in insertion order
    async fn list(&self) -> Result<Vec<Team>, DomainError>;

    /// Get a live team, `NotFound` if absent
    async fn get(&self, id: &TeamId) -> Result<Team, DomainError>;

    /// Remove a live team and return it, `NotFound` if absent
    async fn delete(&self, id: &TeamId) -> Result<Team, DomainError>;

    /// Number of live teams
    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.list().await?.len())
    }
}
