//! In-memory team repository implementation

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::team::{Team, TeamId, TeamRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Entries {
    /// Insertion sequence -> team; iteration order is creation order
    by_seq: BTreeMap<u64, Team>,
    /// Team id -> insertion sequence
    index: HashMap<TeamId, u64>,
    next_seq: u64,
}

/// Thread-safe in-memory team registry
///
/// Data is lost when the process terminates. One lock guards the whole
/// collection, so a uniqueness check and the insert that follows it are a
/// single atomic step.
#[derive(Debug)]
pub struct InMemoryTeamRepository {
    entries: RwLock<Entries>,
    unique_names: bool,
}

impl Default for InMemoryTeamRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTeamRepository {
    /// Creates an empty registry that rejects duplicate names
    pub fn new() -> Self {
        Self::with_unique_names(true)
    }

    /// Creates an empty registry; with `unique_names` off, several live teams
    /// may share a name
    pub fn with_unique_names(unique_names: bool) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            unique_names,
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Entries>, DomainError> {
        self.entries
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Entries>, DomainError> {
        self.entries
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))
    }
}

#[async_trait]
impl TeamRepository for InMemoryTeamRepository {
    async fn create(&self, name: &str) -> Result<Team, DomainError> {
        let mut entries = self.write()?;

        if self.unique_names && entries.by_seq.values().any(|t| t.has_name_like(name)) {
            return Err(DomainError::conflict("Team name already exists"));
        }

        // Fresh v4 ids; never reused, including ids of deleted teams
        let id = TeamId::generate();

        let team =
            Team::new(id.clone(), name).map_err(|e| DomainError::invalid_input(e.to_string()))?;

        let seq = entries.next_seq;
        entries.next_seq += 1;
        entries.index.insert(id, seq);
        entries.by_seq.insert(seq, team.clone());

        debug!(id = %team.id(), seq, "Stored team");
        Ok(team)
    }

    async fn list(&self) -> Result<Vec<Team>, DomainError> {
        let entries = self.read()?;
        Ok(entries.by_seq.values().cloned().collect())
    }

    async fn get(&self, id: &TeamId) -> Result<Team, DomainError> {
        let entries = self.read()?;

        entries
            .index
            .get(id)
            .and_then(|seq| entries.by_seq.get(seq))
            .cloned()
            .ok_or_else(|| DomainError::not_found("Team not found"))
    }

    async fn delete(&self, id: &TeamId) -> Result<Team, DomainError> {
        let mut entries = self.write()?;

        let seq = entries
            .index
            .remove(id)
            .ok_or_else(|| DomainError::not_found("Team not found"))?;

        entries
            .by_seq
            .remove(&seq)
            .ok_or_else(|| DomainError::internal(format!("Team index out of sync for '{}'", id)))
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.read()?.by_seq.len())
    }
}
