//! Team entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{validate_team_name, TeamValidationError};

/// Opaque team identifier, a UUID v4 string when generated by a store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(String);

impl TeamId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TeamId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TeamId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<TeamId> for String {
    fn from(id: TeamId) -> Self {
        id.0
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Team entity
///
/// Teams have no mutators: `id` and `created_at` are fixed by the store that
/// creates the record and `name` is fixed by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    id: TeamId,
    name: String,
    created_at: DateTime<Utc>,
}

impl Team {
    /// Create a new team stamped with the current time
    pub fn new(id: TeamId, name: impl Into<String>) -> Result<Self, TeamValidationError> {
        Self::with_created_at(id, name, Utc::now())
    }

    /// Create a team with an explicit creation timestamp
    pub fn with_created_at(
        id: TeamId,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, TeamValidationError> {
        let name = name.into();
        validate_team_name(&name)?;

        Ok(Self {
            id,
            name,
            created_at,
        })
    }

    pub fn id(&self) -> &TeamId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Case-insensitive name comparison used by the unique-names policy
    pub fn has_name_like(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}
