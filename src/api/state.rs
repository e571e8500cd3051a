//! Application state for shared services

use std::sync::Arc;

use crate::domain::team::TeamRepository;
use crate::infrastructure::team::TeamService;

/// Shared handler state; cheap to clone
#[derive(Debug, Clone)]
pub struct AppState {
    pub team_service: Arc<TeamService>,
}

impl AppState {
    pub fn new(team_service: Arc<TeamService>) -> Self {
        Self { team_service }
    }

    /// State backed by the given repository
    pub fn with_repository(repository: Arc<dyn TeamRepository>) -> Self {
        Self::new(Arc::new(TeamService::new(repository)))
    }
}
