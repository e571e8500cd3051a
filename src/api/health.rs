//! Health check endpoints for Kubernetes liveness and readiness checks

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::api::types::Json;
use crate::infrastructure::team::StatusMessage;

use super::state::AppState;

/// Detailed health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub teams_count: usize,
}

/// Health check status
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// GET / - service banner
pub async fn root(State(state): State<AppState>) -> Json<StatusMessage> {
    Json(state.team_service.health())
}

/// GET /health - reports the store as reachable along with the team count
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.team_service.count_teams().await {
        Ok(teams_count) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: HealthStatus::Healthy,
                teams_count,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not read the team store");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: HealthStatus::Unhealthy,
                    teams_count: 0,
                }),
            )
        }
    }
}

/// Liveness check - used by Kubernetes to detect crashed pods
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}
