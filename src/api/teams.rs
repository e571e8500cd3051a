//! Team endpoints

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::team::Team;
use crate::infrastructure::team::StatusMessage;

/// Request to create a new team
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
}

/// Team as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamResponse {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

impl From<&Team> for TeamResponse {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id().as_str().to_string(),
            name: team.name().to_string(),
            created_at: team.created_at().to_rfc3339(),
        }
    }
}

/// POST /teams
pub async fn create_team(
    State(state): State<AppState>,
    Json(request): Json<CreateTeamRequest>,
) -> Result<Json<TeamResponse>, ApiError> {
    debug!(name = %request.name, "Creating team");

    let team = state.team_service.create_team(&request.name).await?;

    Ok(Json(TeamResponse::from(&team)))
}

/// GET /teams
pub async fn list_teams(State(state): State<AppState>) -> Result<Json<Vec<TeamResponse>>, ApiError> {
    let teams = state.team_service.list_teams().await?;

    Ok(Json(teams.iter().map(TeamResponse::from).collect()))
}

/// GET /teams/{team_id}
pub async fn get_team(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team = state.team_service.get_team(&team_id).await?;

    Ok(Json(TeamResponse::from(&team)))
}

/// DELETE /teams/{team_id}
pub async fn delete_team(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> Result<Json<StatusMessage>, ApiError> {
    let confirmation = state.team_service.delete_team(&team_id).await?;

    Ok(Json(confirmation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::team::TeamId;

    #[test]
    fn test_create_team_request_deserialization() {
        let request: CreateTeamRequest =
            serde_json::from_str(r#"{"name": "Backend Team"}"#).unwrap();
        assert_eq!(request.name, "Backend Team");
    }

    #[test]
    fn test_create_team_request_missing_name() {
        let result: Result<CreateTeamRequest, _> = serde_json::from_str("{}");
        assert!(result.is_err());
    }

    #[test]
    fn test_team_response_from() {
        let team = Team::new(TeamId::from("team-1"), "Backend Team").unwrap();
        let response = TeamResponse::from(&team);

        assert_eq!(response.id, "team-1");
        assert_eq!(response.name, "Backend Team");
        assert_eq!(response.created_at, team.created_at().to_rfc3339());
    }

    #[test]
    fn test_team_response_serialization_has_exactly_three_fields() {
        let team = Team::new(TeamId::generate(), "Backend Team").unwrap();
        let json = serde_json::to_value(TeamResponse::from(&team)).unwrap();

        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert!(object.contains_key("id"));
        assert!(object.contains_key("name"));
        assert!(object.contains_key("created_at"));
    }
}
