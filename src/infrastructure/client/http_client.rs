//! Remote Teams API client over reqwest

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::health::HealthResponse;
use crate::domain::reconcile::TeamsBackend;
use crate::domain::team::{Team, TeamId};
use crate::domain::DomainError;
use crate::infrastructure::team::StatusMessage;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct CreateTeamBody<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Client for a running Teams API
#[derive(Debug, Clone)]
pub struct HttpTeamsClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTeamsClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DomainError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /health
    pub async fn health(&self) -> Result<HealthResponse, DomainError> {
        let response = self.send(self.client.get(self.url(&["health"])?)).await?;
        decode(response).await
    }

    /// POST /teams
    pub async fn create_team(&self, name: &str) -> Result<Team, DomainError> {
        let request = self
            .client
            .post(self.url(&["teams"])?)
            .json(&CreateTeamBody { name });

        let response = self.send(request).await?;
        decode(response).await
    }

    /// GET /teams
    pub async fn list_teams(&self) -> Result<Vec<Team>, DomainError> {
        let response = self.send(self.client.get(self.url(&["teams"])?)).await?;
        decode(response).await
    }

    /// GET /teams/{id}
    pub async fn get_team(&self, id: &str) -> Result<Team, DomainError> {
        let response = self.send(self.client.get(self.url(&["teams", id])?)).await?;
        decode(response).await
    }

    /// DELETE /teams/{id}
    pub async fn delete_team(&self, id: &str) -> Result<StatusMessage, DomainError> {
        let response = self.send(self.client.delete(self.url(&["teams", id])?)).await?;
        decode(response).await
    }

    /// Base URL extended with percent-encoded path segments
    fn url(&self, segments: &[&str]) -> Result<Url, DomainError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            DomainError::configuration(format!("Invalid API URL {}: {}", self.base_url, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                DomainError::configuration(format!("API URL {} cannot have a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, DomainError> {
        let response = request.send().await.map_err(|e| {
            DomainError::backend(format!("Request to {} failed: {}", self.base_url, e))
        })?;

        debug!(status = %response.status(), url = %response.url(), "Teams API responded");

        if response.status().is_success() {
            return Ok(response);
        }

        Err(error_from_response(response).await)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, DomainError> {
    response
        .json()
        .await
        .map_err(|e| DomainError::backend(format!("Failed to parse response: {}", e)))
}

async fn error_from_response(response: Response) -> DomainError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.detail)
        .unwrap_or_else(|| format!("HTTP {}: {}", status, body));

    match status {
        StatusCode::NOT_FOUND => DomainError::not_found(detail),
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            DomainError::invalid_input(detail)
        }
        _ => DomainError::backend(detail),
    }
}

#[async_trait]
impl TeamsBackend for HttpTeamsClient {
    async fn list_teams(&self) -> Result<Vec<Team>, DomainError> {
        HttpTeamsClient::list_teams(self).await
    }

    async fn create_team(&self, name: &str) -> Result<Team, DomainError> {
        HttpTeamsClient::create_team(self, name).await
    }

    async fn delete_team(&self, id: &TeamId) -> Result<(), DomainError> {
        HttpTeamsClient::delete_team(self, id.as_str()).await.map(|_| ())
    }
}
