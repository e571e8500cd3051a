//! Teams API
//!
//! A small team registry with:
//! - An in-memory store with insertion-ordered listing
//! - An HTTP API over the store
//! - An operator that reconciles live teams against a desired list

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use infrastructure::team::InMemoryTeamRepository;

/// Create application state backed by the in-memory store
pub fn create_app_state(config: &AppConfig) -> AppState {
    let repository = InMemoryTeamRepository::with_unique_names(config.teams.unique_names);

    AppState::with_repository(Arc::new(repository))
}
