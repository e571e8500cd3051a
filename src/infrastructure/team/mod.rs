//! Team infrastructure implementations

mod repository;
mod service;

pub use repository::InMemoryTeamRepository;
pub use service::{StatusMessage, TeamService, HEALTH_MESSAGE};
