//! Domain layer - entities, traits, and errors with no I/O

pub mod error;
pub mod reconcile;
pub mod team;

pub use error::DomainError;
pub use reconcile::{DesiredState, DesiredStateSource, DesiredTeam, ReconcilePlan, TeamsBackend};
pub use team::{Team, TeamId, TeamRepository};
