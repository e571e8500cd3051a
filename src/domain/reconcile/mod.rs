//! Reconciliation domain
//!
//! The operator compares a declared set of team names against the teams that
//! actually exist and issues create/delete corrections until they match.

mod backend;
mod desired;
mod plan;

pub use backend::TeamsBackend;
pub use desired::{DesiredState, DesiredStateSource, DesiredTeam};
pub use plan::ReconcilePlan;

#[cfg(test)]
pub use backend::MockTeamsBackend;
