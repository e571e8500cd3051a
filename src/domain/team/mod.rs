//! Team domain module
//!
//! Teams are named organizational units. A team is created with a name,
//! read back by id, listed, and deleted; there is no update operation.

mod entity;
mod repository;
mod validation;

pub use entity::{Team, TeamId};
pub use repository::TeamRepository;
pub use validation::{validate_team_name, TeamValidationError};

#[cfg(test)]
pub use repository::MockTeamRepository;
