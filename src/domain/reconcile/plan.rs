//! Diff between desired and actual state

use std::collections::HashSet;

use super::desired::DesiredState;
use crate::domain::team::Team;

/// Corrections for one reconciliation cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Desired names with no live team
    pub to_create: Vec<String>,
    /// Live teams that are not desired, or extra copies of a desired name
    pub to_delete: Vec<Team>,
}

impl ReconcilePlan {
    /// Compute a full diff. For each desired name the first live team in list
    /// order is kept; every other live team is scheduled for deletion.
    pub fn compute(desired: &DesiredState, actual: &[Team]) -> Self {
        let mut kept: HashSet<&str> = HashSet::new();
        let mut to_delete = Vec::new();

        for team in actual {
            if desired.contains(team.name()) && kept.insert(team.name()) {
                continue;
            }

            to_delete.push(team.clone());
        }

        let to_create = desired
            .names()
            .filter(|name| !kept.contains(name))
            .map(str::to_string)
            .collect();

        Self {
            to_create,
            to_delete,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_delete.is_empty()
    }

    pub fn len(&self) -> usize {
        self.to_create.len() + self.to_delete.len()
    }
}
