//! Infrastructure layer - Storage, remote clients, reconciliation and telemetry

pub mod client;
pub mod logging;
pub mod observability;
pub mod reconcile;
pub mod team;
