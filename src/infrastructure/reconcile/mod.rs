//! Operator infrastructure: the reconciliation loop and desired state sources

mod reconciler;
mod sources;

pub use reconciler::{CycleReport, Reconciler, ReconcilerSettings};
pub use sources::{ChannelSource, ManifestFileSource, StaticSource};
