//! Push, retract, drift checks and whole-tree sync

mod check;
mod engine;

pub use check::{CheckReport, CheckStatus, DriftItem, DriftKind, compare};
pub use engine::{SyncAction, SyncEngine, SyncOptions, SyncOutcome, SyncReport, Target};
