//! Core sync engine for CSL schema definitions
//!
//! Keeps a tree of `.csl` definition files and a live schema engine in step.
//! The [`SyncEngine`] writes one object at a time to either side:
//!
//! - [`DefinitionStore`] maps objects to files and keeps exactly one file per
//!   name under each kind directory
//! - [`RemoteTarget`] renders commands and hands them to a
//!   [`RemoteSchemaClient`] supplied by the caller
//! - [`compare`] reports drift between the two sides

pub mod error;
pub mod logging;
pub mod remote;
pub mod store;
pub mod sync;

pub use error::{Error, Result};
pub use remote::{RemoteError, RemoteSchemaClient, RemoteTarget};
pub use store::{
    CleanupWarning, DefinitionFile, DefinitionStore, DefinitionTree, FileWrite, UnreadableDefinition,
    WritePlan,
};
pub use sync::{
    CheckReport, CheckStatus, DriftItem, DriftKind, SyncAction, SyncEngine, SyncOptions,
    SyncOutcome, SyncReport, Target, compare,
};
