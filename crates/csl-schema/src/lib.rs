//! Schema object model and command generation for CSL schema sync.
//!
//! This crate owns the plain data describing tables and functions, the
//! [`CommandGenerator`] seam that turns a definition into control-command
//! text, and the [`SyncConfig`] loaded from disk.

pub mod config;
pub mod error;
pub mod generator;
pub mod model;

pub use config::{LoggingConfig, RenderConfig, SyncConfig, SyncSection};
pub use error::{Error, Result};
pub use generator::{CommandGenerator, CslCommandGenerator};
pub use model::{Column, FunctionDefinition, ObjectKind, Parameter, SchemaObject, TableDefinition};
