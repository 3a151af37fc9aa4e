//! Filesystem layer for CSL schema sync
//!
//! Provides normalized path handling, lossy folder sanitization, atomic text
//! I/O and a format-agnostic configuration store. Everything that turns a
//! logical schema location into a physical path goes through this crate so
//! that writers and cleanup scans agree on the same location.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;
pub mod sanitize;

pub use checksum::compute_content_checksum;
pub use config::{ConfigFormat, load_config, save_config};
pub use constants::{DEFINITION_EXTENSION, SchemaDir};
pub use error::{Error, Result};
pub use path::NormalizedPath;
pub use sanitize::{definition_file_name, sanitize_folder, validate_object_name};
