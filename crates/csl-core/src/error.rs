//! Error types for csl-core

use std::path::PathBuf;

use crate::remote::RemoteError;

/// Result type for csl-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in csl-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No definition file at the exact path implied by the object's folder
    #[error("Definition not found at {path}")]
    DefinitionNotFound { path: PathBuf },

    /// The remote engine rejected or failed an operation
    #[error("Remote {operation} failed for {name}: {source}")]
    Remote {
        operation: &'static str,
        name: String,
        #[source]
        source: RemoteError,
    },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from csl-fs
    #[error(transparent)]
    Fs(#[from] csl_fs::Error),

    /// Schema or configuration error from csl-schema
    #[error(transparent)]
    Schema(#[from] csl_schema::Error),
}

impl Error {
    pub(crate) fn remote(operation: &'static str, name: &str, source: RemoteError) -> Self {
        Self::Remote {
            operation,
            name: name.to_string(),
            source,
        }
    }
}
