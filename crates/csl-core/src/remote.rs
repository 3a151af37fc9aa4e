//! Remote Schema Client adapter
//!
//! The live engine is reached through [`RemoteSchemaClient`], implemented
//! outside this crate. Every call blocks until the engine has finished or
//! failed; timeouts and retries belong to the client implementation.

use std::sync::Arc;

use csl_schema::{CommandGenerator, ObjectKind, RenderConfig, SchemaObject};

use crate::{Error, Result};

/// Error type returned by remote client implementations.
pub type RemoteError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Blocking access to the live schema engine.
pub trait RemoteSchemaClient: Send + Sync {
    /// Execute a control command. `object_name` identifies the object the
    /// command targets, for whatever conflict handling the engine applies.
    fn execute(&self, command: &str, object_name: &str) -> std::result::Result<(), RemoteError>;

    /// Drop an object by name using the engine's native drop operation.
    fn drop_object(&self, kind: ObjectKind, name: &str) -> std::result::Result<(), RemoteError>;

    /// Enumerate the objects currently deployed.
    fn list_objects(&self) -> std::result::Result<Vec<SchemaObject>, RemoteError>;
}

impl<T: RemoteSchemaClient + ?Sized> RemoteSchemaClient for Arc<T> {
    fn execute(&self, command: &str, object_name: &str) -> std::result::Result<(), RemoteError> {
        (**self).execute(command, object_name)
    }

    fn drop_object(&self, kind: ObjectKind, name: &str) -> std::result::Result<(), RemoteError> {
        (**self).drop_object(kind, name)
    }

    fn list_objects(&self) -> std::result::Result<Vec<SchemaObject>, RemoteError> {
        (**self).list_objects()
    }
}

/// Applies schema objects to the live engine.
pub struct RemoteTarget {
    client: Box<dyn RemoteSchemaClient>,
    generator: Arc<dyn CommandGenerator>,
    render: RenderConfig,
}

impl RemoteTarget {
    pub fn new(
        client: Box<dyn RemoteSchemaClient>,
        generator: Arc<dyn CommandGenerator>,
        render: RenderConfig,
    ) -> Self {
        Self {
            client,
            generator,
            render,
        }
    }

    /// Render the create-or-alter command sent for `object`.
    pub fn render(&self, object: &SchemaObject) -> String {
        self.generator
            .create_or_alter(object, self.render.remote_legacy(object.kind()))
    }

    /// Render the drop command for an object.
    pub fn drop_command(&self, kind: ObjectKind, name: &str) -> String {
        self.generator.drop_command(kind, name)
    }

    /// Create or replace `object` on the engine. Returns the command sent.
    pub fn apply(&self, object: &SchemaObject) -> Result<String> {
        let command = self.render(object);
        self.execute_text(object.name(), &command)?;
        Ok(command)
    }

    /// Submit an already rendered command, e.g. a definition file's text.
    pub fn execute_text(&self, name: &str, command: &str) -> Result<()> {
        tracing::debug!(name, command, "executing remote command");
        self.client
            .execute(command, name)
            .map_err(|e| Error::remote("execute", name, e))?;
        tracing::info!(name, "applied remote definition");
        Ok(())
    }

    /// Drop `object` from the engine.
    pub fn remove(&self, object: &SchemaObject) -> Result<()> {
        self.remove_by_name(object.kind(), object.name())
    }

    /// Drop an object by kind and name.
    pub fn remove_by_name(&self, kind: ObjectKind, name: &str) -> Result<()> {
        self.client
            .drop_object(kind, name)
            .map_err(|e| Error::remote("drop", name, e))?;
        tracing::info!(%kind, name, "dropped remote object");
        Ok(())
    }

    /// Enumerate deployed objects.
    pub fn list(&self) -> Result<Vec<SchemaObject>> {
        self.client
            .list_objects()
            .map_err(|e| Error::remote("list", "*", e))
    }
}
