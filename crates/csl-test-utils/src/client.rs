//! [`RecordingClient`] in-memory remote engine.

use std::collections::HashSet;
use std::sync::Mutex;

use csl_core::{RemoteError, RemoteSchemaClient};
use csl_schema::{ObjectKind, SchemaObject};

#[derive(Default)]
struct State {
    executed: Vec<(String, String)>,
    dropped: Vec<(ObjectKind, String)>,
    objects: Vec<SchemaObject>,
    failing: HashSet<String>,
    fail_list: bool,
}

/// Remote client that records every call instead of talking to an engine.
///
/// `list_objects` returns whatever was preset with
/// [`with_objects`](Self::with_objects); executing or dropping does not
/// change the listing.
#[derive(Default)]
pub struct RecordingClient {
    state: Mutex<State>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset the objects returned by `list_objects`.
    pub fn with_objects(self, objects: Vec<SchemaObject>) -> Self {
        self.state.lock().unwrap().objects = objects;
        self
    }

    /// Make every execute or drop naming `name` fail.
    pub fn fail_on(self, name: &str) -> Self {
        self.state.lock().unwrap().failing.insert(name.to_string());
        self
    }

    /// Make `list_objects` fail.
    pub fn fail_listing(self) -> Self {
        self.state.lock().unwrap().fail_list = true;
        self
    }

    /// `(object_name, command)` pairs in call order.
    pub fn executed(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().executed.clone()
    }

    /// `(kind, name)` pairs in call order.
    pub fn dropped(&self) -> Vec<(ObjectKind, String)> {
        self.state.lock().unwrap().dropped.clone()
    }
}

impl RemoteSchemaClient for RecordingClient {
    fn execute(&self, command: &str, object_name: &str) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        if state.failing.contains(object_name) {
            return Err(format!("engine rejected command for {object_name}").into());
        }
        state
            .executed
            .push((object_name.to_string(), command.to_string()));
        Ok(())
    }

    fn drop_object(&self, kind: ObjectKind, name: &str) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        if state.failing.contains(name) {
            return Err(format!("engine refused to drop {name}").into());
        }
        state.dropped.push((kind, name.to_string()));
        Ok(())
    }

    fn list_objects(&self) -> Result<Vec<SchemaObject>, RemoteError> {
        let state = self.state.lock().unwrap();
        if state.fail_list {
            return Err("connection refused".into());
        }
        Ok(state.objects.clone())
    }
}
