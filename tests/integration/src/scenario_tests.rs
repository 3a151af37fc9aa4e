//! Scenario tests for moves, precise deletes and remote failures.

use std::sync::Arc;

use csl_core::{Error, SyncEngine, Target};
use csl_schema::{FunctionDefinition, SchemaObject, TableDefinition};
use csl_test_utils::{RecordingClient, TestRoot};
use pretty_assertions::assert_eq;

fn engine(root: &TestRoot, client: &Arc<RecordingClient>) -> SyncEngine {
    SyncEngine::from_config(&root.config(), Box::new(Arc::clone(client)))
}

/// A table moved out of its folder ends up as a single file at the root of
/// the kind directory.
#[test]
fn scenario_table_moves_out_of_folder() {
    let root = TestRoot::new();
    let client = Arc::new(RecordingClient::new());
    let engine = engine(&root, &client);
    let in_sales: SchemaObject = TableDefinition::new("Orders")
        .with_folder("Sales")
        .with_column("Id", "long")
        .into();
    let at_root: SchemaObject = TableDefinition::new("Orders").with_column("Id", "long").into();

    engine.push(&in_sales, Target::Files).unwrap();
    root.assert_file_exists("Tables/Sales/Orders.csl");
    engine.push(&at_root, Target::Files).unwrap();

    assert_eq!(root.files_named("Orders.csl"), vec!["Tables/Orders.csl"]);
    assert!(!root.read("Tables/Orders.csl").contains("folder"));
}

/// Retracting with a folder that no longer matches the file fails and leaves
/// the file alone.
#[test]
fn scenario_retract_with_stale_folder() {
    let root = TestRoot::new();
    let client = Arc::new(RecordingClient::new());
    let engine = engine(&root, &client);
    let in_x: SchemaObject = FunctionDefinition::new("Foo", "print 1").with_folder("X").into();
    let at_root: SchemaObject = FunctionDefinition::new("Foo", "print 1").into();

    engine.push(&in_x, Target::Files).unwrap();
    let result = engine.retract(&at_root, Target::Files);

    match result {
        Err(Error::DefinitionNotFound { path }) => assert!(path.ends_with("Functions/Foo.csl")),
        other => panic!("expected DefinitionNotFound, got {other:?}"),
    }
    root.assert_file_exists("Functions/X/Foo.csl");

    engine.retract(&in_x, Target::Files).unwrap();
    assert!(root.files_named("Foo.csl").is_empty());
}

/// A remote rejection reaches the caller with the client's message intact
/// and nothing else is attempted.
#[test]
fn scenario_remote_rejection_propagates() {
    let root = TestRoot::new();
    let client = Arc::new(RecordingClient::new().fail_on("Orders"));
    let engine = engine(&root, &client);
    let orders: SchemaObject = TableDefinition::new("Orders").with_column("Id", "long").into();

    let error = engine.push(&orders, Target::Remote).unwrap_err();

    assert!(error.to_string().contains("engine rejected command for Orders"));
    let source = std::error::Error::source(&error).unwrap();
    assert_eq!(source.to_string(), "engine rejected command for Orders");
    assert!(client.executed().is_empty());
    root.assert_file_missing("Tables");
}

/// Pushing the same object to both sides keeps files in the legacy form and
/// sends the plain form for tables.
#[test]
fn scenario_push_both_sides() {
    let root = TestRoot::new();
    let client = Arc::new(RecordingClient::new());
    let engine = engine(&root, &client);
    let orders: SchemaObject = TableDefinition::new("Orders").with_column("Id", "long").into();

    engine.push(&orders, Target::Files).unwrap();
    engine.push(&orders, Target::Remote).unwrap();

    assert_eq!(root.read("Tables/Orders.csl"), ".create-merge table ['Orders'] (['Id']:long)");
    assert_eq!(client.executed()[0].1, ".create-merge table Orders (Id:long)");
}
