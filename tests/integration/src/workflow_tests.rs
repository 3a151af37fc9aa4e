//! End-to-end workflows: configuration file to engine to disk and remote.

use std::fs;
use std::sync::Arc;

use csl_core::{CheckStatus, SyncEngine, Target};
use csl_fs::NormalizedPath;
use csl_schema::{FunctionDefinition, Parameter, SchemaObject, SyncConfig, TableDefinition};
use csl_test_utils::{RecordingClient, TestRoot};
use pretty_assertions::assert_eq;

fn live_schema() -> Vec<SchemaObject> {
    vec![
        TableDefinition::new("Orders")
            .with_folder("Sales")
            .with_docstring("One row per order")
            .with_column("Id", "long")
            .with_column("Amount", "real")
            .into(),
        TableDefinition::new("Customers").with_column("Id", "long").into(),
        FunctionDefinition::new("TopOrders", "Orders | top n by Amount")
            .with_folder("Reports/Daily")
            .with_parameter(Parameter::new("n", "int").with_default("10"))
            .into(),
    ]
}

#[test]
fn test_config_file_drives_engine() {
    let root = TestRoot::new();
    root.write_file(
        "csl-sync.toml",
        "root = \"definitions\"\n\n[render]\nfile_legacy = false\n",
    );
    let config = SyncConfig::load(&NormalizedPath::new(root.root().join("csl-sync.toml"))).unwrap();
    let client = Arc::new(RecordingClient::new().with_objects(live_schema()));
    let engine = SyncEngine::from_config(&config, Box::new(Arc::clone(&client)));

    let report = engine.sync(Target::Files).unwrap();

    assert!(report.success);
    assert_eq!(report.actions.len(), 3);
    assert_eq!(
        root.read("definitions/Tables/Customers.csl"),
        ".create-merge table Customers (Id:long)"
    );
    root.assert_file_exists("definitions/Tables/Sales/Orders.csl");
    root.assert_file_exists("definitions/Functions/Reports/Daily/TopOrders.csl");
    assert!(engine.check().unwrap().is_healthy());
}

#[test]
fn test_yaml_config_enables_dry_run() {
    let root = TestRoot::new();
    root.write_file("sync.yaml", "root: schema\nsync:\n  dry_run: true\n");
    let config = SyncConfig::load(&NormalizedPath::new(root.root().join("sync.yaml"))).unwrap();
    let client = Arc::new(RecordingClient::new().with_objects(live_schema()));
    let engine = SyncEngine::from_config(&config, Box::new(Arc::clone(&client)));

    let report = engine.sync(Target::Files).unwrap();

    assert!(engine.options().dry_run);
    assert_eq!(report.actions.len(), 3);
    root.assert_file_missing("schema");
}

#[test]
fn test_files_round_trip_to_remote() {
    let root = TestRoot::new();
    let source = Arc::new(RecordingClient::new().with_objects(live_schema()));
    SyncEngine::from_config(&root.config(), Box::new(Arc::clone(&source)))
        .sync(Target::Files)
        .unwrap();

    let target = Arc::new(RecordingClient::new());
    let engine = SyncEngine::from_config(&root.config(), Box::new(Arc::clone(&target)));
    let report = engine.sync(Target::Remote).unwrap();

    assert!(report.success);
    let executed = target.executed();
    assert_eq!(executed.len(), 3);
    for (name, command) in executed {
        let on_disk = engine
            .store()
            .load()
            .files
            .into_iter()
            .find(|f| f.name == name)
            .unwrap();
        assert_eq!(command, on_disk.content);
    }
}

#[test]
fn test_report_serializes_to_json() {
    let root = TestRoot::new();
    let client = Arc::new(RecordingClient::new().with_objects(live_schema()));
    let engine = SyncEngine::from_config(&root.config(), Box::new(Arc::clone(&client)));

    let check = engine.check().unwrap();
    assert_eq!(check.status, CheckStatus::Drifted);

    let json = serde_json::to_value(&check).unwrap();
    assert_eq!(json["status"], "Drifted");
    assert_eq!(json["items"].as_array().unwrap().len(), 3);
    assert_eq!(json["items"][0]["drift"], "MissingOnDisk");
}

#[test]
fn test_saved_config_loads_back() {
    let root = TestRoot::new();
    let path = NormalizedPath::new(root.root().join("nested/config.json"));
    let mut config = SyncConfig::default();
    config.render.remote_table_legacy = true;
    config.logging.level = "debug".to_string();

    config.save(&path).unwrap();
    let loaded = SyncConfig::load(&path).unwrap();

    assert!(loaded.render.remote_table_legacy);
    assert_eq!(loaded.logging.level, "debug");
    assert_eq!(loaded.root, root.root().join("nested/schema"));
    assert!(fs::metadata(path.to_native()).unwrap().is_file());
}
