//! Tests for push and retract through the sync engine

use std::sync::Arc;

use csl_core::{Error, SyncAction, SyncEngine, Target};
use csl_schema::{FunctionDefinition, ObjectKind, Parameter, SchemaObject, TableDefinition};
use csl_test_utils::{RecordingClient, TestRoot};

fn orders(folder: &str) -> SchemaObject {
    TableDefinition::new("Orders")
        .with_folder(folder)
        .with_column("Id", "long")
        .with_column("Customer", "string")
        .into()
}

fn foo(folder: &str) -> SchemaObject {
    FunctionDefinition::new("Foo", "T | where Id > minId")
        .with_folder(folder)
        .with_parameter(Parameter::new("minId", "long").with_default("0"))
        .into()
}

fn engine(root: &TestRoot, client: &Arc<RecordingClient>) -> SyncEngine {
    SyncEngine::from_config(&root.config(), Box::new(Arc::clone(client)))
}

fn dry_run_engine(root: &TestRoot, client: &Arc<RecordingClient>) -> SyncEngine {
    let mut config = root.config();
    config.sync.dry_run = true;
    SyncEngine::from_config(&config, Box::new(Arc::clone(client)))
}

mod push_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_push_to_files_writes_canonical_path() {
        let root = TestRoot::new();
        let client = Arc::new(RecordingClient::new());

        let outcome = engine(&root, &client).push(&orders("Sales"), Target::Files).unwrap();

        assert_eq!(outcome.action, SyncAction::Written);
        assert!(!outcome.dry_run);
        assert!(outcome.path.unwrap().ends_with("Tables/Sales/Orders.csl"));
        assert!(outcome.description.starts_with("Wrote "));
        root.assert_file_exists("Tables/Sales/Orders.csl");
        assert!(client.executed().is_empty());
    }

    #[test]
    fn test_move_scenario_sales_to_root() {
        let root = TestRoot::new();
        let client = Arc::new(RecordingClient::new());
        let engine = engine(&root, &client);

        engine.push(&orders("Sales"), Target::Files).unwrap();
        let outcome = engine.push(&orders(""), Target::Files).unwrap();

        assert_eq!(root.files_named("Orders.csl"), vec!["Tables/Orders.csl"]);
        assert_eq!(outcome.removed.len(), 1);
        assert!(outcome.description.contains("(removed "));
    }

    #[test]
    fn test_repeated_push_converges() {
        let root = TestRoot::new();
        let client = Arc::new(RecordingClient::new());
        let engine = engine(&root, &client);

        engine.push(&foo("Reports"), Target::Files).unwrap();
        let first = root.read("Functions/Reports/Foo.csl");
        engine.push(&foo("Reports"), Target::Files).unwrap();
        engine.push(&foo("Reports"), Target::Files).unwrap();

        assert_eq!(root.read("Functions/Reports/Foo.csl"), first);
        assert_eq!(root.files_named("Foo.csl"), vec!["Functions/Reports/Foo.csl"]);
    }

    #[test]
    fn test_push_to_remote_sends_remote_form() {
        let root = TestRoot::new();
        let client = Arc::new(RecordingClient::new());

        let outcome = engine(&root, &client).push(&orders("Sales"), Target::Remote).unwrap();

        let expected =
            ".create-merge table Orders (Id:long, Customer:string) with (folder = \"Sales\")";
        assert_eq!(outcome.action, SyncAction::Executed);
        assert_eq!(outcome.command.as_deref(), Some(expected));
        assert_eq!(client.executed(), vec![("Orders".to_string(), expected.to_string())]);
        root.assert_file_missing("Tables");
    }

    #[test]
    fn test_push_function_to_remote_skips_validation() {
        let root = TestRoot::new();
        let client = Arc::new(RecordingClient::new());

        engine(&root, &client).push(&foo(""), Target::Remote).unwrap();

        let executed = client.executed();
        assert_eq!(executed.len(), 1);
        assert_eq!(
            executed[0].1,
            ".create-or-alter function with (skipvalidation = \"true\") ['Foo'](['minId']:long = 0) {\nT | where Id > minId\n}"
        );
    }

    #[test]
    fn test_remote_failure_is_returned() {
        let root = TestRoot::new();
        let client = Arc::new(RecordingClient::new().fail_on("Orders"));

        let result = engine(&root, &client).push(&orders(""), Target::Remote);

        match result {
            Err(Error::Remote { operation, name, .. }) => {
                assert_eq!(operation, "execute");
                assert_eq!(name, "Orders");
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }
}

mod retract_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_retract_from_files_deletes_file() {
        let root = TestRoot::new();
        let client = Arc::new(RecordingClient::new());
        let engine = engine(&root, &client);
        engine.push(&orders("Sales"), Target::Files).unwrap();

        let outcome = engine.retract(&orders("Sales"), Target::Files).unwrap();

        assert_eq!(outcome.action, SyncAction::Deleted);
        root.assert_file_missing("Tables/Sales/Orders.csl");
    }

    #[test]
    fn test_retract_with_stale_folder_fails() {
        let root = TestRoot::new();
        let client = Arc::new(RecordingClient::new());
        let engine = engine(&root, &client);
        engine.push(&foo("X"), Target::Files).unwrap();

        let result = engine.retract(&foo(""), Target::Files);

        assert!(matches!(result, Err(Error::DefinitionNotFound { .. })));
        root.assert_file_exists("Functions/X/Foo.csl");
    }

    #[test]
    fn test_retract_from_remote_drops_by_name() {
        let root = TestRoot::new();
        let client = Arc::new(RecordingClient::new());

        let outcome = engine(&root, &client).retract(&foo("Any"), Target::Remote).unwrap();

        assert_eq!(outcome.action, SyncAction::Dropped);
        assert_eq!(outcome.command.as_deref(), Some(".drop function Foo ifexists"));
        assert_eq!(client.dropped(), vec![(ObjectKind::Function, "Foo".to_string())]);
    }

    #[test]
    fn test_remote_drop_failure_is_returned() {
        let root = TestRoot::new();
        let client = Arc::new(RecordingClient::new().fail_on("Foo"));

        let result = engine(&root, &client).retract(&foo(""), Target::Remote);

        assert!(matches!(result, Err(Error::Remote { operation: "drop", .. })));
    }
}

mod dry_run_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dry_run_push_to_files_writes_nothing() {
        let root = TestRoot::new();
        root.write_file("Tables/Old/Orders.csl", "old");
        let client = Arc::new(RecordingClient::new());

        let outcome = dry_run_engine(&root, &client)
            .push(&orders("New"), Target::Files)
            .unwrap();

        assert!(outcome.dry_run);
        assert!(outcome.description.starts_with("[dry-run] Would write "));
        assert_eq!(outcome.removed.len(), 1);
        root.assert_file_exists("Tables/Old/Orders.csl");
        root.assert_file_missing("Tables/New/Orders.csl");
    }

    #[test]
    fn test_dry_run_push_to_remote_sends_nothing() {
        let root = TestRoot::new();
        let client = Arc::new(RecordingClient::new());

        let outcome = dry_run_engine(&root, &client)
            .push(&orders(""), Target::Remote)
            .unwrap();

        assert!(outcome.command.is_some());
        assert!(client.executed().is_empty());
    }

    #[test]
    fn test_dry_run_retract_still_requires_file() {
        let root = TestRoot::new();
        let client = Arc::new(RecordingClient::new());
        let engine = dry_run_engine(&root, &client);

        let result = engine.retract(&orders(""), Target::Files);
        assert!(matches!(result, Err(Error::DefinitionNotFound { .. })));

        root.write_file("Tables/Orders.csl", "x");
        let outcome = engine.retract(&orders(""), Target::Files).unwrap();
        assert!(outcome.description.starts_with("[dry-run] Would delete "));
        root.assert_file_exists("Tables/Orders.csl");
    }

    #[test]
    fn test_dry_run_retract_from_remote_drops_nothing() {
        let root = TestRoot::new();
        let client = Arc::new(RecordingClient::new());

        dry_run_engine(&root, &client)
            .retract(&foo(""), Target::Remote)
            .unwrap();

        assert!(client.dropped().is_empty());
    }
}
