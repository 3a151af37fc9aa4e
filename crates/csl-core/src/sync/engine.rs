//! SyncEngine implementation
//!
//! The SyncEngine applies one schema object at a time to either side: the
//! definition tree on disk or the live engine. Each call is independent and
//! safe to repeat; nothing is remembered between calls.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use csl_fs::NormalizedPath;
use csl_schema::{CommandGenerator, CslCommandGenerator, ObjectKind, SchemaObject, SyncConfig};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::remote::{RemoteSchemaClient, RemoteTarget};
use crate::store::{CleanupWarning, DefinitionFile, DefinitionStore, DefinitionTree};

use super::check::{self, CheckReport};

/// Which side of the sync an operation writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// The definition tree on disk
    Files,
    /// The live schema engine
    Remote,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Files => write!(f, "files"),
            Target::Remote => write!(f, "remote"),
        }
    }
}

/// What an applied operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    /// Definition file written
    Written,
    /// Definition file deleted
    Deleted,
    /// Create-or-alter command executed remotely
    Executed,
    /// Object dropped remotely
    Dropped,
}

/// Outcome of a successful push or retract.
///
/// A failed operation is an `Err`; an applied one may still carry cleanup
/// warnings for stale files that could not be removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub target: Target,
    pub kind: ObjectKind,
    pub name: String,
    pub action: SyncAction,
    /// True when nothing was changed because of dry-run mode
    pub dry_run: bool,
    /// File written or deleted
    pub path: Option<PathBuf>,
    /// Command sent (or that would be sent) to the engine
    pub command: Option<String>,
    /// Stale files removed (or that would be removed) before writing
    pub removed: Vec<PathBuf>,
    pub cleanup_warnings: Vec<CleanupWarning>,
    /// Human-readable summary
    pub description: String,
}

impl SyncOutcome {
    fn new(target: Target, object_kind: ObjectKind, name: &str, action: SyncAction) -> Self {
        Self {
            target,
            kind: object_kind,
            name: name.to_string(),
            action,
            dry_run: false,
            path: None,
            command: None,
            removed: Vec::new(),
            cleanup_warnings: Vec::new(),
            description: String::new(),
        }
    }

    fn describe(mut self, dry_run: bool, done: String, planned: String) -> Self {
        self.dry_run = dry_run;
        self.description = if dry_run {
            format!("[dry-run] Would {}", planned)
        } else {
            done
        };
        self
    }

    /// True when some stale file could not be cleaned up.
    pub fn has_warnings(&self) -> bool {
        !self.cleanup_warnings.is_empty()
    }
}

/// Report from a whole-tree sync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    /// Whether every object was applied
    pub success: bool,
    /// Actions taken during the operation
    pub actions: Vec<String>,
    /// Per-object failures
    pub errors: Vec<String>,
    /// Cleanup problems that did not stop an object from being applied
    pub warnings: Vec<CleanupWarning>,
}

impl SyncReport {
    /// Create a successful sync report
    pub fn success() -> Self {
        Self {
            success: true,
            actions: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Record an applied operation.
    pub fn record(&mut self, outcome: SyncOutcome) {
        self.actions.push(outcome.description);
        self.warnings.extend(outcome.cleanup_warnings);
    }

    /// Record a failed operation; the report is no longer successful.
    pub fn record_error(&mut self, error: String) {
        self.success = false;
        self.errors.push(error);
    }
}

/// Options for sync operations
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// If true, simulate changes without modifying files or the engine.
    /// Descriptions will be prefixed with "[dry-run] Would ..."
    pub dry_run: bool,
}

/// Engine for pushing and retracting schema objects
///
/// - **push**: write an object to files or the remote engine, overwriting
/// - **retract**: remove an object from files or the remote engine
/// - **check**: compare the definition tree with the live engine
/// - **sync**: make one side match the other
pub struct SyncEngine {
    store: DefinitionStore,
    remote: RemoteTarget,
    options: SyncOptions,
}

impl SyncEngine {
    pub fn new(store: DefinitionStore, remote: RemoteTarget, options: SyncOptions) -> Self {
        Self {
            store,
            remote,
            options,
        }
    }

    /// Build an engine from configuration using the Kusto command generator.
    pub fn from_config(config: &SyncConfig, client: Box<dyn RemoteSchemaClient>) -> Self {
        Self::with_generator(config, client, Arc::new(CslCommandGenerator::new()))
    }

    /// Build an engine from configuration with a custom command generator.
    pub fn with_generator(
        config: &SyncConfig,
        client: Box<dyn RemoteSchemaClient>,
        generator: Arc<dyn CommandGenerator>,
    ) -> Self {
        let store = DefinitionStore::new(
            config.root_path(),
            generator.clone(),
            config.render.file_legacy,
        );
        let remote = RemoteTarget::new(client, generator, config.render);
        let options = SyncOptions {
            dry_run: config.sync.dry_run,
        };
        Self::new(store, remote, options)
    }

    pub fn store(&self) -> &DefinitionStore {
        &self.store
    }

    pub fn remote(&self) -> &RemoteTarget {
        &self.remote
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Write `object` to `target`, overwriting whatever is there.
    ///
    /// # Errors
    ///
    /// File pushes fail only when the final write fails; stale-file cleanup
    /// problems are returned as warnings on the outcome. Remote failures are
    /// returned as [`Error::Remote`](crate::Error::Remote) without retry.
    pub fn push(&self, object: &SchemaObject, target: Target) -> Result<SyncOutcome> {
        let dry_run = self.options.dry_run;
        let mut outcome = match target {
            Target::Files => {
                let mut outcome =
                    SyncOutcome::new(target, object.kind(), object.name(), SyncAction::Written);
                let (path, removed, warnings) = if dry_run {
                    let plan = self.store.plan_write(object)?;
                    (plan.destination, plan.stale, plan.scan_warnings)
                } else {
                    let write = self.store.write_definition(object)?;
                    (write.path, write.removed, write.cleanup_warnings)
                };
                outcome.path = Some(path.to_native());
                outcome.removed = removed.iter().map(|p| p.to_native()).collect();
                outcome.cleanup_warnings = warnings;
                outcome.describe(
                    dry_run,
                    format!("Wrote {}", path),
                    format!("write {}", path),
                )
            }
            Target::Remote => {
                let mut outcome =
                    SyncOutcome::new(target, object.kind(), object.name(), SyncAction::Executed);
                let command = if dry_run {
                    self.remote.render(object)
                } else {
                    self.remote.apply(object)?
                };
                outcome.command = Some(command);
                outcome.describe(
                    dry_run,
                    format!("Applied {} {} to remote", object.kind(), object.name()),
                    format!("apply {} {} to remote", object.kind(), object.name()),
                )
            }
        };

        if !outcome.removed.is_empty() {
            let removed = outcome
                .removed
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            outcome.description.push_str(&format!(" (removed {})", removed));
        }
        Ok(outcome)
    }

    /// Remove `object` from `target`.
    ///
    /// # Errors
    ///
    /// On files, fails with [`Error::DefinitionNotFound`](crate::Error::DefinitionNotFound)
    /// when no file exists at the exact path implied by the object's folder,
    /// even if a same-named file exists elsewhere. Remote drops surface the
    /// client's error unchanged.
    pub fn retract(&self, object: &SchemaObject, target: Target) -> Result<SyncOutcome> {
        let dry_run = self.options.dry_run;
        let outcome = match target {
            Target::Files => {
                let mut outcome =
                    SyncOutcome::new(target, object.kind(), object.name(), SyncAction::Deleted);
                let path = if dry_run {
                    self.store.locate_for_delete(object)?
                } else {
                    self.store.delete_definition(object)?
                };
                outcome.path = Some(path.to_native());
                outcome.describe(
                    dry_run,
                    format!("Deleted {}", path),
                    format!("delete {}", path),
                )
            }
            Target::Remote => {
                let mut outcome =
                    SyncOutcome::new(target, object.kind(), object.name(), SyncAction::Dropped);
                if !dry_run {
                    self.remote.remove(object)?;
                }
                outcome.command = Some(self.remote.drop_command(object.kind(), object.name()));
                outcome.describe(
                    dry_run,
                    format!("Dropped {} {} from remote", object.kind(), object.name()),
                    format!("drop {} {} from remote", object.kind(), object.name()),
                )
            }
        };
        Ok(outcome)
    }

    /// Compare the definition tree with the live engine.
    pub fn check(&self) -> Result<CheckReport> {
        let tree = self.store.load();
        let live = self.remote.list()?;
        Ok(check::compare(&self.store, &tree, &live))
    }

    /// Make `direction` match the other side.
    ///
    /// - `Target::Files`: every live object is pushed to files and files
    ///   whose name no longer exists remotely are deleted.
    /// - `Target::Remote`: every definition file's text is executed remotely
    ///   and live objects without a file are dropped.
    ///
    /// Failures are collected per object; the remaining objects still run.
    /// Unreadable definition files are failures of their own object only.
    /// Only a failure to list the remote objects aborts the whole sync.
    pub fn sync(&self, direction: Target) -> Result<SyncReport> {
        let tree = self.store.load();
        let live = self.remote.list()?;

        tracing::info!(
            %direction,
            files = tree.files.len(),
            unreadable = tree.unreadable.len(),
            remote = live.len(),
            dry_run = self.options.dry_run,
            "starting sync"
        );

        let report = match direction {
            Target::Files => self.sync_to_files(&tree, &live),
            Target::Remote => self.sync_to_remote(&tree, &live),
        };

        if !report.success {
            tracing::warn!(errors = report.errors.len(), "sync finished with errors");
        }
        Ok(report)
    }

    fn sync_to_files(&self, tree: &DefinitionTree, live: &[SchemaObject]) -> SyncReport {
        let mut report = SyncReport::success();

        for object in live {
            match self.push(object, Target::Files) {
                Ok(outcome) => report.record(outcome),
                Err(e) => report.record_error(format!("{} {}: {}", object.kind(), object.name(), e)),
            }
        }

        let live_names: HashSet<(ObjectKind, &str)> =
            live.iter().map(|o| (o.kind(), o.name())).collect();

        let orphans = tree
            .files
            .iter()
            .filter(|file| !live_names.contains(&(file.kind, file.name.as_str())))
            .map(|file| (file.kind, file.name.as_str(), file.path.clone()));

        // Unreadable files need no content to be replaced or removed. Those
        // named after a live object were already replaced by the push above.
        let mut unreadable_orphans = Vec::new();
        for entry in &tree.unreadable {
            match &entry.name {
                Some(name) if live_names.contains(&(entry.kind, name.as_str())) => {}
                Some(name) => {
                    unreadable_orphans.push((entry.kind, name.as_str(), NormalizedPath::new(&entry.path)))
                }
                None => report.record_error(format!(
                    "{}: cannot read {}: {}",
                    entry.kind,
                    entry.path.display(),
                    entry.message
                )),
            }
        }

        for (kind, name, path) in orphans.chain(unreadable_orphans) {
            if self.options.dry_run {
                report.actions.push(format!("[dry-run] Would delete {}", path));
                continue;
            }
            match self.store.remove_file(&path) {
                Ok(()) => report.actions.push(format!("Deleted {}", path)),
                Err(e) => report.record_error(format!("{} {}: {}", kind, name, e)),
            }
        }

        report
    }

    fn sync_to_remote(&self, tree: &DefinitionTree, live: &[SchemaObject]) -> SyncReport {
        let mut report = SyncReport::success();

        // The live object behind an unreadable file is left alone
        let mut unreadable_names = HashSet::new();
        for entry in &tree.unreadable {
            if let Some(name) = &entry.name {
                unreadable_names.insert((entry.kind, name.as_str()));
            }
            report.record_error(format!(
                "{} {}: cannot read {}: {}",
                entry.kind,
                entry.name.as_deref().unwrap_or("*"),
                entry.path.display(),
                entry.message
            ));
        }

        let mut by_name: BTreeMap<(ObjectKind, &str), Vec<&DefinitionFile>> = BTreeMap::new();
        for file in &tree.files {
            by_name
                .entry((file.kind, file.name.as_str()))
                .or_default()
                .push(file);
        }

        for ((kind, name), copies) in &by_name {
            let [file] = copies.as_slice() else {
                let paths = copies
                    .iter()
                    .map(|f| f.path.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                report.record_error(format!("{} {}: duplicate definitions at {}", kind, name, paths));
                continue;
            };

            if self.options.dry_run {
                report
                    .actions
                    .push(format!("[dry-run] Would apply {} to remote", file.path));
                continue;
            }
            match self.remote.execute_text(name, &file.content) {
                Ok(()) => report.actions.push(format!("Applied {} to remote", file.path)),
                Err(e) => report.record_error(format!("{} {}: {}", kind, name, e)),
            }
        }

        for object in live {
            let key = (object.kind(), object.name());
            if by_name.contains_key(&key) || unreadable_names.contains(&key) {
                continue;
            }
            match self.retract(object, Target::Remote) {
                Ok(outcome) => report.record(outcome),
                Err(e) => report.record_error(format!("{} {}: {}", object.kind(), object.name(), e)),
            }
        }

        report
    }
}
