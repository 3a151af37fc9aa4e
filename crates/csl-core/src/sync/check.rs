//! Drift detection between the definition tree and the live engine
//!
//! Files are compared with the file-form rendering of the live object, so a
//! tree freshly written by a push compares as healthy.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use csl_fs::checksum::{compute_content_checksum, short_checksum};
use csl_schema::{ObjectKind, SchemaObject};
use serde::{Deserialize, Serialize};

use crate::store::{DefinitionFile, DefinitionStore, DefinitionTree};

/// Overall result of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    /// Both sides agree
    Healthy,
    /// At least one object differs
    Drifted,
}

/// How a single object differs between the two sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriftKind {
    /// A definition file exists but the engine has no such object
    MissingOnRemote,
    /// The engine has the object but no definition file exists
    MissingOnDisk,
    /// Both exist with different definitions
    ContentMismatch,
    /// Same definition, but the file is not where the live folder puts it
    Misplaced,
    /// More than one file claims the same name
    Duplicate,
    /// A file under the tree could not be read
    Unreadable,
}

/// An object that differs between disk and the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftItem {
    pub kind: ObjectKind,
    pub name: String,
    pub drift: DriftKind,
    /// The file involved, when there is exactly one
    pub path: Option<PathBuf>,
    /// Human-readable description of the drift
    pub description: String,
}

/// Report from a drift check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub status: CheckStatus,
    pub items: Vec<DriftItem>,
}

impl CheckReport {
    /// Create a report from the items found; healthy when there are none
    pub fn from_items(items: Vec<DriftItem>) -> Self {
        let status = if items.is_empty() {
            CheckStatus::Healthy
        } else {
            CheckStatus::Drifted
        };
        Self { status, items }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == CheckStatus::Healthy
    }

    /// Items of one drift kind
    pub fn items_of(&self, drift: DriftKind) -> impl Iterator<Item = &DriftItem> {
        self.items.iter().filter(move |item| item.drift == drift)
    }
}

/// Compare a loaded definition tree against the live objects.
///
/// An unreadable file is reported once as [`DriftKind::Unreadable`]; a live
/// object sharing its name is not also reported as missing on disk.
pub fn compare(store: &DefinitionStore, tree: &DefinitionTree, live: &[SchemaObject]) -> CheckReport {
    let mut on_disk: BTreeMap<(ObjectKind, &str), Vec<&DefinitionFile>> = BTreeMap::new();
    for file in &tree.files {
        on_disk
            .entry((file.kind, file.name.as_str()))
            .or_default()
            .push(file);
    }

    let on_remote: BTreeMap<(ObjectKind, &str), &SchemaObject> =
        live.iter().map(|o| ((o.kind(), o.name()), o)).collect();

    let mut items = Vec::new();
    let mut unreadable_names = HashSet::new();

    for entry in &tree.unreadable {
        if let Some(name) = &entry.name {
            unreadable_names.insert((entry.kind, name.as_str()));
        }
        items.push(DriftItem {
            kind: entry.kind,
            name: entry.name.clone().unwrap_or_default(),
            drift: DriftKind::Unreadable,
            path: Some(entry.path.clone()),
            description: format!("Cannot read {}: {}", entry.path.display(), entry.message),
        });
    }

    for (&(kind, name), copies) in &on_disk {
        if copies.len() > 1 {
            let paths = copies
                .iter()
                .map(|f| f.path.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            items.push(DriftItem {
                kind,
                name: name.to_string(),
                drift: DriftKind::Duplicate,
                path: None,
                description: format!("{} files claim this name: {}", copies.len(), paths),
            });
            continue;
        }

        let file = copies[0];
        let Some(object) = on_remote.get(&(kind, name)) else {
            items.push(DriftItem {
                kind,
                name: name.to_string(),
                drift: DriftKind::MissingOnRemote,
                path: Some(file.path.to_native()),
                description: format!("Only on disk at {}", file.path),
            });
            continue;
        };

        let expected = compute_content_checksum(&store.render(object));
        let actual = compute_content_checksum(&file.content);
        if expected != actual {
            items.push(DriftItem {
                kind,
                name: name.to_string(),
                drift: DriftKind::ContentMismatch,
                path: Some(file.path.to_native()),
                description: format!(
                    "Checksum mismatch: remote {}, disk {}",
                    short_checksum(&expected),
                    short_checksum(&actual)
                ),
            });
            continue;
        }

        let canonical = store.definition_path(kind, name, object.folder());
        if canonical != file.path {
            items.push(DriftItem {
                kind,
                name: name.to_string(),
                drift: DriftKind::Misplaced,
                path: Some(file.path.to_native()),
                description: format!("Expected at {}, found at {}", canonical, file.path),
            });
        }
    }

    for (&(kind, name), object) in &on_remote {
        if on_disk.contains_key(&(kind, name)) || unreadable_names.contains(&(kind, name)) {
            continue;
        }
        items.push(DriftItem {
            kind,
            name: name.to_string(),
            drift: DriftKind::MissingOnDisk,
            path: None,
            description: format!(
                "Only on remote, expected at {}",
                store.definition_path(kind, name, object.folder())
            ),
        });
    }

    CheckReport::from_items(items)
}
