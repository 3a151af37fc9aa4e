//! Definition Store
//!
//! Maps schema objects to files under a root folder:
//!
//! ```text
//! <root>/Tables/[<sanitized folder>/]<Name>.csl
//! <root>/Functions/[<sanitized folder>/]<Name>.csl
//! ```
//!
//! Writing tolerates a stale folder: every file with the object's name
//! anywhere under the kind directory is removed before the new file is
//! written, so moves and renames never leave a second copy behind. Deleting
//! trusts the caller's folder and only looks at the exact path.

use std::path::PathBuf;
use std::sync::Arc;

use csl_fs::{NormalizedPath, definition_file_name, io, sanitize_folder, validate_object_name};
use csl_schema::{CommandGenerator, ObjectKind, SchemaObject};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::{Error, Result};

/// A stale-file cleanup step that failed and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupWarning {
    pub path: PathBuf,
    pub message: String,
}

/// What a write would do, computed without touching the filesystem.
#[derive(Debug, Clone)]
pub struct WritePlan {
    /// Where the definition will be written
    pub destination: NormalizedPath,
    /// Existing files with the same name that will be removed first
    pub stale: Vec<NormalizedPath>,
    /// Entries the scan could not read
    pub scan_warnings: Vec<CleanupWarning>,
}

/// Result of a completed write.
#[derive(Debug, Clone)]
pub struct FileWrite {
    pub path: NormalizedPath,
    /// Files removed during cleanup (may include the destination itself)
    pub removed: Vec<NormalizedPath>,
    pub cleanup_warnings: Vec<CleanupWarning>,
}

/// A definition file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionFile {
    pub kind: ObjectKind,
    pub name: String,
    /// Directory between the kind folder and the file, `/`-separated
    pub folder: String,
    pub path: NormalizedPath,
    pub content: String,
}

/// A file or entry under a kind directory that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadableDefinition {
    pub kind: ObjectKind,
    /// Object name from the file stem; `None` when the directory entry
    /// itself could not be read
    pub name: Option<String>,
    pub path: PathBuf,
    pub message: String,
}

/// Everything found under both kind directories.
#[derive(Debug, Clone, Default)]
pub struct DefinitionTree {
    pub files: Vec<DefinitionFile>,
    pub unreadable: Vec<UnreadableDefinition>,
}

impl DefinitionTree {
    /// True when some entry under the tree could not be read.
    pub fn has_unreadable(&self) -> bool {
        !self.unreadable.is_empty()
    }
}

/// Reads and writes schema definitions as files.
pub struct DefinitionStore {
    root: NormalizedPath,
    generator: Arc<dyn CommandGenerator>,
    use_legacy: bool,
}

impl DefinitionStore {
    /// Create a store rooted at `root`.
    ///
    /// `use_legacy` selects the command form written into files.
    pub fn new(root: NormalizedPath, generator: Arc<dyn CommandGenerator>, use_legacy: bool) -> Self {
        Self {
            root,
            generator,
            use_legacy,
        }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// `<root>/Tables` or `<root>/Functions`.
    pub fn kind_dir(&self, kind: ObjectKind) -> NormalizedPath {
        self.root.join(kind.schema_dir().as_str())
    }

    /// The file a definition with this identity belongs in.
    pub fn definition_path(&self, kind: ObjectKind, name: &str, folder: &str) -> NormalizedPath {
        self.kind_dir(kind)
            .join(&sanitize_folder(folder))
            .join(&definition_file_name(name))
    }

    /// The file `object` belongs in, after validating its name.
    pub fn path_for(&self, object: &SchemaObject) -> Result<NormalizedPath> {
        validate_object_name(object.name())?;
        Ok(self.definition_path(object.kind(), object.name(), object.folder()))
    }

    /// Render the text stored in a definition file.
    pub fn render(&self, object: &SchemaObject) -> String {
        self.generator.create_or_alter(object, self.use_legacy)
    }

    /// Every file named `<name>.csl` anywhere under the kind directory.
    ///
    /// This walks the whole subtree on every call. Unreadable entries are
    /// returned as warnings rather than failing the scan.
    pub fn find_existing(
        &self,
        kind: ObjectKind,
        name: &str,
    ) -> (Vec<NormalizedPath>, Vec<CleanupWarning>) {
        let dir = self.kind_dir(kind);
        let file_name = definition_file_name(name);
        let mut found = Vec::new();
        let mut warnings = Vec::new();

        if !dir.is_dir() {
            return (found, warnings);
        }

        for entry in WalkDir::new(dir.to_native()) {
            match entry {
                Ok(entry) => {
                    // Symlinks count too: a linked copy is still a second file
                    if !entry.file_type().is_dir() && entry.file_name() == file_name.as_str() {
                        found.push(NormalizedPath::new(entry.path()));
                    }
                }
                Err(e) => {
                    let path = e.path().map(PathBuf::from).unwrap_or_else(|| dir.to_native());
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                    warnings.push(CleanupWarning {
                        path,
                        message: e.to_string(),
                    });
                }
            }
        }

        found.sort();
        (found, warnings)
    }

    /// Compute what [`write_definition`](Self::write_definition) would do.
    pub fn plan_write(&self, object: &SchemaObject) -> Result<WritePlan> {
        let destination = self.path_for(object)?;
        let (stale, scan_warnings) = self.find_existing(object.kind(), object.name());
        Ok(WritePlan {
            destination,
            stale,
            scan_warnings,
        })
    }

    /// Write `object` to its canonical file, removing every other copy.
    ///
    /// Failing to delete a stale copy is recorded as a warning and the write
    /// proceeds. Only a failure of the final write is an error.
    pub fn write_definition(&self, object: &SchemaObject) -> Result<FileWrite> {
        let plan = self.plan_write(object)?;
        let mut cleanup_warnings = plan.scan_warnings;
        let mut removed = Vec::new();

        for stale in plan.stale {
            match io::remove_file(&stale) {
                Ok(()) => removed.push(stale),
                // Already gone is what we wanted
                Err(e) if e.is_not_found() => {}
                Err(e) => {
                    tracing::warn!(path = %stale, error = %e, "failed to remove stale definition");
                    cleanup_warnings.push(CleanupWarning {
                        path: stale.to_native(),
                        message: e.to_string(),
                    });
                }
            }
        }

        // write_text creates the destination folder when missing
        let content = self.render(object);
        io::write_text(&plan.destination, &content)?;

        tracing::info!(
            kind = %object.kind(),
            name = object.name(),
            path = %plan.destination,
            removed = removed.len(),
            "wrote definition"
        );

        Ok(FileWrite {
            path: plan.destination,
            removed,
            cleanup_warnings,
        })
    }

    /// Resolve the exact file a delete of `object` targets.
    ///
    /// Fails with [`Error::DefinitionNotFound`] when nothing is there, even
    /// if a file with the same name exists in another folder.
    pub fn locate_for_delete(&self, object: &SchemaObject) -> Result<NormalizedPath> {
        let path = self.path_for(object)?;
        if !path.is_file() {
            return Err(Error::DefinitionNotFound {
                path: path.to_native(),
            });
        }
        Ok(path)
    }

    /// Delete the file at the path implied by the object's current folder.
    pub fn delete_definition(&self, object: &SchemaObject) -> Result<NormalizedPath> {
        let path = self.locate_for_delete(object)?;
        self.remove_file(&path)?;

        tracing::info!(kind = %object.kind(), name = object.name(), path = %path, "deleted definition");
        Ok(path)
    }

    /// Delete one exact file.
    pub fn remove_file(&self, path: &NormalizedPath) -> Result<()> {
        io::remove_file(path).map_err(|e| {
            if e.is_not_found() {
                Error::DefinitionNotFound {
                    path: path.to_native(),
                }
            } else {
                Error::Fs(e)
            }
        })
    }

    /// Read every definition file under both kind directories.
    ///
    /// Hidden files (including in-flight temp files) and files without the
    /// definition extension are ignored. Entries that cannot be read are
    /// collected in [`DefinitionTree::unreadable`] and the walk continues.
    pub fn load(&self) -> DefinitionTree {
        let mut tree = DefinitionTree::default();

        for kind in ObjectKind::ALL {
            let dir = self.kind_dir(kind);
            if !dir.is_dir() {
                continue;
            }

            for entry in WalkDir::new(dir.to_native()) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        let path = e.path().map(PathBuf::from).unwrap_or_else(|| dir.to_native());
                        tracing::warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                        tree.unreadable.push(UnreadableDefinition {
                            kind,
                            name: None,
                            path,
                            message: e.to_string(),
                        });
                        continue;
                    }
                };
                if entry.file_type().is_dir() {
                    continue;
                }

                let path = NormalizedPath::new(entry.path());
                let Some(file_name) = path.file_name() else {
                    continue;
                };
                if file_name.starts_with('.') || path.extension() != Some(csl_fs::DEFINITION_EXTENSION) {
                    continue;
                }

                let name = path.file_stem().unwrap_or(file_name).to_string();
                let content = match io::read_text(&path) {
                    Ok(content) => content,
                    Err(e) => {
                        tracing::warn!(path = %path, error = %e, "skipping unreadable definition");
                        tree.unreadable.push(UnreadableDefinition {
                            kind,
                            name: Some(name),
                            path: path.to_native(),
                            message: e.to_string(),
                        });
                        continue;
                    }
                };
                let folder = path
                    .parent()
                    .and_then(|parent| parent.relative_to(&dir).map(str::to_string))
                    .unwrap_or_default();

                tree.files.push(DefinitionFile {
                    kind,
                    name,
                    folder,
                    path,
                    content,
                });
            }
        }

        tree.files
            .sort_by(|a, b| (a.kind, &a.name, &a.path).cmp(&(b.kind, &b.name, &b.path)));
        tree.unreadable
            .sort_by(|a, b| (a.kind, &a.path).cmp(&(b.kind, &b.path)));
        tracing::debug!(
            root = %self.root,
            count = tree.files.len(),
            unreadable = tree.unreadable.len(),
            "loaded definition files"
        );
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csl_schema::{CslCommandGenerator, TableDefinition};
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> DefinitionStore {
        DefinitionStore::new(
            NormalizedPath::new(temp.path()),
            Arc::new(CslCommandGenerator::new()),
            true,
        )
    }

    #[test]
    fn test_definition_path_with_folder() {
        let temp = TempDir::new().unwrap();
        let path = store(&temp).definition_path(ObjectKind::Table, "Orders", "Sales");
        assert_eq!(path.to_native(), temp.path().join("Tables/Sales/Orders.csl"));
    }

    #[test]
    fn test_definition_path_without_folder() {
        let temp = TempDir::new().unwrap();
        let path = store(&temp).definition_path(ObjectKind::Function, "Foo", "");
        assert_eq!(path.to_native(), temp.path().join("Functions/Foo.csl"));
    }

    #[test]
    fn test_path_for_rejects_bad_name() {
        let temp = TempDir::new().unwrap();
        let object: SchemaObject = TableDefinition::new("../evil").into();
        assert!(matches!(
            store(&temp).path_for(&object),
            Err(Error::Fs(csl_fs::Error::InvalidIdentifier { .. }))
        ));
    }

    #[test]
    fn test_find_existing_missing_kind_dir() {
        let temp = TempDir::new().unwrap();
        let (found, warnings) = store(&temp).find_existing(ObjectKind::Table, "Orders");
        assert!(found.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_find_existing_is_case_sensitive() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("Tables");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("orders.csl"), "x").unwrap();

        let (found, _) = store(&temp).find_existing(ObjectKind::Table, "Orders");

        // Case-insensitive filesystems report the lowercase file for both names
        if !dir.join("Orders.csl").exists() {
            assert!(found.is_empty());
        }
    }
}
