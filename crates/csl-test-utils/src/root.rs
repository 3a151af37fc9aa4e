//! [`TestRoot`] temporary definition tree.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use csl_core::DefinitionStore;
use csl_schema::{CslCommandGenerator, SyncConfig};
use tempfile::TempDir;

/// A temporary definition root with helpers for setup and assertion.
///
/// # Example
///
/// ```rust,no_run
/// use csl_test_utils::TestRoot;
///
/// let root = TestRoot::new();
/// root.write_file("Tables/Sales/Orders.csl", ".create-merge table Orders (Id:long)");
/// root.assert_file_exists("Tables/Sales/Orders.csl");
/// ```
pub struct TestRoot {
    temp_dir: TempDir,
}

impl Default for TestRoot {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRoot {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// A configuration rooted at this directory with default settings.
    pub fn config(&self) -> SyncConfig {
        SyncConfig {
            root: self.root().to_path_buf(),
            ..SyncConfig::default()
        }
    }

    /// A store rooted here that writes the legacy file form.
    pub fn store(&self) -> DefinitionStore {
        DefinitionStore::new(
            self.root().into(),
            Arc::new(CslCommandGenerator::new()),
            true,
        )
    }

    /// Write `content` to `path` (relative to root), creating parents.
    pub fn write_file(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
    }

    /// Read the file at `path` (relative to root).
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, path: &str) -> String {
        let full_path = self.root().join(path);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    /// Every file named `file_name` anywhere under the root, relative and
    /// `/`-separated, sorted.
    pub fn files_named(&self, file_name: &str) -> Vec<String> {
        let mut found = Vec::new();
        collect(self.root(), file_name, &mut found);
        let mut relative: Vec<String> = found
            .into_iter()
            .map(|p| {
                p.strip_prefix(self.root())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        relative.sort();
        relative
    }

    /// Assert that `path` (relative to root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to root) does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_missing(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }
}

fn collect(dir: &Path, file_name: &str, found: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(&path, file_name, found);
        } else if entry.file_name() == file_name {
            found.push(path);
        }
    }
}
