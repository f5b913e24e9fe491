//! In-memory [`ConfigFs`] for tests and for embedding without a disk.
//!
//! Clones share the same file table, so a test can keep one handle while
//! the store owns another and inspect what the store wrote.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{ConfigFs, PersistenceError};

/// A file table keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
}

impl MemoryFs {
    /// Creates an empty file table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Creates or replaces a file.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files().insert(path.into(), contents.into());
    }

    /// Deletes a file.  Returns `true` if it existed.
    pub fn remove(&self, path: &Path) -> bool {
        self.files().remove(path).is_some()
    }

    /// Returns a copy of the file contents, if the file exists.
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files().get(path).cloned()
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.files().contains_key(path)
    }

    fn files(&self) -> MutexGuard<'_, HashMap<PathBuf, String>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ConfigFs for MemoryFs {
    fn read_to_string(&self, path: &Path) -> Result<String, PersistenceError> {
        self.contents(path)
            .ok_or_else(|| PersistenceError::SourceMissing {
                path: path.to_path_buf(),
            })
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PersistenceError> {
        self.insert(path, contents);
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<(), PersistenceError> {
        let contents = self.read_to_string(from)?;
        self.insert(to, contents);
        Ok(())
    }
}
