//! Persistence gateway: the store's only route to the file system.
//!
//! The store never touches `std::fs` directly.  It talks to a [`ConfigFs`]
//! implementation, which lets tests and embedders swap the disk for memory
//! (see [`memory::MemoryFs`]) or for a mock that fails on demand.
//!
//! Every operation opens, uses, and releases its file handle before
//! returning, on success and on failure alike.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

pub mod memory;

/// Error type for persistence operations.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The file to read or copy from does not exist.
    #[error("config source not found: {}", .path.display())]
    SourceMissing { path: PathBuf },

    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file (or its parent directory) could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The copy could not be completed.
    #[error("failed to copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PersistenceError {
    /// The path the failed operation was about (the destination for copies).
    pub fn path(&self) -> &Path {
        match self {
            Self::SourceMissing { path } | Self::Read { path, .. } | Self::Write { path, .. } => path,
            Self::Copy { to, .. } => to,
        }
    }

    /// Short description of the cause, without the path.
    pub fn reason(&self) -> String {
        match self {
            Self::SourceMissing { .. } => "file not found".to_string(),
            Self::Read { source, .. } | Self::Write { source, .. } | Self::Copy { source, .. } => {
                source.to_string()
            }
        }
    }
}

/// File operations the store depends on.
///
/// Implementations must be `Send` so a store can live behind a `Mutex`.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigFs: Send {
    /// Returns the full text of the file at `path`.
    ///
    /// Bytes that are not valid UTF-8 must not make the whole file
    /// unreadable; implementations replace them with U+FFFD.
    fn read_to_string(&self, path: &Path) -> Result<String, PersistenceError>;

    /// Creates or truncates the file at `path` and writes `contents`.
    fn write(&self, path: &Path, contents: &str) -> Result<(), PersistenceError>;

    /// Duplicates the file at `from` to `to`, overwriting `to`.
    fn copy(&self, from: &Path, to: &Path) -> Result<(), PersistenceError>;
}

/// [`ConfigFs`] backed by the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl ConfigFs for LocalFs {
    fn read_to_string(&self, path: &Path) -> Result<String, PersistenceError> {
        let bytes = std::fs::read(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => PersistenceError::SourceMissing {
                path: path.to_path_buf(),
            },
            _ => PersistenceError::Read {
                path: path.to_path_buf(),
                source,
            },
        })?;

        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(err) => {
                warn!(
                    "{} is not valid UTF-8 (first bad byte at offset {}); replacing invalid bytes",
                    path.display(),
                    err.utf8_error().valid_up_to()
                );
                Ok(String::from_utf8_lossy(err.as_bytes()).into_owned())
            }
        }
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PersistenceError> {
        // Ensure directory exists before writing.
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| PersistenceError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(path, contents).map_err(|source| PersistenceError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<(), PersistenceError> {
        if !from.is_file() {
            return Err(PersistenceError::SourceMissing {
                path: from.to_path_buf(),
            });
        }

        std::fs::copy(from, to)
            .map(|_| ())
            .map_err(|source| PersistenceError::Copy {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source,
            })
    }
}
