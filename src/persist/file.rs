//! File-based document persistence.

use std::io;
use std::path::{Path, PathBuf};

use super::DocumentStore;

/// File-backed implementation of [`DocumentStore`].
///
/// # Atomic Writes
///
/// Uses write-to-temp-then-rename pattern to prevent corruption:
/// 1. Write to `{path}.tmp`
/// 2. Rename `{path}.tmp` to `{path}`
///
/// This ensures the file is either fully written or not written at all.
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    path: PathBuf,
}

impl FileDocumentStore {
    /// Creates a store for the document at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        // Append rather than replace the extension (peers.toml -> peers.toml.tmp)
        PathBuf::from(format!("{}.tmp", self.path.display()))
    }
}

impl DocumentStore for FileDocumentStore {
    fn read_document(&self) -> io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }

    fn write_document(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        std::fs::write(&temp_path, bytes)?;
        std::fs::rename(&temp_path, &self.path)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
