//! In-process document persistence.

use std::io;
use std::sync::{Arc, PoisonError, RwLock};

use super::DocumentStore;

/// A [`DocumentStore`] holding the document bytes in memory.
///
/// Clones share the same underlying buffer, so a test can keep one handle
/// to inspect what a store wrote through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    contents: Arc<RwLock<Option<Vec<u8>>>>,
}

impl MemoryDocumentStore {
    /// Creates an empty store; reading it fails with `NotFound` until written.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `contents`.
    #[must_use]
    pub fn with_contents(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: Arc::new(RwLock::new(Some(contents.into()))),
        }
    }

    /// Replaces the stored bytes, as an out-of-band edit would.
    pub fn replace(&self, contents: impl Into<Vec<u8>>) {
        *self.contents.write().unwrap_or_else(PoisonError::into_inner) = Some(contents.into());
    }

    /// Returns a copy of the stored bytes, if any.
    #[must_use]
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.contents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn read_document(&self) -> io::Result<Vec<u8>> {
        self.contents().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no document has been written")
        })
    }

    fn write_document(&self, bytes: &[u8]) -> io::Result<()> {
        self.replace(bytes);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
