//! Store error types.

use std::io;

use thiserror::Error;

use crate::persist::SchemaError;

/// The persisted document could not be loaded.
///
/// Recoverable by fixing the document and retrying the load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The document is missing or unreadable.
    #[error("Failed to read peer document '{location}': {source}")]
    Read {
        /// Where the document was read from
        location: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The document does not match the schema.
    #[error("Invalid peer document '{location}': {source}")]
    Schema {
        /// Where the document was read from
        location: String,
        /// The underlying schema error
        #[source]
        source: SchemaError,
    },
}

impl LoadError {
    /// Returns true if the document does not exist at all.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Read { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// The live document could not be written out.
///
/// The in-memory document is left untouched.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The document could not be encoded.
    #[error("Failed to serialize peer document: {0}")]
    Serialize(#[source] SchemaError),

    /// The encoded document could not be written.
    #[error("Failed to write peer document '{location}': {source}")]
    Write {
        /// Where the document was written to
        location: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Errors returned by [`ConfigStore`](super::ConfigStore) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Loading the persisted document failed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The store was used before a successful load.
    #[error("Peer document has not been loaded")]
    NotInitialized,

    /// Writing the persisted document failed.
    #[error(transparent)]
    Persist(#[from] PersistError),
}
