//! Persistence of peer documents.
//!
//! This module provides:
//! - Byte-level storage abstraction ([`DocumentStore`])
//! - File-backed storage with atomic writes ([`FileDocumentStore`])
//! - In-process storage ([`MemoryDocumentStore`])
//! - The on-disk schema and its TOML/JSON codecs ([`DocumentFormat`])
//!
//! Documents are always read and written whole.

mod file;
mod memory;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use file::FileDocumentStore;
pub use memory::MemoryDocumentStore;

use std::fmt;
use std::io;
use std::path::Path;
use std::str::Utf8Error;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attributes::AttributeSet;
use crate::peer::{Definition, PeerDocument};

/// Current document schema version.
///
/// Documents without a `version` key are read as this version.
pub const DOCUMENT_VERSION: u32 = 1;

/// Abstraction over where a serialized document lives.
///
/// Implementations should:
/// - Return the complete document from `read_document`
/// - Replace the complete document in `write_document`, never leaving a
///   partially written one behind
pub trait DocumentStore: Send + Sync {
    /// Reads the complete persisted document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is missing or cannot be read.
    fn read_document(&self) -> io::Result<Vec<u8>>;

    /// Replaces the persisted document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    fn write_document(&self, bytes: &[u8]) -> io::Result<()>;

    /// Human-readable location, for logs and error messages.
    fn location(&self) -> String;
}

impl<T: DocumentStore + ?Sized> DocumentStore for &T {
    fn read_document(&self) -> io::Result<Vec<u8>> {
        (*self).read_document()
    }

    fn write_document(&self, bytes: &[u8]) -> io::Result<()> {
        (*self).write_document(bytes)
    }

    fn location(&self) -> String {
        (*self).location()
    }
}

/// Error type for document encoding and decoding.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The document bytes are not UTF-8.
    #[error("Document is not valid UTF-8: {0}")]
    Encoding(#[from] Utf8Error),

    /// The document is not valid TOML or does not match the schema.
    #[error("Invalid TOML document: {0}")]
    Toml(#[from] toml::de::Error),

    /// The document is not valid JSON or does not match the schema.
    #[error("Invalid JSON document: {0}")]
    Json(#[source] serde_json::Error),

    /// The document declares a schema version this build does not read.
    #[error("Unsupported document version {found}: expected {DOCUMENT_VERSION}")]
    Version {
        /// Version found in the document
        found: u32,
    },

    /// The document could not be rendered as TOML.
    #[error("Failed to serialize TOML document: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// The document could not be rendered as JSON.
    #[error("Failed to serialize JSON document: {0}")]
    JsonSerialize(#[source] serde_json::Error),
}

/// On-disk encoding of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// TOML (`[defaults]` table plus `[[definition]]` entries).
    #[default]
    Toml,
    /// JSON with the same structure.
    Json,
}

impl DocumentFormat {
    /// Infers the format from a file extension: `.json` is JSON, anything
    /// else is TOML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }

    /// Parses a format name (`toml` or `json`, case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Decodes a document.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the bytes are not a valid document.
    pub fn parse<A: AttributeSet>(self, bytes: &[u8]) -> Result<PeerDocument<A>, SchemaError> {
        let file: DocumentFile<A> = match self {
            Self::Toml => toml::from_str(std::str::from_utf8(bytes)?)?,
            Self::Json => serde_json::from_slice(bytes).map_err(SchemaError::Json)?,
        };

        match file.version {
            Some(found) if found != DOCUMENT_VERSION => Err(SchemaError::Version { found }),
            _ => Ok(PeerDocument {
                defaults: file.defaults,
                definitions: file.definitions,
            }),
        }
    }

    /// Encodes a document.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the document cannot be rendered.
    pub fn serialize<A: AttributeSet>(
        self,
        document: &PeerDocument<A>,
    ) -> Result<Vec<u8>, SchemaError> {
        let file = DocumentFileRef {
            version: DOCUMENT_VERSION,
            defaults: &document.defaults,
            definitions: &document.definitions,
        };

        match self {
            Self::Toml => Ok(toml::to_string_pretty(&file)?.into_bytes()),
            Self::Json => {
                let mut bytes =
                    serde_json::to_vec_pretty(&file).map_err(SchemaError::JsonSerialize)?;
                bytes.push(b'\n');
                Ok(bytes)
            }
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toml => write!(f, "toml"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// On-disk document, read side.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DocumentFile<A> {
    version: Option<u32>,

    #[serde(default)]
    defaults: A,

    #[serde(default, rename = "definition")]
    definitions: Vec<Definition<A>>,
}

/// On-disk document, write side.
#[derive(Serialize)]
struct DocumentFileRef<'a, A> {
    version: u32,
    defaults: &'a A,
    #[serde(rename = "definition", skip_serializing_if = "no_definitions")]
    definitions: &'a [Definition<A>],
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn no_definitions<A>(definitions: &&[Definition<A>]) -> bool {
    definitions.is_empty()
}
