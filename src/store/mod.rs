//! The live, shared peer document.
//!
//! [`ConfigStore`] owns one [`PeerDocument`] behind a reader/writer lock:
//! - `resolve` and the inspection methods take the lock shared, so any
//!   number of polling threads resolve in parallel
//! - `merge`, `save`, and `reload` take it exclusively for their whole
//!   duration, including persistence I/O
//!
//! Readers never observe a document mid-merge. Failed writes and failed
//! reloads leave the last good document in place.

mod error;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use error::{LoadError, PersistError, StoreError};

use std::net::Ipv4Addr;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::attributes::AttributeSet;
use crate::peer::{Definition, MergeOutcome, MergeTarget, PeerDocument};
use crate::persist::{DocumentFormat, DocumentStore};

/// Store behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreOptions {
    /// Normalize every freshly loaded document before serving it.
    pub optimize_on_load: bool,
}

/// Thread-safe owner of the live document for one protocol.
///
/// Constructed unloaded; every operation except [`load`](Self::load) and
/// [`reload`](Self::reload) fails with [`StoreError::NotInitialized`] until
/// a load succeeds.
#[derive(Debug)]
pub struct ConfigStore<A, S> {
    persistence: S,
    format: DocumentFormat,
    options: StoreOptions,
    state: RwLock<Option<PeerDocument<A>>>,
}

type Guarded<A> = Option<PeerDocument<A>>;

impl<A: AttributeSet, S: DocumentStore> ConfigStore<A, S> {
    /// Creates an unloaded store over `persistence`.
    #[must_use]
    pub fn new(persistence: S, format: DocumentFormat) -> Self {
        Self {
            persistence,
            format,
            options: StoreOptions::default(),
            state: RwLock::new(None),
        }
    }

    /// Sets store options (builder pattern).
    #[must_use]
    pub const fn with_options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the persistence collaborator.
    #[must_use]
    pub const fn persistence(&self) -> &S {
        &self.persistence
    }

    /// Returns the document encoding.
    #[must_use]
    pub const fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Reads and parses the persisted document, replacing the live one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Load`] if the document cannot be read or parsed.
    /// A previously loaded document stays live in that case.
    pub fn load(&self) -> Result<(), StoreError> {
        let document = self.read_persisted()?;
        let mut state = self.write_state();
        self.install(&mut state, document, "Loaded peer document");
        Ok(())
    }

    /// Returns true once a load has succeeded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.read_state().is_some()
    }

    /// Resolves the attributes for `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotInitialized`] before the first load. Once
    /// loaded, resolution always succeeds.
    pub fn resolve(&self, addr: Ipv4Addr) -> Result<A::Resolved, StoreError> {
        let state = self.read_state();
        let document = state.as_ref().ok_or(StoreError::NotInitialized)?;
        Ok(document.resolve(addr))
    }

    /// Splices an override into the live document.
    ///
    /// The change is memory-only until [`save`](Self::save) is called.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotInitialized`] before the first load.
    pub fn merge(
        &self,
        target: impl Into<MergeTarget>,
        attributes: A,
    ) -> Result<MergeOutcome, StoreError> {
        let target = target.into();
        let mut state = self.write_state();
        let document = state.as_mut().ok_or(StoreError::NotInitialized)?;

        let outcome = crate::peer::merge(document, target, attributes);
        tracing::info!(
            protocol = A::PROTOCOL,
            %target,
            ?outcome,
            definitions = document.definitions.len(),
            "Applied peer override"
        );
        Ok(outcome)
    }

    /// Normalizes the live document, writes it, and reloads what was written.
    ///
    /// The lock is held for the whole round trip. If any step fails, the
    /// live document is the one from before the call.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotInitialized`] before the first load
    /// - [`StoreError::Persist`] if encoding or writing fails
    /// - [`StoreError::Load`] if the written document does not read back
    pub fn save(&self) -> Result<(), StoreError> {
        let mut state = self.write_state();
        let mut document = state.clone().ok_or(StoreError::NotInitialized)?;

        let dropped = document.normalize();
        let bytes = self
            .format
            .serialize(&document)
            .map_err(PersistError::Serialize)?;
        self.persistence
            .write_document(&bytes)
            .map_err(|source| PersistError::Write {
                location: self.persistence.location(),
                source,
            })?;
        tracing::debug!(
            location = %self.persistence.location(),
            bytes = bytes.len(),
            dropped,
            "Wrote peer document"
        );

        let written = self.read_persisted()?;
        self.install(&mut state, written, "Saved peer document");
        Ok(())
    }

    /// Replaces the live document with the persisted one.
    ///
    /// Picks up out-of-band edits. Also usable as the first load.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Load`] if the document cannot be read or parsed;
    /// the live document is kept.
    pub fn reload(&self) -> Result<(), StoreError> {
        let mut state = self.write_state();
        match self.read_persisted() {
            Ok(document) => {
                self.install(&mut state, document, "Reloaded peer document");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    location = %self.persistence.location(),
                    kept = state.is_some(),
                    "Reload failed, keeping current document: {e}"
                );
                Err(e.into())
            }
        }
    }

    /// Returns a snapshot of the definitions in priority order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotInitialized`] before the first load.
    pub fn definitions(&self) -> Result<Vec<Definition<A>>, StoreError> {
        let state = self.read_state();
        let document = state.as_ref().ok_or(StoreError::NotInitialized)?;
        Ok(document.definitions.clone())
    }

    /// Returns a snapshot of the whole live document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotInitialized`] before the first load.
    pub fn document(&self) -> Result<PeerDocument<A>, StoreError> {
        self.read_state().clone().ok_or(StoreError::NotInitialized)
    }

    /// Returns the number of definitions.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotInitialized`] before the first load.
    pub fn definition_count(&self) -> Result<usize, StoreError> {
        let state = self.read_state();
        let document = state.as_ref().ok_or(StoreError::NotInitialized)?;
        Ok(document.definitions.len())
    }

    fn read_persisted(&self) -> Result<PeerDocument<A>, LoadError> {
        let bytes = self
            .persistence
            .read_document()
            .map_err(|source| LoadError::Read {
                location: self.persistence.location(),
                source,
            })?;
        let mut document: PeerDocument<A> =
            self.format
                .parse(&bytes)
                .map_err(|source| LoadError::Schema {
                    location: self.persistence.location(),
                    source,
                })?;

        if self.options.optimize_on_load {
            let dropped = document.normalize();
            tracing::debug!(dropped, "Normalized document on load");
        }
        Ok(document)
    }

    fn install(&self, state: &mut Guarded<A>, document: PeerDocument<A>, message: &str) {
        tracing::info!(
            protocol = A::PROTOCOL,
            location = %self.persistence.location(),
            definitions = document.definitions.len(),
            elements = document.element_count(),
            "{message}"
        );
        *state = Some(document);
    }

    fn read_state(&self) -> RwLockReadGuard<'_, Guarded<A>> {
        self.state.read().unwrap_or_else(|poisoned| {
            tracing::warn!("Recovering poisoned peer document lock");
            self.state.clear_poison();
            PoisonError::into_inner(poisoned)
        })
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, Guarded<A>> {
        self.state.write().unwrap_or_else(|poisoned| {
            tracing::warn!("Recovering poisoned peer document lock");
            self.state.clear_poison();
            PoisonError::into_inner(poisoned)
        })
    }
}
