//! Async delivery of events to a shared store.
//!
//! Store operations take a blocking lock and may do file I/O, so each event
//! is handled on Tokio's blocking pool while the listener awaits it. Events
//! are handled strictly one at a time, in arrival order.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};

use crate::attributes::AttributeSet;
use crate::persist::DocumentStore;
use crate::store::ConfigStore;

use super::{ConfigEvent, Dispatched, DocumentWatcher, EventError, dispatch};

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;

/// Listener behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListenerOptions {
    /// Save the document after every successful merge.
    pub save_after_merge: bool,
}

/// Counts of events handled by [`EventListener::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListenerSummary {
    /// Events applied to the live document.
    pub handled: usize,
    /// Events that left the live document unchanged because they failed.
    pub failed: usize,
    /// Applied merges whose follow-up save failed. Also counted in `handled`.
    pub unsaved: usize,
}

/// Feeds events from a stream into a [`ConfigStore`].
#[derive(Debug)]
pub struct EventListener<A, S> {
    store: Arc<ConfigStore<A, S>>,
    options: ListenerOptions,
}

impl<A, S> EventListener<A, S>
where
    A: AttributeSet,
    S: DocumentStore + 'static,
{
    /// Creates a listener for `store`.
    #[must_use]
    pub const fn new(store: Arc<ConfigStore<A, S>>) -> Self {
        Self {
            store,
            options: ListenerOptions {
                save_after_merge: false,
            },
        }
    }

    /// Sets listener options (builder pattern).
    #[must_use]
    pub const fn with_options(mut self, options: ListenerOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the store events are delivered to.
    #[must_use]
    pub const fn store(&self) -> &Arc<ConfigStore<A, S>> {
        &self.store
    }

    /// Handles events until the stream ends.
    ///
    /// A failing event is logged and counted; it does not stop the loop.
    pub async fn run<E>(&self, mut events: E) -> ListenerSummary
    where
        E: Stream<Item = ConfigEvent<A>> + Unpin,
    {
        let mut summary = ListenerSummary::default();

        while let Some(event) = events.next().await {
            match self.handle(event).await {
                Ok(dispatched) => {
                    tracing::debug!(?dispatched, "Event handled");
                    summary.handled += 1;
                }
                Err(EventError::Unsaved { outcome, source }) => {
                    tracing::info!(?outcome, "Override applied");
                    tracing::error!("Failed to save merged override: {source}");
                    summary.handled += 1;
                    summary.unsaved += 1;
                }
                Err(e) => {
                    tracing::error!("Event failed: {e}");
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            handled = summary.handled,
            failed = summary.failed,
            unsaved = summary.unsaved,
            "Event stream closed"
        );
        summary
    }

    /// Handles a single event on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns an [`EventError`] if the store operation fails or the handler
    /// task panics. A merge that was applied but could not be saved returns
    /// [`EventError::Unsaved`].
    pub async fn handle(&self, event: ConfigEvent<A>) -> Result<Dispatched, EventError> {
        let store = Arc::clone(&self.store);
        let save_after_merge = self.options.save_after_merge;

        tokio::task::spawn_blocking(move || {
            let dispatched = dispatch(&store, event)?;
            if let (true, Dispatched::Merged(outcome)) = (save_after_merge, dispatched) {
                store
                    .save()
                    .map_err(|source| EventError::Unsaved { outcome, source })?;
            }
            Ok(dispatched)
        })
        .await
        .map_err(EventError::Task)?
    }
}

/// Creates a bounded event channel whose receiving end is a stream.
#[must_use]
pub fn channel<A>(capacity: usize) -> (mpsc::Sender<ConfigEvent<A>>, ReceiverStream<ConfigEvent<A>>) {
    let (tx, rx) = mpsc::channel(capacity);
    (tx, ReceiverStream::new(rx))
}

/// Turns file change notifications into reload events.
pub fn reload_events<A>(watcher: DocumentWatcher) -> impl Stream<Item = ConfigEvent<A>> + Unpin {
    watcher.map(|()| ConfigEvent::Reload)
}
