//! Command execution logic.
//!
//! One-shot commands (`resolve`, `list`, `configure`, `optimize`) load the
//! document, act on it, and print one JSON object per line. `serve` keeps the
//! document live and applies events read from stdin, plus reloads when the
//! document file changes.

use std::io::{self, Write};
use std::pin::Pin;
use std::sync::Arc;

use serde_json::json;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;
use tokio_stream::{Stream, StreamExt};

use peerconf::attributes::{AmiAttributes, Protocol, SnmpAttributes};
use peerconf::config::{Command, ConfigError, ValidatedConfig, defaults, parse_assignments};
use peerconf::event::listener::{channel, reload_events};
use peerconf::event::{
    ConfigEvent, Dispatched, DocumentWatcher, EventError, EventListener, FromEventParams,
    ListenerOptions, ReconfigureEvent, dispatch, param,
};
use peerconf::peer::{MatchKind, MergeOutcome, find_match};
use peerconf::persist::{DocumentStore, FileDocumentStore};
use peerconf::store::{ConfigStore, StoreError};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for command execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An event could not be built or applied.
    #[error(transparent)]
    Event(#[from] EventError),

    /// Command arguments were invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Writing command output failed.
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),

    /// The async runtime could not be started.
    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] io::Error),
}

type EventStream<A> = Pin<Box<dyn Stream<Item = ConfigEvent<A>> + Send>>;

/// Executes `command` against the configured document.
///
/// # Errors
///
/// Returns an error if the document cannot be loaded or the command fails.
pub fn execute(config: &ValidatedConfig, command: &Command) -> Result<(), RunError> {
    match config.protocol {
        Protocol::Snmp => execute_for::<SnmpAttributes>(config, command),
        Protocol::Ami => execute_for::<AmiAttributes>(config, command),
    }
}

fn execute_for<A: FromEventParams>(
    config: &ValidatedConfig,
    command: &Command,
) -> Result<(), RunError> {
    let persistence = FileDocumentStore::new(config.document.clone());
    let store =
        ConfigStore::<A, _>::new(persistence, config.format).with_options(config.store_options());

    if *command == Command::Serve {
        return serve_blocking(store, config);
    }

    store.load()?;
    let stdout = io::stdout();
    run_command(&store, command, &mut stdout.lock())
}

/// Runs a one-shot command against a loaded store, writing JSON lines to `out`.
///
/// `init` and `serve` are handled by the caller and do nothing here.
///
/// # Errors
///
/// Returns an error if the store rejects the operation or output fails.
pub fn run_command<A, S, W>(
    store: &ConfigStore<A, S>,
    command: &Command,
    out: &mut W,
) -> Result<(), RunError>
where
    A: FromEventParams,
    S: DocumentStore,
    W: Write,
{
    match command {
        Command::Resolve { addresses } => {
            let document = store.document()?;
            for &addr in addresses {
                let found = find_match(addr, &document.definitions);
                let line = json!({
                    "address": addr.to_string(),
                    "definition": found.as_ref().map(|m| m.index),
                    "match": found.map(|m| match_kind_name(m.kind)),
                    "attributes": document.resolve(addr),
                });
                writeln!(out, "{line}")?;
            }
        }
        Command::List => {
            let document = store.document()?;
            writeln!(out, "{}", json!({ "defaults": document.defaults }))?;
            for (index, definition) in document.definitions.iter().enumerate() {
                let line = json!({
                    "index": index,
                    "specifics": definition.specifics.len(),
                    "ranges": definition.ranges.len(),
                    "patterns": definition.patterns.len(),
                    "attributes": definition.attributes,
                });
                writeln!(out, "{line}")?;
            }
        }
        Command::Configure {
            first,
            last,
            assignments,
        } => {
            let mut params = parse_assignments(assignments)?;
            params.insert(param::FIRST_IP_ADDRESS, first.to_string());
            if let Some(last) = last {
                params.insert(param::LAST_IP_ADDRESS, last.to_string());
            }

            let event = ReconfigureEvent::<A>::from_params(&params)?;
            let target = event.target;
            let dispatched = dispatch(store, ConfigEvent::Reconfigure(event))?;
            store.save()?;

            if let Dispatched::Merged(outcome) = dispatched {
                let mut line = outcome_json(outcome);
                line["target"] = json!(target.to_string());
                writeln!(out, "{line}")?;
            }
        }
        Command::Optimize => {
            let before = store.document()?;
            store.save()?;
            let after = store.document()?;

            let line = json!({
                "definitions": { "before": before.definitions.len(), "after": after.definitions.len() },
                "elements": { "before": before.element_count(), "after": after.element_count() },
            });
            writeln!(out, "{line}")?;
        }
        Command::Init { .. } | Command::Serve => {}
    }
    Ok(())
}

const fn match_kind_name(kind: MatchKind) -> &'static str {
    match kind {
        MatchKind::Specific => "specific",
        MatchKind::Range => "range",
        MatchKind::Pattern => "pattern",
    }
}

fn outcome_json(outcome: MergeOutcome) -> serde_json::Value {
    match outcome {
        MergeOutcome::Joined { index } => json!({ "outcome": "joined", "index": index }),
        MergeOutcome::Inserted { conflict } => {
            json!({ "outcome": "inserted", "index": 0, "conflict": conflict })
        }
    }
}

/// Runs `serve` on a fresh multi-threaded runtime.
///
/// Excluded from coverage - requires stdin and signal handling.
#[cfg(not(tarpaulin_include))]
fn serve_blocking<A: FromEventParams>(
    store: ConfigStore<A, FileDocumentStore>,
    config: &ValidatedConfig,
) -> Result<(), RunError> {
    let runtime = tokio::runtime::Runtime::new().map_err(RunError::Runtime)?;
    let result = runtime.block_on(serve(Arc::new(store), config));
    // The stdin reader sits on a blocking thread that may never return.
    runtime.shutdown_background();
    result
}

/// Loads the document and applies events until the event sources end or a
/// shutdown signal arrives.
///
/// Without watching, the sources end when stdin closes. With watching, the
/// document watcher never ends, so only a signal stops the loop.
///
/// Excluded from coverage - requires stdin and signal handling.
#[cfg(not(tarpaulin_include))]
async fn serve<A, S>(
    store: Arc<ConfigStore<A, S>>,
    config: &ValidatedConfig,
) -> Result<(), RunError>
where
    A: FromEventParams,
    S: DocumentStore + 'static,
{
    store.load()?;

    let listener = EventListener::new(Arc::clone(&store)).with_options(ListenerOptions {
        save_after_merge: config.save_on_reconfigure,
    });

    let (tx, rx) = channel::<A>(defaults::EVENT_CHANNEL_CAPACITY);
    let reader = tokio::spawn(async move {
        if let Err(e) = forward_events(BufReader::new(tokio::io::stdin()), tx).await {
            tracing::error!("Failed to read events from stdin: {e}");
        }
    });

    let events: EventStream<A> = if config.watch {
        tracing::info!(
            "Watching {} every {}s",
            config.document.display(),
            config.poll_interval.as_secs()
        );
        let watcher = DocumentWatcher::new(config.document.clone(), config.poll_interval);
        Box::pin(rx.merge(reload_events(watcher)))
    } else {
        Box::pin(rx)
    };

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    tokio::select! {
        biased;

        () = &mut shutdown => {
            tracing::info!("Shutdown signal received, stopping...");
        }

        summary = listener.run(events) => {
            tracing::debug!(?summary, "Event sources ended");
        }
    }

    reader.abort();
    Ok(())
}

/// Decodes one event per line and sends it on `tx`.
///
/// Blank lines are skipped and malformed lines are logged and dropped.
/// Returns when the reader is exhausted or the receiver is gone.
async fn forward_events<A, R>(reader: R, tx: mpsc::Sender<ConfigEvent<A>>) -> io::Result<()>
where
    A: FromEventParams,
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match ConfigEvent::<A>::decode(line) {
            Ok(event) => {
                if tx.send(event).await.is_err() {
                    tracing::debug!("Event receiver closed");
                    break;
                }
            }
            Err(e) => tracing::warn!("Ignoring event: {e}"),
        }
    }

    Ok(())
}

/// Returns a future that completes when a shutdown signal is received.
///
/// A handler that cannot be installed is logged and never fires.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
