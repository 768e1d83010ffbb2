//! Change detection for the persisted document file.

use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use std::time::{Duration, SystemTime};

use tokio::time::{Interval, MissedTickBehavior, interval};
use tokio_stream::Stream;

/// A stream that yields `()` each time the watched file changes.
///
/// The file is checked once per poll interval; a change is any difference in
/// modification time or length from the previous check. A file that
/// disappears yields nothing, and yields again once it is recreated.
#[derive(Debug)]
pub struct DocumentWatcher {
    path: PathBuf,
    interval: Interval,
    last: Option<Stamp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    modified: SystemTime,
    len: u64,
}

impl DocumentWatcher {
    /// Creates a watcher for `path`, taking the current file state as the
    /// baseline.
    ///
    /// Must be called within a Tokio runtime.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        let path = path.into();
        let last = stamp(&path);
        let mut interval = interval(poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            path,
            interval,
            last,
        }
    }

    /// Returns the watched path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check(&mut self) -> bool {
        let current = stamp(&self.path);
        if current == self.last {
            return false;
        }

        tracing::debug!(
            path = %self.path.display(),
            exists = current.is_some(),
            "Peer document changed on disk"
        );
        self.last = current;
        current.is_some()
    }
}

impl Stream for DocumentWatcher {
    type Item = ();

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            ready!(self.interval.poll_tick(cx));
            if self.check() {
                return Poll::Ready(Some(()));
            }
        }
    }
}

fn stamp(path: &Path) -> Option<Stamp> {
    let metadata = std::fs::metadata(path).ok()?;
    Some(Stamp {
        modified: metadata.modified().ok()?,
        len: metadata.len(),
    })
}
