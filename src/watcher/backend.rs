//! OS watch primitive behind a small trait.
//!
//! The recursive watcher only needs to add and remove a non-recursive
//! watch on a single directory. Raw events flow separately through a
//! channel of `notify::Result<Event>`, so alternative backends only have
//! to feed that channel.

use std::path::Path;

use crossbeam_channel::Sender;
use notify::{Event, RecursiveMode, Watcher};

use super::error::WatchError;

/// Adds and removes single-directory watches.
pub trait WatchBackend: Send {
    /// Watch `dir` non-recursively.
    fn watch(&mut self, dir: &Path) -> Result<(), WatchError>;

    /// Stop watching `dir`.
    fn unwatch(&mut self, dir: &Path) -> Result<(), WatchError>;
}

/// Backend on top of `notify::RecommendedWatcher`.
pub struct NotifyBackend {
    watcher: notify::RecommendedWatcher,
}

impl NotifyBackend {
    /// Create a backend that forwards raw events into `events`.
    pub fn new(events: Sender<notify::Result<Event>>) -> Result<Self, WatchError> {
        // Unbounded send never blocks notify's own thread
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = events.send(res);
        })?;

        Ok(Self { watcher })
    }
}

impl WatchBackend for NotifyBackend {
    fn watch(&mut self, dir: &Path) -> Result<(), WatchError> {
        self.watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::PathWatchFailed {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn unwatch(&mut self, dir: &Path) -> Result<(), WatchError> {
        self.watcher
            .unwatch(dir)
            .map_err(|e| WatchError::UnwatchFailed {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })
    }
}
