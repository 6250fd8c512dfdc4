//! Recursive directory watcher with explicit suspend/resume.
//!
//! One non-recursive OS watch per directory beneath the root. Watches are
//! added when directories appear (including directories moved in already
//! populated) and dropped when they disappear. All raw events are mapped to
//! [`WatchEventKind`] and handed to a single [`WatchHandler`] on a
//! dedicated event thread.
//!
//! The watcher has two modes. In `Active` mode watches are armed and events
//! are delivered. In `Suspended` mode every watch is released and stray
//! events are dropped. Callers that write inside the tree take a
//! [`SuspendGuard`] so their own writes are never observed.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, unbounded};
use notify::Event;
use parking_lot::Mutex;
use walkdir::WalkDir;

use super::backend::{NotifyBackend, WatchBackend};
use super::error::WatchError;
use super::handler::{WatchEventKind, WatchHandler};
use super::watch_set::WatchSet;

/// Delivery mode of the watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    Active,
    Suspended,
}

struct WatchState {
    backend: Box<dyn WatchBackend>,
    watches: WatchSet,
    /// Set by an explicit `stop()`; guards never clear it.
    stopped: bool,
    /// Number of live suspend guards.
    suspend_depth: usize,
}

impl WatchState {
    fn mode(&self) -> WatchMode {
        if self.stopped || self.suspend_depth > 0 {
            WatchMode::Suspended
        } else {
            WatchMode::Active
        }
    }

    /// Watch `start` and every directory beneath it that is not watched
    /// yet. A directory whose watch fails is skipped with its subtree.
    fn watch_tree(&mut self, start: &Path) -> usize {
        let mut added = 0;
        let mut walker = WalkDir::new(start).follow_links(false).into_iter();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    // walkdir does not descend into what it cannot read
                    if let Some(path) = e.path() {
                        self.watches.mark_degraded(path.to_path_buf());
                    }
                    tracing::warn!("[watcher] cannot walk directory, subtree left unwatched: {e}");
                    continue;
                }
            };

            if !entry.file_type().is_dir() || self.watches.contains(entry.path()) {
                continue;
            }

            match self.backend.watch(entry.path()) {
                Ok(()) => {
                    crate::debug_event!("watcher", "watching", "{}", entry.path().display());
                    self.watches.insert(entry.path().to_path_buf());
                    added += 1;
                }
                Err(e) => {
                    tracing::warn!("[watcher] {e}, subtree left unwatched");
                    self.watches.mark_degraded(entry.path().to_path_buf());
                    walker.skip_current_dir();
                }
            }
        }

        added
    }

    /// Drop the watches of `dir` and everything beneath it.
    fn unwatch_tree(&mut self, dir: &Path) {
        for removed in self.watches.remove_subtree(dir) {
            // The OS usually dropped the watch already when the directory went away
            if let Err(e) = self.backend.unwatch(&removed) {
                crate::debug_event!("watcher", "unwatch skipped", "{e}");
            }
        }
    }

    fn release_all(&mut self) {
        for dir in self.watches.drain() {
            if let Err(e) = self.backend.unwatch(&dir) {
                crate::debug_event!("watcher", "unwatch skipped", "{e}");
            }
        }
    }
}

struct WatchShared {
    root: PathBuf,
    state: Mutex<WatchState>,
    shutdown: AtomicBool,
}

impl WatchShared {
    fn arm(&self, state: &mut WatchState) -> Result<(), WatchError> {
        if !self.root.is_dir() {
            return Err(WatchError::PathNotFound {
                path: self.root.clone(),
            });
        }
        let added = state.watch_tree(&self.root);
        crate::debug_event!("watcher", "armed", "{added} directories");
        Ok(())
    }

    fn stop(&self) {
        let mut state = self.state.lock();
        if state.stopped {
            return;
        }
        state.stopped = true;
        if state.suspend_depth == 0 {
            state.release_all();
        }
        crate::log_event!("watcher", "stopped", "{}", self.root.display());
    }

    fn resume(&self) -> Result<(), WatchError> {
        let mut state = self.state.lock();
        if !state.stopped {
            return Ok(());
        }
        if state.suspend_depth == 0 {
            self.arm(&mut state)?;
        }
        state.stopped = false;
        crate::log_event!("watcher", "resumed", "{}", self.root.display());
        Ok(())
    }

    fn suspend(self: &Arc<Self>) -> SuspendGuard {
        let mut state = self.state.lock();
        state.suspend_depth += 1;
        if state.suspend_depth == 1 && !state.stopped {
            state.release_all();
            crate::debug_event!("watcher", "suspended");
        }
        SuspendGuard {
            shared: Arc::clone(self),
        }
    }

    fn release_guard(&self) {
        let mut state = self.state.lock();
        state.suspend_depth = state.suspend_depth.saturating_sub(1);
        if state.suspend_depth == 0 && !state.stopped {
            match self.arm(&mut state) {
                Ok(()) => crate::debug_event!("watcher", "reactivated"),
                Err(e) => tracing::warn!("[watcher] cannot re-arm after suspend: {e}"),
            }
        }
    }

    /// Update the watch set for one raw event and forward it.
    fn dispatch(&self, event: Event, handler: &dyn WatchHandler) {
        let kind = WatchEventKind::from(&event.kind);

        {
            let mut state = self.state.lock();
            if state.mode() == WatchMode::Suspended {
                crate::debug_event!("watcher", "dropped", "{kind} {:?}", event.paths);
                return;
            }

            if event.need_rescan() {
                tracing::warn!("[watcher] event queue overflowed, rescanning {}", self.root.display());
                state.release_all();
                if let Err(e) = self.arm(&mut state) {
                    tracing::warn!("[watcher] rescan failed: {e}");
                }
            }

            for path in &event.paths {
                match kind {
                    // Gone whether or not something new sits at the path already
                    WatchEventKind::Deleted => state.unwatch_tree(path),
                    WatchEventKind::Created | WatchEventKind::Moved if path.is_dir() => {
                        // A directory already in the set is a new inode now
                        state.unwatch_tree(path);
                        let added = state.watch_tree(path);
                        if added > 0 {
                            crate::debug_event!(
                                "watcher",
                                "new directory",
                                "{} (+{added} watches)",
                                path.display()
                            );
                        }
                    }
                    WatchEventKind::Moved => state.unwatch_tree(path),
                    _ => {}
                }
            }
        }

        for path in &event.paths {
            handler.on_event(kind, path);
        }
    }
}

/// Event thread: forwards raw events and drives the handler's tick.
fn run_dispatcher(
    shared: Arc<WatchShared>,
    events: Receiver<notify::Result<Event>>,
    handler: Arc<dyn WatchHandler>,
    tick: Duration,
) {
    let mut last_tick = Instant::now();

    while !shared.shutdown.load(Ordering::Acquire) {
        match events.recv_timeout(tick) {
            Ok(Ok(event)) => shared.dispatch(event, handler.as_ref()),
            Ok(Err(e)) => {
                let error = WatchError::EventError {
                    details: e.to_string(),
                };
                tracing::error!("[watcher] {error}");
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if last_tick.elapsed() >= tick {
            handler.on_tick();
            last_tick = Instant::now();
        }
    }

    crate::debug_event!("watcher", "event thread exited", "{}", handler.name());
}

/// Scoped suspension of a watcher.
///
/// While any guard is alive the watcher is `Suspended`. Dropping the last
/// guard re-arms every watch, on every exit path including unwinding.
#[must_use = "the watcher resumes as soon as the guard is dropped"]
pub struct SuspendGuard {
    shared: Arc<WatchShared>,
}

impl Drop for SuspendGuard {
    fn drop(&mut self) {
        self.shared.release_guard();
    }
}

/// Cloneable control handle for a running watcher.
///
/// Does not keep the event thread alive; it only reaches the watch state.
#[derive(Clone)]
pub struct WatchControl {
    shared: Arc<WatchShared>,
}

impl WatchControl {
    /// Root directory being watched (absolute, canonical).
    pub fn root(&self) -> &Path {
        &self.shared.root
    }

    /// Suspend delivery and release all watches. Idempotent.
    pub fn stop(&self) {
        self.shared.stop();
    }

    /// Re-walk the root and re-arm after `stop()`. No-op while running.
    pub fn resume(&self) -> Result<(), WatchError> {
        self.shared.resume()
    }

    /// Suspend until the returned guard is dropped.
    pub fn suspend(&self) -> SuspendGuard {
        self.shared.suspend()
    }

    pub fn mode(&self) -> WatchMode {
        self.shared.state.lock().mode()
    }

    /// Sorted snapshot of watched directories.
    pub fn watched_dirs(&self) -> Vec<PathBuf> {
        self.shared.state.lock().watches.dirs()
    }

    /// Directories whose watch could not be established.
    pub fn degraded_dirs(&self) -> Vec<PathBuf> {
        self.shared.state.lock().watches.degraded()
    }

    pub fn is_watched(&self, dir: &Path) -> bool {
        self.shared.state.lock().watches.contains(dir)
    }
}

/// Recursive watcher owning its event thread.
///
/// Dropping it releases every watch and joins the event thread.
pub struct RecursiveWatcher {
    control: WatchControl,
    dispatcher: Option<JoinHandle<()>>,
}

impl RecursiveWatcher {
    /// Create a builder for configuring the watcher.
    pub fn builder() -> RecursiveWatcherBuilder {
        RecursiveWatcherBuilder::new()
    }

    /// Start watching `root` with default settings.
    pub fn start(
        root: impl AsRef<Path>,
        handler: impl WatchHandler + 'static,
    ) -> Result<Self, WatchError> {
        Self::builder().handler(handler).start(root)
    }

    /// A control handle that can be shared with other components.
    pub fn control(&self) -> WatchControl {
        self.control.clone()
    }

    pub fn root(&self) -> &Path {
        self.control.root()
    }

    pub fn stop(&self) {
        self.control.stop();
    }

    pub fn resume(&self) -> Result<(), WatchError> {
        self.control.resume()
    }

    pub fn suspend(&self) -> SuspendGuard {
        self.control.suspend()
    }

    pub fn mode(&self) -> WatchMode {
        self.control.mode()
    }

    pub fn watched_dirs(&self) -> Vec<PathBuf> {
        self.control.watched_dirs()
    }

    pub fn degraded_dirs(&self) -> Vec<PathBuf> {
        self.control.degraded_dirs()
    }

    pub fn is_watched(&self, dir: &Path) -> bool {
        self.control.is_watched(dir)
    }
}

impl Drop for RecursiveWatcher {
    fn drop(&mut self) {
        let shared = &self.control.shared;
        shared.shutdown.store(true, Ordering::Release);
        {
            // Outstanding guards must not re-arm a dropped watcher
            let mut state = shared.state.lock();
            state.stopped = true;
            state.release_all();
        }

        if let Some(handle) = self.dispatcher.take() {
            if handle.thread().id() != thread::current().id() {
                if handle.join().is_err() {
                    tracing::warn!("[watcher] event thread panicked");
                }
            }
        }
    }
}

/// Builder for constructing a RecursiveWatcher.
pub struct RecursiveWatcherBuilder {
    handler: Option<Arc<dyn WatchHandler>>,
    backend: Option<(Box<dyn WatchBackend>, Receiver<notify::Result<Event>>)>,
    tick_ms: u64,
}

impl RecursiveWatcherBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            handler: None,
            backend: None,
            tick_ms: 50,
        }
    }

    /// Set the event handler.
    pub fn handler(self, handler: impl WatchHandler + 'static) -> Self {
        self.shared_handler(Arc::new(handler))
    }

    /// Set an event handler that is shared with other owners.
    pub fn shared_handler(mut self, handler: Arc<dyn WatchHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Set the tick interval in milliseconds.
    pub fn tick_ms(mut self, ms: u64) -> Self {
        self.tick_ms = ms.max(1);
        self
    }

    /// Use a custom backend whose raw events arrive on `events`.
    pub fn backend(
        mut self,
        backend: Box<dyn WatchBackend>,
        events: Receiver<notify::Result<Event>>,
    ) -> Self {
        self.backend = Some((backend, events));
        self
    }

    /// Arm watches under `root` and spawn the event thread.
    pub fn start(self, root: impl AsRef<Path>) -> Result<RecursiveWatcher, WatchError> {
        let requested = root.as_ref();
        if !requested.is_dir() {
            return Err(WatchError::PathNotFound {
                path: requested.to_path_buf(),
            });
        }
        let root = requested
            .canonicalize()
            .map_err(|_| WatchError::PathNotFound {
                path: requested.to_path_buf(),
            })?;

        let handler = self.handler.ok_or_else(|| WatchError::InitFailed {
            reason: "Handler is required".to_string(),
        })?;

        let (backend, events) = match self.backend {
            Some(pair) => pair,
            None => {
                let (tx, rx) = unbounded();
                let backend: Box<dyn WatchBackend> = Box::new(NotifyBackend::new(tx)?);
                (backend, rx)
            }
        };

        let shared = Arc::new(WatchShared {
            root,
            state: Mutex::new(WatchState {
                backend,
                watches: WatchSet::new(),
                stopped: false,
                suspend_depth: 0,
            }),
            shutdown: AtomicBool::new(false),
        });

        {
            let mut state = shared.state.lock();
            shared.arm(&mut state)?;
            crate::log_event!(
                "watcher",
                "started",
                "{} ({} directories)",
                shared.root.display(),
                state.watches.len()
            );
        }

        let tick = Duration::from_millis(self.tick_ms);
        let thread_shared = Arc::clone(&shared);
        let dispatcher = thread::Builder::new()
            .name("docsync-watch".to_string())
            .spawn(move || run_dispatcher(thread_shared, events, handler, tick))
            .map_err(|e| WatchError::InitFailed {
                reason: e.to_string(),
            })?;

        Ok(RecursiveWatcher {
            control: WatchControl { shared },
            dispatcher: Some(dispatcher),
        })
    }
}

impl Default for RecursiveWatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
