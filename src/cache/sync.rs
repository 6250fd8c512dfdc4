//! The synchronized cache: mapping, transfers and watcher wiring.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crossbeam_channel::Receiver;
use notify::Event;
use parking_lot::Mutex;

use crate::config::Settings;
use crate::docio::{DocumentIo, DocumentRef};
use crate::watcher::{
    Debouncer, RecursiveWatcher, SuspendGuard, WatchBackend, WatchControl, WatchEventKind,
    WatchHandler,
};

use super::error::{SyncError, TransferOutcome};
use super::mapping::PathMapping;
use super::transfer;

/// Everything the cache lock protects.
struct CacheState {
    mapping: PathMapping,
    io: Option<Arc<dyn DocumentIo>>,
}

/// Shared between the public handle and the watcher's event thread.
///
/// Lock order is `state` then `pending`. The watcher's own lock is never
/// held while either is taken.
struct CacheCore {
    /// Canonical cache root.
    root: PathBuf,
    /// Root as the caller named it, for rebasing absolute paths.
    requested_root: PathBuf,
    state: Mutex<CacheState>,
    pending: Mutex<Debouncer>,
    control: OnceLock<WatchControl>,
    buffer_size: usize,
}

impl CacheCore {
    /// Relative paths live under the root; absolute paths spelled through
    /// the requested root are rebased onto the canonical one.
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_relative() {
            return self.root.join(path);
        }
        match path.strip_prefix(&self.requested_root) {
            Ok(rest) if self.requested_root != self.root => self.root.join(rest),
            _ => path.to_path_buf(),
        }
    }

    fn suspend(&self) -> Option<SuspendGuard> {
        self.control.get().map(WatchControl::suspend)
    }

    fn register(&self, path: &Path, doc: DocumentRef) -> bool {
        let path = self.resolve(path);
        let mut state = self.state.lock();
        let added = state.mapping.register(path.clone(), doc);
        if added {
            crate::debug_event!("cache", "registered", "{}", path.display());
        }
        added
    }

    fn fetch_and_watch(&self, doc: DocumentRef, path: &Path) -> TransferOutcome {
        let path = self.resolve(path);
        let mut state = self.state.lock();

        if !state.mapping.register(path.clone(), doc.clone()) {
            if let Some(existing) = state.mapping.get(&path) {
                if existing != &doc {
                    tracing::warn!(
                        "[cache] {} stays mapped to {existing}, fetching {doc} anyway",
                        path.display()
                    );
                }
            }
        }

        let Some(io) = state.io.clone() else {
            log_outcome("fetch", &path, &doc, &TransferOutcome::NoDocumentIo);
            return TransferOutcome::NoDocumentIo;
        };

        // The local copy is about to be replaced; a queued write-back is stale
        self.pending.lock().remove(&path);

        let _guard = self.suspend();
        let outcome = transfer::fetch(io.as_ref(), &doc, &path, self.buffer_size);
        log_outcome("fetch", &path, &doc, &outcome);
        outcome
    }

    fn on_modify(&self, path: &Path) -> TransferOutcome {
        let path = self.resolve(path);
        let state = self.state.lock();

        let Some(doc) = state.mapping.get(&path).cloned() else {
            crate::debug_event!("cache", "ignored unregistered", "{}", path.display());
            return TransferOutcome::NotRegistered;
        };
        let Some(io) = state.io.clone() else {
            log_outcome("write-back", &path, &doc, &TransferOutcome::NoDocumentIo);
            return TransferOutcome::NoDocumentIo;
        };

        let _guard = self.suspend();
        let outcome = transfer::write_back(io.as_ref(), &path, &doc, self.buffer_size);
        log_outcome("write-back", &path, &doc, &outcome);
        outcome
    }

    fn clear(&self) -> bool {
        let mut state = self.state.lock();
        let _guard = self.suspend();

        let existed = self.root.is_dir();
        match fs::remove_dir_all(&self.root) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("[cache] cannot remove {}: {e}", self.root.display()),
        }
        if let Err(e) = fs::create_dir_all(&self.root) {
            tracing::warn!("[cache] cannot recreate {}: {e}", self.root.display());
        }

        let forgotten = state.mapping.len();
        state.mapping = PathMapping::new();
        self.pending.lock().clear();

        crate::log_event!(
            "cache",
            "cleared",
            "{} ({forgotten} entries forgotten)",
            self.root.display()
        );
        existed
    }

    /// Write back every path in `paths` that still exists.
    fn process(&self, paths: Vec<PathBuf>) -> Vec<(PathBuf, TransferOutcome)> {
        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            if !path.is_file() {
                crate::debug_event!("cache", "skipped vanished", "{}", path.display());
                continue;
            }
            let outcome = self.on_modify(&path);
            results.push((path, outcome));
        }
        results
    }
}

impl WatchHandler for CacheCore {
    fn name(&self) -> &str {
        "sync-cache"
    }

    fn on_event(&self, kind: WatchEventKind, path: &Path) {
        if kind == WatchEventKind::Deleted {
            self.pending.lock().remove(path);
            return;
        }
        if !kind.is_content_change() {
            return;
        }

        let state = self.state.lock();
        if state.mapping.contains(path) {
            crate::debug_event!("cache", "modification", "{kind} {}", path.display());
            self.pending.lock().record(path.to_path_buf());
        }
    }

    fn on_tick(&self) {
        let ready = self.pending.lock().take_ready();
        if !ready.is_empty() {
            self.process(ready);
        }
    }
}

fn log_outcome(op: &str, path: &Path, doc: &DocumentRef, outcome: &TransferOutcome) {
    match outcome {
        TransferOutcome::Completed { bytes } => {
            crate::log_event!("transfer", op, "{} <-> {doc} ({bytes} bytes)", path.display());
        }
        TransferOutcome::Failed(e) => {
            tracing::warn!("[transfer] {op} {} failed: {e}", path.display());
        }
        TransferOutcome::Unwritable => {
            tracing::warn!("[transfer] {op} {}: {doc} is not writable", path.display());
        }
        TransferOutcome::NoDocumentIo => {
            crate::debug_event!("transfer", op, "{} skipped, no document I/O", path.display());
        }
        TransferOutcome::NotRegistered => {
            crate::debug_event!("transfer", op, "{} is not registered", path.display());
        }
    }
}

/// Local mirror of remote documents kept in sync both ways.
///
/// Files under the cache root are fetched from their document on
/// [`fetch_and_watch`](Self::fetch_and_watch) and written back whenever the
/// watcher reports a modification. The cache's own writes happen with the
/// watcher suspended, so they never trigger a write-back.
///
/// # Example
///
/// ```no_run
/// use docsync::{MemoryDocumentIo, SyncCache};
///
/// let io = MemoryDocumentIo::new();
/// io.insert("mem://notes", "hello");
///
/// let cache = SyncCache::new("/tmp/docsync-cache", io)?;
/// cache.fetch_and_watch("mem://notes", "notes.txt");
/// # Ok::<(), docsync::SyncError>(())
/// ```
pub struct SyncCache {
    core: Arc<CacheCore>,
    watcher: RecursiveWatcher,
}

impl SyncCache {
    pub fn builder() -> SyncCacheBuilder {
        SyncCacheBuilder::new()
    }

    /// Open a cache over `root` with default timings.
    pub fn new(root: impl AsRef<Path>, io: impl DocumentIo + 'static) -> Result<Self, SyncError> {
        Self::builder().document_io(io).open(root)
    }

    /// Open a cache over the configured root with configured timings.
    pub fn from_settings(
        settings: &Settings,
        io: impl DocumentIo + 'static,
    ) -> Result<Self, SyncError> {
        Self::builder()
            .settings(settings)
            .document_io(io)
            .open(&settings.cache_root)
    }

    /// Canonical cache root.
    pub fn root(&self) -> &Path {
        &self.core.root
    }

    /// Map `local_path` to `doc` if it is not mapped yet. No I/O.
    ///
    /// Returns `false` and leaves the mapping untouched when the path is
    /// already registered. Relative paths are taken relative to the root.
    pub fn register(&self, local_path: impl AsRef<Path>, doc: impl Into<DocumentRef>) -> bool {
        self.core.register(local_path.as_ref(), doc.into())
    }

    /// Register if needed, then replace the local file with the document.
    ///
    /// Always performs the fetch, even for an already registered path.
    /// An existing mapping entry is kept.
    pub fn fetch_and_watch(
        &self,
        doc: impl Into<DocumentRef>,
        local_path: impl AsRef<Path>,
    ) -> TransferOutcome {
        self.core.fetch_and_watch(doc.into(), local_path.as_ref())
    }

    /// Write the local file back to its document.
    ///
    /// Called from the watcher after a modification settles; safe to call
    /// directly as well.
    pub fn on_modify(&self, local_path: impl AsRef<Path>) -> TransferOutcome {
        self.core.on_modify(local_path.as_ref())
    }

    /// Delete everything under the root and forget every mapping.
    ///
    /// Returns whether the root existed as a directory beforehand.
    pub fn clear(&self) -> bool {
        self.core.clear()
    }

    /// Write back every pending modification now, ignoring the debounce.
    pub fn flush_pending(&self) -> Vec<(PathBuf, TransferOutcome)> {
        let pending = self.core.pending.lock().take_all();
        self.core.process(pending)
    }

    /// Number of modifications waiting for their debounce to expire.
    pub fn pending_count(&self) -> usize {
        self.core.pending.lock().pending_count()
    }

    /// Install or replace the document I/O collaborator.
    pub fn set_document_io(&self, io: impl DocumentIo + 'static) {
        self.core.state.lock().io = Some(Arc::new(io));
        crate::debug_event!("cache", "document I/O installed");
    }

    pub fn has_document_io(&self) -> bool {
        self.core.state.lock().io.is_some()
    }

    pub fn document_for(&self, local_path: impl AsRef<Path>) -> Option<DocumentRef> {
        let path = self.core.resolve(local_path.as_ref());
        self.core.state.lock().mapping.get(&path).cloned()
    }

    pub fn is_registered(&self, local_path: impl AsRef<Path>) -> bool {
        let path = self.core.resolve(local_path.as_ref());
        self.core.state.lock().mapping.contains(&path)
    }

    /// Sorted snapshot of the mapping.
    pub fn mapping(&self) -> BTreeMap<PathBuf, DocumentRef> {
        self.core.state.lock().mapping.snapshot()
    }

    /// Control handle of the underlying watcher.
    pub fn watch_control(&self) -> WatchControl {
        self.watcher.control()
    }
}

/// Builder for [`SyncCache`].
pub struct SyncCacheBuilder {
    debounce_ms: u64,
    tick_ms: u64,
    buffer_size: usize,
    io: Option<Arc<dyn DocumentIo>>,
    backend: Option<(Box<dyn WatchBackend>, Receiver<notify::Result<Event>>)>,
}

impl SyncCacheBuilder {
    pub fn new() -> Self {
        let settings = Settings::default();
        Self {
            debounce_ms: settings.watcher.debounce_ms,
            tick_ms: settings.watcher.tick_ms,
            buffer_size: settings.transfer.buffer_size,
            io: None,
            backend: None,
        }
    }

    /// Take timings and buffer size from settings.
    pub fn settings(mut self, settings: &Settings) -> Self {
        self.debounce_ms = settings.watcher.debounce_ms;
        self.tick_ms = settings.watcher.tick_ms;
        self.buffer_size = settings.transfer.buffer_size;
        self
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub fn tick_ms(mut self, ms: u64) -> Self {
        self.tick_ms = ms;
        self
    }

    pub fn buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = bytes.max(1);
        self
    }

    pub fn document_io(mut self, io: impl DocumentIo + 'static) -> Self {
        self.io = Some(Arc::new(io));
        self
    }

    /// Use a custom watch backend instead of `notify`.
    pub fn backend(
        mut self,
        backend: Box<dyn WatchBackend>,
        events: Receiver<notify::Result<Event>>,
    ) -> Self {
        self.backend = Some((backend, events));
        self
    }

    /// Create the root if needed and start watching it.
    pub fn open(self, root: impl AsRef<Path>) -> Result<SyncCache, SyncError> {
        let requested_root = root.as_ref().to_path_buf();
        let cache_root = |source| SyncError::CacheRoot {
            path: requested_root.clone(),
            source,
        };
        fs::create_dir_all(&requested_root).map_err(cache_root)?;
        let root = requested_root.canonicalize().map_err(cache_root)?;

        let core = Arc::new(CacheCore {
            root: root.clone(),
            requested_root: requested_root.clone(),
            state: Mutex::new(CacheState {
                mapping: PathMapping::new(),
                io: self.io,
            }),
            pending: Mutex::new(Debouncer::new(self.debounce_ms)),
            control: OnceLock::new(),
            buffer_size: self.buffer_size,
        });

        let handler: Arc<dyn WatchHandler> = core.clone();
        let mut watcher = RecursiveWatcher::builder()
            .shared_handler(handler)
            .tick_ms(self.tick_ms);
        if let Some((backend, events)) = self.backend {
            watcher = watcher.backend(backend, events);
        }
        let watcher = watcher.start(&root)?;

        // Nothing is registered yet, so no transfer can run before this
        let _ = core.control.set(watcher.control());

        crate::log_event!("cache", "opened", "{}", root.display());
        Ok(SyncCache { core, watcher })
    }
}

impl Default for SyncCacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docio::MemoryDocumentIo;
    use crate::watcher::{WatchError, WatchMode};
    use crossbeam_channel::{Sender, unbounded};
    use notify::EventKind;
    use notify::event::{DataChange, ModifyKind, RemoveKind};
    use std::io::{Read, Write};
    use std::thread;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    struct NullBackend;

    impl WatchBackend for NullBackend {
        fn watch(&mut self, _dir: &Path) -> Result<(), WatchError> {
            Ok(())
        }

        fn unwatch(&mut self, _dir: &Path) -> Result<(), WatchError> {
            Ok(())
        }
    }

    /// Records the watcher mode every time a stream is opened.
    struct ModeProbe {
        inner: MemoryDocumentIo,
        control: Arc<OnceLock<WatchControl>>,
        seen: Arc<Mutex<Vec<WatchMode>>>,
    }

    impl ModeProbe {
        fn record(&self) {
            if let Some(control) = self.control.get() {
                self.seen.lock().push(control.mode());
            }
        }
    }

    impl DocumentIo for ModeProbe {
        fn open_read(&self, doc: &DocumentRef) -> io::Result<Box<dyn Read + Send>> {
            self.record();
            self.inner.open_read(doc)
        }

        fn open_write(&self, doc: &DocumentRef) -> io::Result<Option<Box<dyn Write + Send>>> {
            self.record();
            self.inner.open_write(doc)
        }
    }

    struct Harness {
        cache: SyncCache,
        io: MemoryDocumentIo,
        events: Sender<notify::Result<Event>>,
        _temp: TempDir,
    }

    fn harness(debounce_ms: u64) -> Harness {
        let temp = TempDir::new().unwrap();
        let io = MemoryDocumentIo::new();
        let (tx, rx) = unbounded();

        let cache = SyncCache::builder()
            .debounce_ms(debounce_ms)
            .tick_ms(5)
            .document_io(io.clone())
            .backend(Box::new(NullBackend), rx)
            .open(temp.path().join("cache"))
            .unwrap();

        Harness {
            cache,
            io,
            events: tx,
            _temp: temp,
        }
    }

    fn modify(h: &Harness, path: &Path) {
        let kind = EventKind::Modify(ModifyKind::Data(DataChange::Content));
        h.events
            .send(Ok(Event::new(kind).add_path(path.to_path_buf())))
            .unwrap();
    }

    fn wait_for(condition: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        condition()
    }

    #[test]
    fn test_open_creates_missing_root() {
        let h = harness(10);
        assert!(h.cache.root().is_dir());
        assert!(h.cache.root().is_absolute());
        assert_eq!(h.cache.watch_control().mode(), WatchMode::Active);
    }

    #[test]
    fn test_open_rejects_root_that_is_a_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("occupied");
        fs::write(&file, "x").unwrap();

        let result = SyncCache::new(&file, MemoryDocumentIo::new());
        assert!(matches!(result, Err(SyncError::CacheRoot { .. })));
    }

    #[test]
    fn test_register_is_idempotent_and_relative_to_root() {
        let h = harness(10);

        assert!(h.cache.register("notes/a.txt", "mem://a"));
        assert!(!h.cache.register("notes/a.txt", "mem://other"));

        let absolute = h.cache.root().join("notes/a.txt");
        assert!(!h.cache.register(&absolute, "mem://third"));
        assert_eq!(h.cache.document_for(&absolute), Some(DocumentRef::new("mem://a")));
        assert_eq!(h.cache.mapping().len(), 1);
        // No I/O happened
        assert!(!absolute.exists());
        assert_eq!(h.io.total_reads(), 0);
    }

    #[test]
    fn test_fetch_keeps_existing_mapping() {
        let h = harness(10);
        h.io.insert("mem://first", "first");
        h.io.insert("mem://second", "second");

        assert!(h.cache.fetch_and_watch("mem://first", "doc.txt").is_completed());
        let outcome = h.cache.fetch_and_watch("mem://second", "doc.txt");

        assert_eq!(outcome.bytes(), Some(6));
        let path = h.cache.root().join("doc.txt");
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert_eq!(h.cache.document_for(&path), Some(DocumentRef::new("mem://first")));
    }

    #[test]
    fn test_on_modify_unregistered_is_inert() {
        let h = harness(10);
        let path = h.cache.root().join("stray.txt");
        fs::write(&path, "stray").unwrap();

        assert!(matches!(
            h.cache.on_modify(&path),
            TransferOutcome::NotRegistered
        ));
        assert_eq!(h.io.total_writes(), 0);
    }

    #[test]
    fn test_missing_document_io_until_installed() {
        let temp = TempDir::new().unwrap();
        let (_tx, rx) = unbounded();
        let cache = SyncCache::builder()
            .backend(Box::new(NullBackend), rx)
            .open(temp.path())
            .unwrap();
        assert!(!cache.has_document_io());

        assert!(matches!(
            cache.fetch_and_watch("mem://doc", "doc.txt"),
            TransferOutcome::NoDocumentIo
        ));
        // Registration still happened
        assert!(cache.is_registered("doc.txt"));

        let io = MemoryDocumentIo::new();
        io.insert("mem://doc", "remote");
        cache.set_document_io(io.clone());
        assert!(cache.has_document_io());

        assert!(cache.fetch_and_watch("mem://doc", "doc.txt").is_completed());
        fs::write(cache.root().join("doc.txt"), "local").unwrap();
        assert!(cache.on_modify("doc.txt").is_completed());
        assert_eq!(io.content(&DocumentRef::new("mem://doc")).unwrap(), b"local");
    }

    #[test]
    fn test_transfers_run_with_watcher_suspended() {
        let h = harness(10);
        let control = Arc::new(OnceLock::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _ = control.set(h.cache.watch_control());

        h.io.insert("mem://doc", "remote");
        h.cache.set_document_io(ModeProbe {
            inner: h.io.clone(),
            control: Arc::clone(&control),
            seen: Arc::clone(&seen),
        });

        assert!(h.cache.fetch_and_watch("mem://doc", "doc.txt").is_completed());
        assert!(h.cache.on_modify("doc.txt").is_completed());

        assert_eq!(*seen.lock(), vec![WatchMode::Suspended, WatchMode::Suspended]);
        assert_eq!(h.cache.watch_control().mode(), WatchMode::Active);
    }

    #[test]
    fn test_failed_transfer_restores_watcher() {
        let h = harness(10);
        h.io.insert("mem://doc", "remote");
        assert!(h.cache.fetch_and_watch("mem://doc", "doc.txt").is_completed());

        h.io.set_failing("mem://doc", true);
        let outcome = h.cache.on_modify("doc.txt");

        assert!(outcome.error().is_some());
        assert_eq!(h.cache.watch_control().mode(), WatchMode::Active);
    }

    #[test]
    fn test_burst_of_events_writes_back_once() {
        let h = harness(20);
        let doc = DocumentRef::new("mem://doc");
        h.io.insert(doc.clone(), "remote");
        assert!(h.cache.fetch_and_watch(doc.clone(), "doc.txt").is_completed());

        let path = h.cache.root().join("doc.txt");
        fs::write(&path, "edited").unwrap();
        for _ in 0..4 {
            modify(&h, &path);
        }

        assert!(wait_for(|| h.io.write_count(&doc) == 1));
        thread::sleep(Duration::from_millis(60));
        assert_eq!(h.io.write_count(&doc), 1);
        assert_eq!(h.io.content(&doc).unwrap(), b"edited");
    }

    #[test]
    fn test_events_for_unregistered_paths_are_ignored() {
        let h = harness(0);
        let path = h.cache.root().join("stray.txt");
        fs::write(&path, "stray").unwrap();

        modify(&h, &path);
        thread::sleep(Duration::from_millis(40));

        assert_eq!(h.cache.pending_count(), 0);
        assert_eq!(h.io.total_writes(), 0);
    }

    #[test]
    fn test_delete_drops_pending_write_back() {
        let h = harness(100);
        let doc = DocumentRef::new("mem://doc");
        h.io.insert(doc.clone(), "remote");
        assert!(h.cache.fetch_and_watch(doc.clone(), "doc.txt").is_completed());

        let path = h.cache.root().join("doc.txt");
        modify(&h, &path);
        assert!(wait_for(|| h.cache.pending_count() == 1));

        h.events
            .send(Ok(Event::new(EventKind::Remove(RemoveKind::File)).add_path(path)))
            .unwrap();
        assert!(wait_for(|| h.cache.pending_count() == 0));
        thread::sleep(Duration::from_millis(150));
        assert_eq!(h.io.write_count(&doc), 0);
    }

    #[test]
    fn test_vanished_file_is_skipped_on_flush() {
        let h = harness(60_000);
        let doc = DocumentRef::new("mem://doc");
        h.io.insert(doc.clone(), "remote");
        assert!(h.cache.fetch_and_watch(doc.clone(), "doc.txt").is_completed());

        let path = h.cache.root().join("doc.txt");
        modify(&h, &path);
        assert!(wait_for(|| h.cache.pending_count() == 1));
        fs::remove_file(&path).unwrap();

        assert!(h.cache.flush_pending().is_empty());
        assert_eq!(h.io.content(&doc).unwrap(), b"remote");
    }

    #[test]
    fn test_flush_pending_ignores_debounce() {
        let h = harness(60_000);
        let doc = DocumentRef::new("mem://doc");
        h.io.insert(doc.clone(), "remote");
        assert!(h.cache.fetch_and_watch(doc.clone(), "doc.txt").is_completed());

        let path = h.cache.root().join("doc.txt");
        fs::write(&path, "edited").unwrap();
        modify(&h, &path);
        assert!(wait_for(|| h.cache.pending_count() == 1));

        let flushed = h.cache.flush_pending();
        assert_eq!(flushed.len(), 1);
        assert_eq!(flushed[0].0, path);
        assert!(flushed[0].1.is_completed());
        assert_eq!(h.io.content(&doc).unwrap(), b"edited");
    }

    #[test]
    fn test_clear_wipes_root_mapping_and_pending() {
        let h = harness(60_000);
        h.io.insert("mem://a", "a");
        h.io.insert("mem://b", "b");
        assert!(h.cache.fetch_and_watch("mem://a", "a.txt").is_completed());
        assert!(h.cache.fetch_and_watch("mem://b", "nested/b.txt").is_completed());
        modify(&h, &h.cache.root().join("a.txt"));
        assert!(wait_for(|| h.cache.pending_count() == 1));

        assert!(h.cache.clear());

        assert!(h.cache.root().is_dir());
        assert_eq!(fs::read_dir(h.cache.root()).unwrap().count(), 0);
        assert!(h.cache.mapping().is_empty());
        assert_eq!(h.cache.pending_count(), 0);
        assert_eq!(h.cache.watch_control().mode(), WatchMode::Active);

        // Old paths can be registered again
        assert!(h.cache.register("a.txt", "mem://b"));
    }

    #[test]
    fn test_clear_reports_missing_root() {
        let h = harness(10);
        fs::remove_dir_all(h.cache.root()).unwrap();

        assert!(!h.cache.clear());
        assert!(h.cache.root().is_dir());
    }
}
