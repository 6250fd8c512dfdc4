//! Local cache mirroring for externally stored documents.
//!
//! A [`SyncCache`] keeps files under one cache root in sync with the
//! documents they were fetched from. A [`RecursiveWatcher`] reports local
//! modifications, which are written back through a [`DocumentIo`]
//! implementation. The cache suspends the watcher around its own writes.

#[macro_use]
pub mod logging;

pub mod cache;
pub mod cli;
pub mod config;
pub mod docio;
pub mod watcher;

pub use cache::{
    PathMapping, SyncCache, SyncCacheBuilder, SyncError, TransferError, TransferOutcome,
};
pub use config::Settings;
pub use docio::{DocumentIo, DocumentRef, FileDocumentIo, MemoryDocumentIo};
pub use watcher::{
    RecursiveWatcher, SuspendGuard, WatchControl, WatchError, WatchEventKind, WatchHandler,
    WatchMode,
};
