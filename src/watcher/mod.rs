//! Recursive file watcher.
//!
//! Keeps one OS watch per directory under a root, follows the tree as it
//! changes, and delivers every event to a single handler.
//!
//! # Architecture
//!
//! ```text
//! RecursiveWatcher
//!   - WatchBackend (notify::RecommendedWatcher, one watch per directory)
//!   - WatchSet (active and degraded directories)
//!   - event thread: raw events -> WatchEventKind -> WatchHandler
//!         |
//!    WatchControl (stop / resume / suspend guard)
//! ```

mod backend;
mod debouncer;
mod error;
mod handler;
mod recursive;
mod watch_set;

pub use backend::{NotifyBackend, WatchBackend};
pub use debouncer::Debouncer;
pub use error::WatchError;
pub use handler::{WatchEventKind, WatchHandler};
pub use recursive::{
    RecursiveWatcher, RecursiveWatcherBuilder, SuspendGuard, WatchControl, WatchMode,
};
pub use watch_set::WatchSet;
