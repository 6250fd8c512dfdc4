//! Synchronized cache of remote documents.
//!
//! Each registered local file mirrors one [`DocumentRef`](crate::DocumentRef).
//!
//! ```text
//! fetch_and_watch(doc, path)      remote -> local, watcher suspended
//! watcher event -> debounce -> on_modify(path)
//!                                 local -> remote, watcher suspended
//! clear()                         wipe root and mapping
//! ```
//!
//! A single lock covers the mapping and every change under the root, so
//! operations never interleave.

mod error;
mod mapping;
mod sync;
mod transfer;

pub use error::{SyncError, TransferError, TransferOutcome};
pub use mapping::PathMapping;
pub use sync::{SyncCache, SyncCacheBuilder};
