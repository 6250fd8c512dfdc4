//! Error and outcome types for the synchronized cache.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::docio::DocumentRef;
use crate::watcher::WatchError;

/// Errors that can stop a cache from being built.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Cannot prepare cache root {path}: {source}")]
    CacheRoot { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Watch(#[from] WatchError),
}

/// Why a single transfer failed.
///
/// Transfers are best-effort: these are reported inside
/// [`TransferOutcome::Failed`] and logged, never returned as `Err`.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Cannot open document {doc} for reading: {source}")]
    OpenRead { doc: DocumentRef, source: io::Error },

    #[error("Cannot open document {doc} for writing: {source}")]
    OpenWrite { doc: DocumentRef, source: io::Error },

    #[error("Cannot open local file {path}: {source}")]
    OpenLocal { path: PathBuf, source: io::Error },

    #[error("Cannot clear local path {path}: {source}")]
    PrepareLocal { path: PathBuf, source: io::Error },

    #[error("Copy {from} -> {to} failed after {bytes} bytes: {source}")]
    Copy {
        from: String,
        to: String,
        bytes: u64,
        source: io::Error,
    },
}

/// Result of a fetch or write-back.
#[derive(Debug)]
pub enum TransferOutcome {
    /// Full content was copied.
    Completed { bytes: u64 },
    /// The path has no mapping entry; nothing was done.
    NotRegistered,
    /// No document I/O collaborator is configured; nothing was done.
    NoDocumentIo,
    /// The document cannot be written; nothing was done.
    Unwritable,
    /// The transfer aborted. Partial writes are left in place.
    Failed(TransferError),
}

impl TransferOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TransferOutcome::Completed { .. })
    }

    /// Bytes copied, if the transfer completed.
    pub fn bytes(&self) -> Option<u64> {
        match self {
            TransferOutcome::Completed { bytes } => Some(*bytes),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&TransferError> {
        match self {
            TransferOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferOutcome::Completed { bytes } => write!(f, "completed ({bytes} bytes)"),
            TransferOutcome::NotRegistered => f.write_str("not registered"),
            TransferOutcome::NoDocumentIo => f.write_str("no document I/O"),
            TransferOutcome::Unwritable => f.write_str("document not writable"),
            TransferOutcome::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}
