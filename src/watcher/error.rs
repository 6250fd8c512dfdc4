//! Error types for the recursive watcher.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from watcher operations.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Watch root {path} does not exist or is not a directory")]
    PathNotFound { path: PathBuf },

    #[error("Failed to initialize watcher: {reason}")]
    InitFailed { reason: String },

    /// A single directory could not be watched. Never fatal: the subtree
    /// simply stays unwatched.
    #[error("Cannot watch path {path}: {reason}")]
    PathWatchFailed { path: PathBuf, reason: String },

    #[error("Cannot unwatch path {path}: {reason}")]
    UnwatchFailed { path: PathBuf, reason: String },

    #[error("File system event error: {details}")]
    EventError { details: String },
}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        WatchError::InitFailed {
            reason: e.to_string(),
        }
    }
}
