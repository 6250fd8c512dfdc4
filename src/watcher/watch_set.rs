//! Set of directories currently under watch.
//!
//! Tracks one entry per watched directory plus the directories that could
//! not be watched. Subtree removal works on path prefixes so a deleted
//! directory drops the watches of everything beneath it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Active directory watches and degraded (unwatchable) directories.
#[derive(Debug, Default)]
pub struct WatchSet {
    /// Directories with an active watch.
    dirs: HashSet<PathBuf>,
    /// Directories whose watch failed; their subtrees are not covered.
    degraded: HashSet<PathBuf>,
}

impl WatchSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an active watch. Returns false if it was already present.
    pub fn insert(&mut self, dir: PathBuf) -> bool {
        self.degraded.remove(&dir);
        self.dirs.insert(dir)
    }

    /// Record a directory whose watch could not be established.
    pub fn mark_degraded(&mut self, dir: PathBuf) {
        self.degraded.insert(dir);
    }

    /// Check if a directory has an active watch.
    pub fn contains(&self, dir: &Path) -> bool {
        self.dirs.contains(dir)
    }

    /// Remove `dir` and every watched directory beneath it.
    ///
    /// Returns the removed directories, deepest first.
    pub fn remove_subtree(&mut self, dir: &Path) -> Vec<PathBuf> {
        let mut removed: Vec<PathBuf> = self
            .dirs
            .iter()
            .filter(|watched| watched.starts_with(dir))
            .cloned()
            .collect();
        for path in &removed {
            self.dirs.remove(path);
        }
        self.degraded.retain(|path| !path.starts_with(dir));

        removed.sort_by_key(|path| std::cmp::Reverse(path.components().count()));
        removed
    }

    /// Remove everything, returning the directories that were watched.
    pub fn drain(&mut self) -> Vec<PathBuf> {
        self.degraded.clear();
        self.dirs.drain().collect()
    }

    /// Sorted snapshot of watched directories.
    pub fn dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self.dirs.iter().cloned().collect();
        dirs.sort();
        dirs
    }

    /// Sorted snapshot of degraded directories.
    pub fn degraded(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self.degraded.iter().cloned().collect();
        dirs.sort();
        dirs
    }

    /// Get count of watched directories.
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}
