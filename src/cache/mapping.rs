//! Local path to document reference table.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::docio::DocumentRef;

/// Maps absolute local file paths to the documents they mirror.
///
/// A path is registered at most once; later registrations are ignored.
#[derive(Debug, Default, Clone)]
pub struct PathMapping {
    entries: HashMap<PathBuf, DocumentRef>,
}

impl PathMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `path -> doc` if the path is not registered yet.
    ///
    /// Returns false, leaving the existing entry untouched, otherwise.
    pub fn register(&mut self, path: PathBuf, doc: DocumentRef) -> bool {
        if self.entries.contains_key(&path) {
            return false;
        }
        self.entries.insert(path, doc);
        true
    }

    pub fn get(&self, path: &Path) -> Option<&DocumentRef> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted copy of the table.
    pub fn snapshot(&self) -> BTreeMap<PathBuf, DocumentRef> {
        self.entries
            .iter()
            .map(|(path, doc)| (path.clone(), doc.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_once() {
        let mut mapping = PathMapping::new();
        let path = PathBuf::from("/cache/notes.txt");

        assert!(mapping.register(path.clone(), DocumentRef::new("doc://1")));
        assert!(!mapping.register(path.clone(), DocumentRef::new("doc://2")));

        assert_eq!(mapping.get(&path), Some(&DocumentRef::new("doc://1")));
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let mut mapping = PathMapping::new();
        mapping.register(PathBuf::from("/cache/b"), DocumentRef::new("doc://b"));
        mapping.register(PathBuf::from("/cache/a"), DocumentRef::new("doc://a"));

        let keys: Vec<_> = mapping.snapshot().into_keys().collect();
        assert_eq!(keys, vec![PathBuf::from("/cache/a"), PathBuf::from("/cache/b")]);
        assert!(mapping.contains(Path::new("/cache/a")));
        assert!(!PathMapping::new().contains(Path::new("/cache/a")));
    }
}
