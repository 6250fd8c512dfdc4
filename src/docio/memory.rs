//! In-process document storage.
//!
//! Useful for embedding hosts that keep documents in memory and for
//! exercising the cache without a real storage provider. Every open is
//! counted so callers can assert on transfer traffic.

use std::collections::{HashMap, HashSet};
use std::io::{self, Cursor, Read, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{DocumentIo, DocumentRef};

#[derive(Debug, Default)]
struct MemoryState {
    documents: HashMap<DocumentRef, Vec<u8>>,
    read_only: HashSet<DocumentRef>,
    failing: HashSet<DocumentRef>,
    /// Writes fail once the document holds this many bytes.
    write_limits: HashMap<DocumentRef, usize>,
    reads: HashMap<DocumentRef, usize>,
    writes: HashMap<DocumentRef, usize>,
}

/// Shared in-memory document store.
///
/// Cloning yields another handle to the same store.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentIo {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDocumentIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored content of a document.
    pub fn insert(&self, doc: impl Into<DocumentRef>, content: impl Into<Vec<u8>>) {
        self.state
            .lock()
            .documents
            .insert(doc.into(), content.into());
    }

    /// Current content of a document, if it exists.
    pub fn content(&self, doc: &DocumentRef) -> Option<Vec<u8>> {
        self.state.lock().documents.get(doc).cloned()
    }

    /// Make `open_write` report the document as unwritable.
    pub fn set_read_only(&self, doc: impl Into<DocumentRef>) {
        self.state.lock().read_only.insert(doc.into());
    }

    /// Make every open of the document fail with an I/O error.
    pub fn set_failing(&self, doc: impl Into<DocumentRef>, failing: bool) {
        let doc = doc.into();
        let mut state = self.state.lock();
        if failing {
            state.failing.insert(doc);
        } else {
            state.failing.remove(&doc);
        }
    }

    /// Let writes to the document fail once it holds `limit` bytes.
    pub fn fail_writes_after(&self, doc: impl Into<DocumentRef>, limit: usize) {
        self.state.lock().write_limits.insert(doc.into(), limit);
    }

    /// Number of successful `open_read` calls for a document.
    pub fn read_count(&self, doc: &DocumentRef) -> usize {
        self.state.lock().reads.get(doc).copied().unwrap_or(0)
    }

    /// Number of successful `open_write` calls for a document.
    pub fn write_count(&self, doc: &DocumentRef) -> usize {
        self.state.lock().writes.get(doc).copied().unwrap_or(0)
    }

    /// Total successful `open_write` calls across all documents.
    pub fn total_writes(&self) -> usize {
        self.state.lock().writes.values().sum()
    }

    /// Total successful `open_read` calls across all documents.
    pub fn total_reads(&self) -> usize {
        self.state.lock().reads.values().sum()
    }
}

impl DocumentIo for MemoryDocumentIo {
    fn open_read(&self, doc: &DocumentRef) -> io::Result<Box<dyn Read + Send>> {
        let mut state = self.state.lock();
        if state.failing.contains(doc) {
            return Err(io::Error::other(format!("{doc} is failing")));
        }
        let content = state
            .documents
            .get(doc)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, doc.to_string()))?;
        *state.reads.entry(doc.clone()).or_default() += 1;
        Ok(Box::new(Cursor::new(content)))
    }

    fn open_write(&self, doc: &DocumentRef) -> io::Result<Option<Box<dyn Write + Send>>> {
        let mut state = self.state.lock();
        if state.failing.contains(doc) {
            return Err(io::Error::other(format!("{doc} is failing")));
        }
        if state.read_only.contains(doc) {
            return Ok(None);
        }
        // Truncate on open, like a file opened for overwrite
        state.documents.insert(doc.clone(), Vec::new());
        *state.writes.entry(doc.clone()).or_default() += 1;
        let limit = state.write_limits.get(doc).copied();

        Ok(Some(Box::new(MemoryWriter {
            doc: doc.clone(),
            state: Arc::clone(&self.state),
            limit,
        })))
    }
}

/// Appends straight into the shared store so an interrupted transfer
/// leaves whatever was written so far.
struct MemoryWriter {
    doc: DocumentRef,
    state: Arc<Mutex<MemoryState>>,
    limit: Option<usize>,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        let stored = state.documents.entry(self.doc.clone()).or_default();

        let accepted = match self.limit {
            Some(limit) if stored.len() >= limit => {
                return Err(io::Error::other(format!("{} write limit reached", self.doc)));
            }
            Some(limit) => buf.len().min(limit - stored.len()),
            None => buf.len(),
        };
        stored.extend_from_slice(&buf[..accepted]);
        Ok(accepted)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
