//! Document references and the I/O collaborator that opens them.
//!
//! A [`DocumentRef`] is an opaque handle to externally stored content.
//! The cache never interprets it; it only hands it to a [`DocumentIo`]
//! implementation to obtain read and write streams.

mod file;
mod memory;

use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use file::FileDocumentIo;
pub use memory::MemoryDocumentIo;

/// Opaque, string-serializable handle to a remote document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentRef(String);

impl DocumentRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DocumentRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for DocumentRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DocumentRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Opens streams on document references.
///
/// Implementations are shared between the control path and the watcher's
/// event thread, so they must be `Send + Sync`.
pub trait DocumentIo: Send + Sync {
    /// Open the document for a full streamed read.
    fn open_read(&self, doc: &DocumentRef) -> io::Result<Box<dyn Read + Send>>;

    /// Open the document for a full streamed overwrite.
    ///
    /// `Ok(None)` means the document exists but cannot be written; the
    /// cache treats that as "write-back not possible".
    fn open_write(&self, doc: &DocumentRef) -> io::Result<Option<Box<dyn Write + Send>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_ref_is_transparent_string() {
        let doc = DocumentRef::new("content://notes/1");
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, "\"content://notes/1\"");

        let back: DocumentRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
        assert_eq!(back.to_string(), "content://notes/1");
    }

    #[test]
    fn test_document_ref_comparison() {
        let a: DocumentRef = "doc://a".parse().unwrap();
        let b = DocumentRef::from("doc://b");
        assert!(a < b);
        assert_ne!(a, b);
        assert_eq!(a, DocumentRef::from("doc://a".to_string()));
    }
}
