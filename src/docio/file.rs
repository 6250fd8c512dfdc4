//! Filesystem-backed document storage.
//!
//! References are either `file://` URIs with absolute paths, absolute
//! paths, or paths relative to the storage root.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use url::Url;

use super::{DocumentIo, DocumentRef};

const FILE_SCHEME: &str = "file://";

/// Resolves document references to files on disk.
#[derive(Debug, Clone)]
pub struct FileDocumentIo {
    storage_root: PathBuf,
}

impl FileDocumentIo {
    /// Create a backend that resolves relative references against
    /// `storage_root`.
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
        }
    }

    /// Map a reference to the file it names.
    ///
    /// `file://` URIs are percent-decoded; bare paths are taken literally.
    pub fn resolve(&self, doc: &DocumentRef) -> PathBuf {
        let raw = doc.as_str();
        if raw.starts_with(FILE_SCHEME) {
            if let Some(path) = Url::parse(raw).ok().and_then(|url| url.to_file_path().ok()) {
                return path;
            }
        }
        let raw = raw.strip_prefix(FILE_SCHEME).unwrap_or(raw);
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.storage_root.join(path)
        }
    }
}

impl DocumentIo for FileDocumentIo {
    fn open_read(&self, doc: &DocumentRef) -> io::Result<Box<dyn Read + Send>> {
        let path = self.resolve(doc);
        crate::debug_event!("docio", "open read", "{}", path.display());
        Ok(Box::new(File::open(path)?))
    }

    fn open_write(&self, doc: &DocumentRef) -> io::Result<Option<Box<dyn Write + Send>>> {
        let path = self.resolve(doc);

        // Existing read-only documents are reported as unwritable, not as errors
        match fs::metadata(&path) {
            Ok(meta) if meta.permissions().readonly() => {
                crate::debug_event!("docio", "read-only", "{}", path.display());
                return Ok(None);
            }
            Ok(meta) if meta.is_dir() => {
                return Err(io::Error::other(format!(
                    "{} is a directory",
                    path.display()
                )));
            }
            _ => {}
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        crate::debug_event!("docio", "open write", "{}", path.display());
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Some(Box::new(file)))
    }
}
