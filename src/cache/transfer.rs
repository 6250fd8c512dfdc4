//! Whole-file streamed transfers between local files and documents.
//!
//! Both directions fully replace the destination. There is no temp file
//! and rename: an error mid-copy leaves a partially written destination.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::docio::{DocumentIo, DocumentRef};

use super::error::{TransferError, TransferOutcome};

/// A copy that stopped part way.
#[derive(Debug)]
struct CopyFailure {
    bytes: u64,
    source: io::Error,
}

/// Buffered copy of everything `reader` yields into `writer`.
fn pump(reader: impl Read, writer: impl Write, buffer_size: usize) -> Result<u64, CopyFailure> {
    let buffer_size = buffer_size.max(1);
    let mut reader = BufReader::with_capacity(buffer_size, reader);
    let mut writer = BufWriter::with_capacity(buffer_size, writer);
    let mut buf = vec![0u8; buffer_size];
    let mut bytes = 0u64;

    loop {
        let len = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(len) => len,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => return Err(CopyFailure { bytes, source }),
        };
        writer
            .write_all(&buf[..len])
            .map_err(|source| CopyFailure { bytes, source })?;
        bytes += len as u64;
    }

    writer
        .flush()
        .map_err(|source| CopyFailure { bytes, source })?;
    Ok(bytes)
}

/// Remove whatever occupies `dst` and make sure its parent exists.
fn clear_destination(dst: &Path) -> io::Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }

    match fs::symlink_metadata(dst) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(dst),
        Ok(_) => fs::remove_file(dst),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Replace `dst` with the full content of `doc`.
pub(crate) fn fetch(
    io: &dyn DocumentIo,
    doc: &DocumentRef,
    dst: &Path,
    buffer_size: usize,
) -> TransferOutcome {
    if let Err(source) = clear_destination(dst) {
        return TransferOutcome::Failed(TransferError::PrepareLocal {
            path: dst.to_path_buf(),
            source,
        });
    }

    let reader = match io.open_read(doc) {
        Ok(reader) => reader,
        Err(source) => {
            return TransferOutcome::Failed(TransferError::OpenRead {
                doc: doc.clone(),
                source,
            });
        }
    };

    let file = match File::create(dst) {
        Ok(file) => file,
        Err(source) => {
            return TransferOutcome::Failed(TransferError::OpenLocal {
                path: dst.to_path_buf(),
                source,
            });
        }
    };

    match pump(reader, file, buffer_size) {
        Ok(bytes) => TransferOutcome::Completed { bytes },
        Err(CopyFailure { bytes, source }) => TransferOutcome::Failed(TransferError::Copy {
            from: doc.to_string(),
            to: dst.display().to_string(),
            bytes,
            source,
        }),
    }
}

/// Overwrite `doc` with the full content of `src`.
pub(crate) fn write_back(
    io: &dyn DocumentIo,
    src: &Path,
    doc: &DocumentRef,
    buffer_size: usize,
) -> TransferOutcome {
    // Open the local side first so a vanished file never truncates the document
    let file = match File::open(src) {
        Ok(file) => file,
        Err(source) => {
            return TransferOutcome::Failed(TransferError::OpenLocal {
                path: src.to_path_buf(),
                source,
            });
        }
    };

    let writer = match io.open_write(doc) {
        Ok(Some(writer)) => writer,
        Ok(None) => return TransferOutcome::Unwritable,
        Err(source) => {
            return TransferOutcome::Failed(TransferError::OpenWrite {
                doc: doc.clone(),
                source,
            });
        }
    };

    match pump(file, writer, buffer_size) {
        Ok(bytes) => TransferOutcome::Completed { bytes },
        Err(CopyFailure { bytes, source }) => TransferOutcome::Failed(TransferError::Copy {
            from: src.display().to_string(),
            to: doc.to_string(),
            bytes,
            source,
        }),
    }
}
