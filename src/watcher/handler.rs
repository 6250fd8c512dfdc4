//! Handler trait and normalized event kinds for the recursive watcher.

use std::fmt;
use std::path::Path;

use notify::EventKind;
use notify::event::{AccessKind, AccessMode, ModifyKind};

/// Normalized filesystem event kind.
///
/// Every OS-level event is mapped to one of these and delivered; nothing
/// is filtered out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchEventKind {
    Created,
    Deleted,
    /// File content changed.
    Modified,
    /// Entry renamed or moved, either away from or onto the path.
    Moved,
    /// Permissions, timestamps or other metadata changed.
    Attributes,
    Accessed,
    /// A file opened for writing was closed.
    ClosedWrite,
    Other,
}

impl WatchEventKind {
    /// Whether this kind can mean new file content at the path.
    pub fn is_content_change(self) -> bool {
        matches!(
            self,
            WatchEventKind::Modified
                | WatchEventKind::ClosedWrite
                | WatchEventKind::Created
                | WatchEventKind::Moved
        )
    }
}

impl From<&EventKind> for WatchEventKind {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => WatchEventKind::Created,
            EventKind::Remove(_) => WatchEventKind::Deleted,
            EventKind::Modify(ModifyKind::Name(_)) => WatchEventKind::Moved,
            EventKind::Modify(ModifyKind::Metadata(_)) => WatchEventKind::Attributes,
            EventKind::Modify(_) => WatchEventKind::Modified,
            EventKind::Access(AccessKind::Close(AccessMode::Write)) => WatchEventKind::ClosedWrite,
            EventKind::Access(_) => WatchEventKind::Accessed,
            EventKind::Any | EventKind::Other => WatchEventKind::Other,
        }
    }
}

impl fmt::Display for WatchEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WatchEventKind::Created => "created",
            WatchEventKind::Deleted => "deleted",
            WatchEventKind::Modified => "modified",
            WatchEventKind::Moved => "moved",
            WatchEventKind::Attributes => "attributes",
            WatchEventKind::Accessed => "accessed",
            WatchEventKind::ClosedWrite => "closed-write",
            WatchEventKind::Other => "other",
        };
        f.pad(name)
    }
}

/// Receiver of the watcher's event stream.
///
/// Called on the watcher's own event thread, never concurrently with
/// itself.
pub trait WatchHandler: Send + Sync {
    /// Handler name for logging.
    fn name(&self) -> &str {
        "handler"
    }

    /// Handle one event for one absolute path.
    fn on_event(&self, kind: WatchEventKind, path: &Path);

    /// Periodic hook, run on the event thread at the configured tick
    /// interval.
    fn on_tick(&self) {}
}

impl<F> WatchHandler for F
where
    F: Fn(WatchEventKind, &Path) + Send + Sync,
{
    fn on_event(&self, kind: WatchEventKind, path: &Path) {
        self(kind, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode};

    #[test]
    fn test_event_kind_mapping() {
        let cases = [
            (EventKind::Create(CreateKind::Folder), WatchEventKind::Created),
            (EventKind::Remove(RemoveKind::File), WatchEventKind::Deleted),
            (
                EventKind::Modify(ModifyKind::Data(DataChange::Content)),
                WatchEventKind::Modified,
            ),
            (EventKind::Modify(ModifyKind::Any), WatchEventKind::Modified),
            (
                EventKind::Modify(ModifyKind::Name(RenameMode::To)),
                WatchEventKind::Moved,
            ),
            (
                EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
                WatchEventKind::Attributes,
            ),
            (
                EventKind::Access(AccessKind::Close(AccessMode::Write)),
                WatchEventKind::ClosedWrite,
            ),
            (
                EventKind::Access(AccessKind::Open(AccessMode::Any)),
                WatchEventKind::Accessed,
            ),
            (EventKind::Other, WatchEventKind::Other),
        ];

        for (raw, expected) in cases {
            assert_eq!(WatchEventKind::from(&raw), expected, "{raw:?}");
        }
    }

    #[test]
    fn test_content_change_kinds() {
        assert!(WatchEventKind::Modified.is_content_change());
        assert!(WatchEventKind::ClosedWrite.is_content_change());
        assert!(!WatchEventKind::Deleted.is_content_change());
        assert!(!WatchEventKind::Attributes.is_content_change());
        assert!(!WatchEventKind::Accessed.is_content_change());
    }
}
