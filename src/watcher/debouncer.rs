//! Per-path debouncing of modification events.
//!
//! One save is often reported as several events (truncate, write, close).
//! Recording every event and only releasing a path once it has been quiet
//! for the configured duration turns that burst into a single write-back.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Debounces file change events by path.
#[derive(Debug)]
pub struct Debouncer {
    /// Pending changes: path -> last change timestamp.
    pending: HashMap<PathBuf, Instant>,
    /// How long a file must be quiet before it is released.
    duration: Duration,
}

impl Debouncer {
    /// Create a new debouncer with the given duration in milliseconds.
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            pending: HashMap::new(),
            duration: Duration::from_millis(debounce_ms),
        }
    }

    /// Record a change, restarting the quiet period for this path.
    pub fn record(&mut self, path: PathBuf) {
        self.pending.insert(path, Instant::now());
    }

    /// Forget a pending path (e.g. the file was deleted).
    pub fn remove(&mut self, path: &Path) {
        self.pending.remove(path);
    }

    /// Forget everything pending.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Take all paths that have been quiet for the debounce duration,
    /// sorted for deterministic processing order.
    pub fn take_ready(&mut self) -> Vec<PathBuf> {
        let now = Instant::now();
        let mut ready = Vec::new();

        self.pending.retain(|path, last_change| {
            if now.duration_since(*last_change) >= self.duration {
                ready.push(path.clone());
                false
            } else {
                true
            }
        });

        ready.sort();
        ready
    }

    /// Take every pending path regardless of age, sorted.
    pub fn take_all(&mut self) -> Vec<PathBuf> {
        let mut all: Vec<PathBuf> = self.pending.drain().map(|(path, _)| path).collect();
        all.sort();
        all
    }

    /// Check if there are any pending changes.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Get the number of pending changes.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_debouncer_basic() {
        let mut debouncer = Debouncer::new(50);

        let path = PathBuf::from("/cache/notes.txt");
        debouncer.record(path.clone());

        // Immediately after, nothing should be ready
        assert!(debouncer.take_ready().is_empty());
        assert!(debouncer.has_pending());

        sleep(Duration::from_millis(60));

        let ready = debouncer.take_ready();
        assert_eq!(ready, vec![path]);
        assert!(!debouncer.has_pending());
    }

    #[test]
    fn test_burst_collapses_to_one() {
        let mut debouncer = Debouncer::new(30);

        let path = PathBuf::from("/cache/notes.txt");
        for _ in 0..5 {
            debouncer.record(path.clone());
        }
        assert_eq!(debouncer.pending_count(), 1);

        sleep(Duration::from_millis(40));
        assert_eq!(debouncer.take_ready().len(), 1);
        assert!(debouncer.take_ready().is_empty());
    }

    #[test]
    fn test_debouncer_resets_on_new_change() {
        let mut debouncer = Debouncer::new(50);

        let path = PathBuf::from("/cache/notes.txt");
        debouncer.record(path.clone());
        sleep(Duration::from_millis(30));

        // Record again - restarts the quiet period
        debouncer.record(path.clone());
        sleep(Duration::from_millis(30));
        assert!(debouncer.take_ready().is_empty());

        sleep(Duration::from_millis(30));
        assert_eq!(debouncer.take_ready().len(), 1);
    }

    #[test]
    fn test_zero_duration_releases_immediately() {
        let mut debouncer = Debouncer::new(0);
        debouncer.record(PathBuf::from("/cache/b"));
        debouncer.record(PathBuf::from("/cache/a"));

        assert_eq!(
            debouncer.take_ready(),
            vec![PathBuf::from("/cache/a"), PathBuf::from("/cache/b")]
        );
    }

    #[test]
    fn test_debouncer_remove_and_clear() {
        let mut debouncer = Debouncer::new(50);

        let path = PathBuf::from("/cache/notes.txt");
        debouncer.record(path.clone());
        debouncer.remove(&path);
        assert!(!debouncer.has_pending());

        debouncer.record(path);
        debouncer.record(PathBuf::from("/cache/other.txt"));
        debouncer.clear();
        assert_eq!(debouncer.pending_count(), 0);
    }

    #[test]
    fn test_take_all_ignores_quiet_period() {
        let mut debouncer = Debouncer::new(60_000);
        debouncer.record(PathBuf::from("/cache/z"));
        debouncer.record(PathBuf::from("/cache/y"));

        assert!(debouncer.take_ready().is_empty());
        assert_eq!(
            debouncer.take_all(),
            vec![PathBuf::from("/cache/y"), PathBuf::from("/cache/z")]
        );
        assert!(!debouncer.has_pending());
    }
}
