//! Watch command - print raw events for a directory tree.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::Settings;
use crate::watcher::{RecursiveWatcher, WatchEventKind};

/// Run the watch command until Ctrl-C.
pub async fn run(dir: PathBuf, config: &Settings) -> anyhow::Result<()> {
    let watcher = RecursiveWatcher::builder()
        .handler(|kind: WatchEventKind, path: &Path| {
            println!("{kind:<12} {}", path.display());
        })
        .tick_ms(config.watcher.tick_ms)
        .start(&dir)
        .with_context(|| format!("Cannot watch {}", dir.display()))?;

    eprintln!(
        "Watching {} ({} directories). Press Ctrl-C to stop.",
        watcher.root().display(),
        watcher.watched_dirs().len()
    );
    for degraded in watcher.degraded_dirs() {
        eprintln!("  not watched: {}", degraded.display());
    }

    tokio::signal::ctrl_c()
        .await
        .context("Cannot listen for Ctrl-C")?;

    watcher.stop();
    eprintln!("Stopped.");
    Ok(())
}
