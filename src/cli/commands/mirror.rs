//! Mirror and clear commands.

use anyhow::{Context, bail};

use crate::cache::{SyncCache, TransferOutcome};
use crate::cli::MirrorPair;
use crate::config::Settings;
use crate::docio::FileDocumentIo;

fn open_cache(config: &Settings) -> anyhow::Result<SyncCache> {
    let storage_root = match &config.storage_root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };
    SyncCache::from_settings(config, FileDocumentIo::new(storage_root))
        .with_context(|| format!("Cannot open cache at {}", config.cache_root.display()))
}

/// Run the mirror command: fetch every pair, then sync until Ctrl-C.
pub async fn run(pairs: &[MirrorPair], config: &Settings) -> anyhow::Result<()> {
    let cache = open_cache(config)?;

    let mut fetched = 0;
    for pair in pairs {
        let outcome = cache.fetch_and_watch(pair.doc.clone(), &pair.path);
        match &outcome {
            TransferOutcome::Completed { bytes } => {
                fetched += 1;
                println!("  {} <- {} ({bytes} bytes)", pair.path.display(), pair.doc);
            }
            other => eprintln!("  {} <- {}: {other}", pair.path.display(), pair.doc),
        }
    }

    if fetched == 0 {
        bail!("No document could be fetched");
    }

    eprintln!(
        "Mirroring {fetched} of {} document(s) under {}. Press Ctrl-C to stop.",
        pairs.len(),
        cache.root().display()
    );

    tokio::signal::ctrl_c()
        .await
        .context("Cannot listen for Ctrl-C")?;

    // Edits still inside their debounce window are written back now
    for (path, outcome) in cache.flush_pending() {
        eprintln!("  {} -> {outcome}", path.display());
    }
    eprintln!("Stopped.");
    Ok(())
}

/// Run the clear command.
pub fn run_clear(config: &Settings) -> anyhow::Result<()> {
    // Opening the cache creates the root, so look before that
    if !config.cache_root.is_dir() {
        println!(
            "Cache root {} does not exist; nothing to clear",
            config.cache_root.display()
        );
        return Ok(());
    }

    let cache = open_cache(config)?;
    cache.clear();
    println!("Cleared {}", cache.root().display());
    Ok(())
}
