//! Status command - list what is currently cached.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use walkdir::WalkDir;

use crate::config::Settings;

#[derive(Debug, Serialize)]
pub struct CachedFile {
    /// Path relative to the cache root
    pub path: PathBuf,
    pub bytes: u64,
}

#[derive(Debug, Serialize)]
pub struct CacheStatus {
    pub cache_root: PathBuf,
    pub exists: bool,
    pub files: Vec<CachedFile>,
    pub total_bytes: u64,
}

/// Collect the files under `root`, sorted by path.
pub fn collect(root: &Path) -> anyhow::Result<CacheStatus> {
    let mut status = CacheStatus {
        cache_root: root.to_path_buf(),
        exists: root.is_dir(),
        files: Vec::new(),
        total_bytes: 0,
    };
    if !status.exists {
        return Ok(status);
    }

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Cannot walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
        let path = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();
        status.total_bytes += bytes;
        status.files.push(CachedFile { path, bytes });
    }
    Ok(status)
}

/// Run the status command.
pub fn run(json: bool, config: &Settings) -> anyhow::Result<()> {
    let status = collect(&config.cache_root)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("Cache root: {}", status.cache_root.display());
    if !status.exists {
        println!("(not created yet)");
        return Ok(());
    }
    for file in &status.files {
        println!("  {:>10}  {}", file.bytes, file.path.display());
    }
    println!(
        "{} file(s), {} bytes",
        status.files.len(),
        status.total_bytes
    );
    Ok(())
}
