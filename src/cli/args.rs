//! CLI argument parsing using clap.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

use crate::docio::DocumentRef;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Mirror remote documents into a local cache and keep them in sync
#[derive(Parser)]
#[command(
    name = "docsync",
    version = env!("CARGO_PKG_VERSION"),
    about = "Mirror remote documents into a local cache and keep them in sync",
    long_about = "Fetch documents into a local cache directory, watch the cache \
                  recursively, and write local edits back to their documents.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Cache root directory (overrides config)
    #[arg(long, global = true, env = "DOCSYNC_CACHE_ROOT")]
    pub cache_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Create .docsync/settings.toml
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration settings
    Config,

    /// Print every filesystem event under a directory until Ctrl-C
    Watch {
        /// Directory to watch recursively
        dir: PathBuf,
    },

    /// Fetch documents into the cache and write local edits back until Ctrl-C
    #[command(
        after_help = "Example:\n  docsync mirror notes.txt=file:///srv/docs/notes.txt reports/q3.md=q3.md"
    )]
    Mirror {
        /// Local path (relative to the cache root) and document reference
        #[arg(value_name = "PATH=REF", required = true, value_parser = parse_pair)]
        pairs: Vec<MirrorPair>,
    },

    /// Delete everything under the cache root
    Clear,

    /// List files currently in the cache root
    Status {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// One `PATH=REF` argument of `mirror`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorPair {
    pub path: PathBuf,
    pub doc: DocumentRef,
}

/// Split on the first `=`, so references may contain `=` themselves.
fn parse_pair(raw: &str) -> Result<MirrorPair, String> {
    let (path, doc) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected PATH=REF, got '{raw}'"))?;
    if path.is_empty() {
        return Err(format!("missing local path in '{raw}'"));
    }
    if doc.is_empty() {
        return Err(format!("missing document reference in '{raw}'"));
    }
    Ok(MirrorPair {
        path: PathBuf::from(path),
        doc: DocumentRef::new(doc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pair_splits_on_first_equals() {
        let pair = parse_pair("notes.txt=https://host/doc?id=7").unwrap();
        assert_eq!(pair.path, PathBuf::from("notes.txt"));
        assert_eq!(pair.doc.as_str(), "https://host/doc?id=7");
    }

    #[test]
    fn test_parse_pair_rejects_incomplete_input() {
        assert!(parse_pair("notes.txt").is_err());
        assert!(parse_pair("=file:///x").is_err());
        assert!(parse_pair("notes.txt=").is_err());
    }

    #[test]
    fn test_cli_parses_mirror_with_globals() {
        let cli = Cli::try_parse_from([
            "docsync",
            "--cache-root",
            "/tmp/mirror",
            "mirror",
            "a.txt=mem://a",
            "b/c.txt=mem://c",
        ])
        .unwrap();

        assert_eq!(cli.cache_root, Some(PathBuf::from("/tmp/mirror")));
        match cli.command {
            Commands::Mirror { pairs } => {
                assert_eq!(pairs.len(), 2);
                assert_eq!(pairs[1].path, PathBuf::from("b/c.txt"));
            }
            _ => panic!("expected mirror command"),
        }
    }

    #[test]
    fn test_mirror_requires_a_pair() {
        assert!(Cli::try_parse_from(["docsync", "mirror"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
