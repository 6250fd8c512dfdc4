//! docsync command-line entry point.

use clap::Parser;

use docsync::cli::commands;
use docsync::cli::{Cli, Commands};
use docsync::config::Settings;
use docsync::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        eprintln!("Using default configuration.");
        Settings::default()
    });

    if let Some(root) = &cli.cache_root {
        config.cache_root = root.clone();
    }

    logging::init_with_config(&config.logging);

    let result = match cli.command {
        Commands::Init { force } => commands::init::run_init(force),
        Commands::Config => commands::init::run_config(&config),
        Commands::Watch { dir } => commands::watch::run(dir, &config).await,
        Commands::Mirror { pairs } => commands::mirror::run(&pairs, &config).await,
        Commands::Clear => commands::mirror::run_clear(&config),
        Commands::Status { json } => commands::status::run(json, &config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
