//! Layered configuration for the sync engine.
//!
//! Sources, lowest precedence first:
//! - Default values
//! - `.docsync/settings.toml` (found by walking up from the current directory)
//! - Environment variables
//! - CLI argument overrides (applied by the caller)
//!
//! # Environment Variables
//!
//! Environment variables are prefixed with `DOCSYNC_` and use double
//! underscores to separate nested levels:
//! - `DOCSYNC_WATCHER__DEBOUNCE_MS=50` sets `watcher.debounce_ms`
//! - `DOCSYNC_TRANSFER__BUFFER_SIZE=65536` sets `transfer.buffer_size`
//! - `DOCSYNC_CACHE_ROOT=/tmp/mirror` sets `cache_root`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Directory holding the settings file, relative to the workspace.
pub const CONFIG_DIR: &str = ".docsync";
/// Settings file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "settings.toml";
const ENV_PREFIX: &str = "DOCSYNC_";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory all mirrored files live under
    #[serde(default = "default_cache_root")]
    pub cache_root: PathBuf,

    /// Base directory for relative document references (file backend)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_root: Option<PathBuf>,

    /// Watcher and debounce settings
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Transfer settings
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct WatcherConfig {
    /// How long a modified file must be quiet before it is written back
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Interval at which the event thread flushes debounced work
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct TransferConfig {
    /// Buffer size for streamed copies, in bytes
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default level: error, warn, info, debug, trace
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_version() -> u32 {
    1
}
fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("docsync"))
        .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("cache"))
}
fn default_debounce_ms() -> u64 {
    200
}
fn default_tick_ms() -> u64 {
    50
}
fn default_buffer_size() -> usize {
    8192
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            cache_root: default_cache_root(),
            storage_root: None,
            watcher: WatcherConfig::default(),
            transfer: TransferConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            tick_ms: default_tick_ms(),
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from defaults, the workspace settings file and
    /// the environment.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file (plus defaults and env).
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref()).extract().map_err(Box::new)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            // Double underscore becomes a dot, single underscores stay
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
    }

    /// Find `.docsync/settings.toml` from the current directory upwards.
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .map(|ancestor| ancestor.join(CONFIG_DIR))
            .find(|dir| dir.is_dir())
            .map(|dir| dir.join(CONFIG_FILE))
    }

    /// Save the configuration as TOML, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Write a default settings file under `.docsync/` in the current
    /// directory.
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        Settings::default().save(&config_path)?;
        Ok(config_path)
    }
}
