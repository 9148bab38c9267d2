//! Configuration for the `taskbell` CLI.
//!
//! Supports layered configuration with the following priority (highest
//! first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attributes)
//! 3. TOML config file (`~/.config/taskbell/config.toml`)
//! 4. Compiled defaults
//!
//! A missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::{Path, PathBuf};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// Could not determine the user's data directory for the task file.
    #[error("could not determine data directory (no HOME or XDG_DATA_HOME)")]
    NoDataDir,
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    storage: StorageFileConfig,
    runtime: RuntimeFileConfig,
}

/// `[storage]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StorageFileConfig {
    data_file: Option<PathBuf>,
}

/// `[runtime]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct RuntimeFileConfig {
    alarm_buffer: Option<usize>,
    log_level: Option<String>,
    log_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Default capacity of the fired-alarm channel.
const DEFAULT_ALARM_BUFFER: usize = 64;

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the JSON task document.
    pub data_file: PathBuf,
    /// Capacity of the fired-alarm channel.
    pub alarm_buffer: usize,
    /// Log level filter (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log file for watch mode; `None` logs to stderr.
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration by merging CLI args and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an
    /// error. If no `--config` is given, the default path
    /// (`~/.config/taskbell/config.toml`) is tried and silently ignored
    /// if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or
    /// parsed, or if no data file location can be determined.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Self::resolve(cli, &file)
    }

    /// Resolve a `Config` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default. Separated from `load()` to enable
    /// unit testing without touching the filesystem.
    fn resolve(cli: &Cli, file: &ConfigFile) -> Result<Self, ConfigError> {
        let data_file = cli
            .data_file
            .clone()
            .or_else(|| file.storage.data_file.clone())
            .map_or_else(default_data_file, Ok)?;

        Ok(Self {
            data_file,
            alarm_buffer: file.runtime.alarm_buffer.unwrap_or(DEFAULT_ALARM_BUFFER),
            log_level: cli
                .log_level
                .clone()
                .or_else(|| file.runtime.log_level.clone())
                .unwrap_or_else(|| "info".to_string()),
            log_file: cli
                .log_file
                .clone()
                .or_else(|| file.runtime.log_file.clone()),
        })
    }
}

/// Default task document location: `<data dir>/taskbell/tasks.json`.
fn default_data_file() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|dir| dir.join("taskbell").join("tasks.json"))
        .ok_or(ConfigError::NoDataDir)
}

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and a missing
/// file is treated as empty config.
fn load_config_file(explicit_path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            // No config dir available; fall back to defaults.
            return Ok(ConfigFile::default());
        };
        config_dir.join("taskbell").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}

// ---------------------------------------------------------------------------
// CLI surface
// ---------------------------------------------------------------------------

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Task list with one-shot reminder notifications")]
pub struct Cli {
    /// The command to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to config file (default: `~/.config/taskbell/config.toml`).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the JSON task document.
    #[arg(long, global = true, env = "TASKBELL_DATA")]
    pub data_file: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, global = true, env = "TASKBELL_LOG")]
    pub log_level: Option<String>,

    /// Path to log file (watch mode logs to a file so notification
    /// output stays clean).
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

/// The taskbell subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Add a task, optionally as a reminder.
    Add {
        /// Task title.
        title: String,
        /// Create a reminder task (requires `--at`).
        #[arg(long)]
        reminder: bool,
        /// Reminder instant, local time (`2026-08-06 18:30` or with
        /// seconds). Implies `--reminder`.
        #[arg(long, value_name = "WHEN")]
        at: Option<String>,
    },
    /// List all tasks.
    List,
    /// Remove a task by id.
    Remove {
        /// Id of the task to remove, as printed by `list`.
        id: String,
    },
    /// Run the reminder scheduler in the foreground until interrupted.
    Watch,
}
