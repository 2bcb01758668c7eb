//! Configuration for the flowq CLI.
//!
//! A TOML file under the platform config directory, overlaid by
//! `FLOWQ_`-prefixed environment variables, and translated into
//! `flowq_core::QueryConfig` for the engine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use flowq_core::QueryConfig;

/// Overrides the config file location when set.
pub const CONFIG_PATH_ENV: &str = "FLOWQ_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// CLI defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Engine tuning.
    #[serde(default)]
    pub query: QuerySection,
}

#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Snapshot file loaded when `--snapshot` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PathBuf>,

    /// Context queried when `--context` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            snapshot: None,
            context: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuerySection {
    /// Bounded wait for a live statistics sample, in milliseconds.
    #[serde(default = "default_live_stats_timeout_ms")]
    pub live_stats_timeout_ms: u64,

    #[serde(default = "default_average_window_secs")]
    pub default_average_window_secs: u32,

    #[serde(default = "default_max_concurrent_reads")]
    pub max_concurrent_reads: usize,
}

impl Default for QuerySection {
    fn default() -> Self {
        Self {
            live_stats_timeout_ms: default_live_stats_timeout_ms(),
            default_average_window_secs: default_average_window_secs(),
            max_concurrent_reads: default_max_concurrent_reads(),
        }
    }
}

fn default_live_stats_timeout_ms() -> u64 {
    u64::try_from(flowq_core::config::DEFAULT_LIVE_STATS_TIMEOUT.as_millis()).unwrap_or(10_000)
}
fn default_average_window_secs() -> u32 {
    flowq_core::model::DEFAULT_AVERAGE_WINDOW_SECS
}
fn default_max_concurrent_reads() -> usize {
    flowq_core::config::DEFAULT_MAX_CONCURRENT_READS
}

impl Config {
    /// Validate the query section into engine configuration.
    pub fn to_query_config(&self) -> Result<QueryConfig, ConfigError> {
        let q = &self.query;
        if q.live_stats_timeout_ms == 0 {
            return Err(ConfigError::Validation {
                field: "query.live_stats_timeout_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if q.default_average_window_secs == 0 {
            return Err(ConfigError::Validation {
                field: "query.default_average_window_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if q.max_concurrent_reads == 0 {
            return Err(ConfigError::Validation {
                field: "query.max_concurrent_reads".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(QueryConfig {
            live_stats_timeout: Duration::from_millis(q.live_stats_timeout_ms),
            default_average_window_secs: q.default_average_window_secs,
            max_concurrent_reads: q.max_concurrent_reads,
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `FLOWQ_CONFIG` if set, otherwise the
/// XDG / platform config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("dev", "flowq", "flowq").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("flowq");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + environment. A missing file contributes nothing.
///
/// Nested keys use a double underscore in the environment, e.g.
/// `FLOWQ_QUERY__MAX_CONCURRENT_READS=8`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("FLOWQ_").ignore(&["CONFIG"]).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_toml(cfg)?)?;
    Ok(())
}

/// The config as it would be written to disk.
pub fn to_toml(cfg: &Config) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(cfg)?)
}
