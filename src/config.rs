//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.paddock/config.toml` (user)
//! 3. `/etc/paddock/config.toml` (system)
//! 4. built-in defaults when no file exists
//!
//! Environment variables override file values:
//!
//! | variable                        | setting                     |
//! |---------------------------------|-----------------------------|
//! | `PADDOCK_CACHE_CAPACITY`        | `cache.capacity`            |
//! | `PADDOCK_SCHEDULE_TTL_SECS`     | `cache.schedule_ttl_secs`   |
//! | `PADDOCK_UPSTREAM_URL`          | `upstream.base_url`         |
//! | `PADDOCK_UPSTREAM_TIMEOUT_SECS` | `upstream.timeout_secs`     |
//! | `PADDOCK_WORKERS`               | `upstream.workers`          |

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::providers::http::DEFAULT_BASE_URL;
use crate::{PaddockError, Result};

/// Service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// Cache sizing.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Maximum sessions kept in memory (default: 6).
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Schedule time-to-live in seconds (default: 3600).
    #[serde(default = "default_schedule_ttl")]
    pub schedule_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            schedule_ttl_secs: default_schedule_ttl(),
        }
    }
}

fn default_capacity() -> usize {
    6
}

fn default_schedule_ttl() -> u64 {
    3600
}

/// Upstream provider and worker pool.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Race data API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Deadline for a single upstream call in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Upstream calls allowed in flight at once (default: 4).
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            workers: default_workers(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_workers() -> usize {
    4
}

impl Config {
    /// Load configuration from the standard locations, then apply
    /// environment overrides.
    ///
    /// An explicit path that does not exist is an error; a missing user or
    /// system file is not.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path)?,
            None => Config::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Parse a config file without applying environment overrides.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PaddockError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            PaddockError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Override settings from environment-style variables.
    ///
    /// `lookup` returns the value of a variable, if set.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup("PADDOCK_CACHE_CAPACITY") {
            self.cache.capacity = parse_env("PADDOCK_CACHE_CAPACITY", &v)?;
        }
        if let Some(v) = lookup("PADDOCK_SCHEDULE_TTL_SECS") {
            self.cache.schedule_ttl_secs = parse_env("PADDOCK_SCHEDULE_TTL_SECS", &v)?;
        }
        if let Some(v) = lookup("PADDOCK_UPSTREAM_URL") {
            self.upstream.base_url = v;
        }
        if let Some(v) = lookup("PADDOCK_UPSTREAM_TIMEOUT_SECS") {
            self.upstream.timeout_secs = parse_env("PADDOCK_UPSTREAM_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("PADDOCK_WORKERS") {
            self.upstream.workers = parse_env("PADDOCK_WORKERS", &v)?;
        }
        Ok(())
    }

    /// Resolve the config file path, if any.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(PaddockError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".paddock").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/paddock/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        PaddockError::Configuration(format!("{name} has invalid value {value:?}"))
    })
}
