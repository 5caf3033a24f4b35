//! Cache settings: the configuration source read once when a proxy is built.
//!
//! Settings are loaded from TOML with the following resolution order:
//! 1. explicit path (if provided; must exist)
//! 2. `~/.repocache/config.toml` (user)
//! 3. `/etc/repocache/config.toml` (system)
//! 4. built-in defaults when no file is found
//!
//! Keys may sit at the document root or under a `[repository_cache]` table:
//!
//! ```toml
//! [repository_cache]
//! ttl = 5          # minutes
//! enabled = true
//! use_tags = true
//! debug = false
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{CacheError, Result};

/// Table name the settings may be nested under.
pub const SETTINGS_SECTION: &str = "repository_cache";

/// Global cache settings shared by every proxy built from them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheSettings {
    /// Entry time-to-live in minutes (default: 60).
    #[serde(default = "default_ttl_minutes")]
    pub ttl: u64,
    /// Whether caching is on at all (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Whether tag scoping and tag invalidation are used (default: true).
    /// When false, proxies ignore their declared tags and tag cleaners.
    #[serde(default = "default_true")]
    pub use_tags: bool,
    /// Emit trace-level decision logs (default: false).
    #[serde(default)]
    pub debug: bool,
    /// Whether "empty" results (null, false, 0, "", [], {}) are cached and
    /// served like any other value (default: true).
    #[serde(default = "default_true")]
    pub cache_empty: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: default_ttl_minutes(),
            enabled: true,
            use_tags: true,
            debug: false,
            cache_empty: true,
        }
    }
}

fn default_ttl_minutes() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

impl CacheSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the TTL in minutes.
    pub fn ttl_minutes(mut self, minutes: u64) -> Self {
        self.ttl = minutes;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn use_tags(mut self, use_tags: bool) -> Self {
        self.use_tags = use_tags;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn cache_empty(mut self, cache_empty: bool) -> Self {
        self.cache_empty = cache_empty;
        self
    }

    /// The TTL as a [`Duration`].
    pub fn ttl_duration(&self) -> Duration {
        Duration::from_secs(self.ttl.saturating_mul(60))
    }

    /// Parse settings from a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut table: toml::Table = toml::from_str(content).map_err(|e| {
            CacheError::Configuration(format!("Failed to parse cache settings: {e}"))
        })?;
        let section = match table.remove(SETTINGS_SECTION) {
            Some(toml::Value::Table(section)) => section,
            Some(_) => {
                return Err(CacheError::Configuration(format!(
                    "[{SETTINGS_SECTION}] must be a table"
                )));
            }
            None => table,
        };
        toml::Value::Table(section).try_into::<Self>().map_err(|e| {
            CacheError::Configuration(format!("Invalid cache settings: {e}"))
        })
    }

    /// Load settings from the standard locations, falling back to defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_settings_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CacheError::Configuration(format!("Failed to read settings file {path:?}: {e}"))
        })?;
        Self::from_toml_str(&content)
    }

    fn resolve_settings_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(CacheError::Configuration(format!(
                "Settings file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_settings = home.join(".repocache").join("config.toml");
            if user_settings.exists() {
                return Ok(Some(user_settings));
            }
        }

        let system_settings = PathBuf::from("/etc/repocache/config.toml");
        if system_settings.exists() {
            return Ok(Some(system_settings));
        }

        Ok(None)
    }
}
