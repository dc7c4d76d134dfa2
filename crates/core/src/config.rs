//! Settings file management
//!
//! Optional tool preferences stored in TOML at
//! `$SDIAG_CONFIG_DIR/config.toml` or `~/.config/sdiag/config.toml`.
//! Credentials never live here; they come from the environment.
//!
//! PROTECTED FILE: Changes to schema_version require migration support.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Current settings schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable that overrides the settings directory
pub const CONFIG_DIR_VAR: &str = "SDIAG_CONFIG_DIR";

/// Default local scratch directory, relative to the working directory
const DEFAULT_TEMP_DIR: &str = "temp-storage-test";

/// Default reachability probe timeout
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Default cache-control max-age sent with uploads
const DEFAULT_CACHE_CONTROL: &str = "3600";

/// Main settings structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Default settings
    #[serde(default)]
    pub defaults: Defaults,
}

/// Default values for tool behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Scratch directory for generated payloads and downloaded copies
    #[serde(default = "default_temp_dir")]
    pub temp_dir: String,

    /// Reachability probe timeout in seconds
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Cache-control max-age (seconds) sent with uploads
    #[serde(default = "default_cache_control")]
    pub cache_control: String,

    /// Color mode
    #[serde(default)]
    pub color: ColorMode,
}

/// When to color terminal output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Color when the terminal supports it
    #[default]
    Auto,
    /// Color even when output is not a terminal
    Always,
    Never,
}

fn default_temp_dir() -> String {
    DEFAULT_TEMP_DIR.to_string()
}

fn default_probe_timeout() -> u64 {
    DEFAULT_PROBE_TIMEOUT_SECS
}

fn default_cache_control() -> String {
    DEFAULT_CACHE_CONTROL.to_string()
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            probe_timeout_secs: default_probe_timeout(),
            cache_control: default_cache_control(),
            color: ColorMode::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
        }
    }
}

impl Settings {
    /// Probe timeout as a Duration
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.defaults.probe_timeout_secs)
    }

    /// Configured color mode
    pub fn color_mode(&self) -> ColorMode {
        self.defaults.color
    }
}

/// Loads the settings file
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default settings path
    pub fn new() -> Result<Self> {
        let config_dir = match std::env::var_os(CONFIG_DIR_VAR) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::config_dir()
                .ok_or_else(|| Error::Config("Could not determine config directory".into()))?
                .join("sdiag"),
        };
        Ok(Self {
            config_path: config_dir.join("config.toml"),
        })
    }

    /// Create a ConfigManager with a custom path (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the settings file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load settings from disk
    ///
    /// A missing file yields the defaults. Files written by a newer version
    /// are rejected rather than half-understood.
    pub fn load(&self) -> Result<Settings> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let mut settings: Settings = toml::from_str(&content)?;

        if settings.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Settings file version {} is newer than supported version {}. Please upgrade sdiag.",
                settings.schema_version, SCHEMA_VERSION
            )));
        }
        settings.schema_version = SCHEMA_VERSION;

        if settings.defaults.probe_timeout_secs == 0 {
            return Err(Error::Config("probe_timeout_secs must be at least 1".into()));
        }

        Ok(settings)
    }
}
