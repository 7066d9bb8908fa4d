//! Configuration loading and management.

use std::path::{Path, PathBuf};

use chrono::{Datelike, Local};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
///
/// Passed explicitly into every command; nothing reads it from global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Default leave table, used when `--file` is omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_source: Option<PathBuf>,

    /// Default punch table, used when `--file` is omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub punch_source: Option<PathBuf>,

    /// Reporting year when `--year` is omitted.
    pub year: i32,

    /// Field delimiter. Sniffed from the header line when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            leave_source: None,
            punch_source: None,
            year: Local::now().year(),
            delimiter: None,
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (RH_*)
        figment = figment.merge(Env::prefixed("RH_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for rh.
///
/// On Linux: `~/.config/rh`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("rh"))
}
