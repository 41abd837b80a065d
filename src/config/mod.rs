// SPDX-License-Identifier: MPL-2.0
//! This module handles the configuration of the catalog store, loaded from a
//! `settings.toml` file.
//!
//! # Configuration Sections
//!
//! - `[general]` - Requested UI language and the language of the source strings
//! - `[catalogs]` - Where catalog files are discovered and which entries are served
//!
//! # Path Resolution
//!
//! 1. Use `load_from_path()`/`save_to_path()` with explicit path
//! 2. Set `TSCAT_CONFIG_DIR` environment variable
//! 3. Falls back to platform-specific config directory
//!
//! # Examples
//!
//! ```no_run
//! use tscat::config;
//!
//! let (mut config, _warning) = config::load();
//! config.general.language = Some("bg".to_string());
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;

pub use defaults::*;

use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";

/// Locale selection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Requested UI language (e.g., "bg", "bg-BG"). `None` means use the OS locale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Language of the untranslated source strings.
    #[serde(default = "default_source_language")]
    pub source_language: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            language: None,
            source_language: default_source_language(),
        }
    }
}

/// Catalog discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {
    /// File name prefix of catalog files (`<prefix>_<locale>.ts`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Directories searched for catalog files, lowest priority first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directories: Vec<PathBuf>,

    /// Consult the catalogs embedded in the binary.
    #[serde(default = "default_bundled")]
    pub bundled: bool,

    /// Serve translations still marked `unfinished`.
    #[serde(default = "default_include_unfinished")]
    pub include_unfinished: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            prefix: None,
            directories: Vec::new(),
            bundled: DEFAULT_USE_BUNDLED,
            include_unfinished: DEFAULT_INCLUDE_UNFINISHED,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub catalogs: CatalogConfig,
}

fn default_source_language() -> String {
    DEFAULT_SOURCE_LANGUAGE.to_string()
}

fn default_bundled() -> bool {
    DEFAULT_USE_BUNDLED
}

fn default_include_unfinished() -> bool {
    DEFAULT_INCLUDE_UNFINISHED
}

fn get_config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    paths::get_config_dir_with_override(base_dir).map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

/// Loads the configuration from the default location.
///
/// Returns the configuration and an optional warning. A missing file yields
/// defaults without a warning; an unreadable or corrupt file yields defaults
/// with a warning describing the failure.
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = get_config_path_with_override(base_dir) {
        if path.exists() {
            match load_from_path(&path) {
                Ok(config) => return (config, None),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable settings");
                    return (Config::default(), Some(err.to_string()));
                }
            }
        }
    }
    (Config::default(), None)
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

pub fn save(config: &Config) -> Result<()> {
    save_with_override(config, None)
}

pub fn save_with_override(config: &Config, base_dir: Option<PathBuf>) -> Result<()> {
    if let Some(path) = get_config_path_with_override(base_dir) {
        return save_to_path(config, &path);
    }
    Ok(())
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}
