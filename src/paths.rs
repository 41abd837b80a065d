// SPDX-License-Identifier: MPL-2.0
//! Centralized path management for configuration and catalog directories.
//!
//! # Path Resolution Order
//!
//! Paths are resolved in the following priority order:
//! 1. **Explicit override** - parameter to `_with_override()` functions (for tests
//!    and for hosts that ship catalogs next to their binary)
//! 2. **Environment variables** (`TSCAT_CONFIG_DIR`, `TSCAT_CATALOG_DIR`)
//! 3. **Platform default** - via `dirs` crate
//!
//! The explicit override has highest priority because it's the most specific -
//! when code explicitly passes a path, it should always be respected.

use std::path::PathBuf;

/// Application name used for directory naming.
const APP_NAME: &str = "tscat";

/// Subdirectory of the data directory holding user-installed catalogs.
const CATALOG_SUBDIR: &str = "translations";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "TSCAT_CONFIG_DIR";

/// Environment variable to override the user catalog directory.
pub const ENV_CATALOG_DIR: &str = "TSCAT_CATALOG_DIR";

fn env_path(var: &str) -> Option<PathBuf> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Some(PathBuf::from(value)),
        _ => None,
    }
}

/// Returns the application config directory path.
///
/// This directory holds `settings.toml`.
///
/// # Resolution Order
///
/// 1. `TSCAT_CONFIG_DIR` environment variable (if set and non-empty)
/// 2. Platform-specific config directory:
///    - Linux: `~/.config/tscat/`
///    - macOS: `~/Library/Application Support/tscat/`
///    - Windows: `C:\Users\<User>\AppData\Roaming\tscat\`
///
/// Returns `None` if the config directory cannot be determined (rare edge case).
pub fn get_config_dir() -> Option<PathBuf> {
    get_config_dir_with_override(None)
}

/// Returns the config directory path with an optional override.
///
/// # Arguments
///
/// * `override_path` - Optional path to use instead of default. Takes highest priority.
pub fn get_config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path);
    }

    if let Some(path) = env_path(ENV_CONFIG_DIR) {
        return Some(path);
    }

    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path
    })
}

/// Returns the directory where user-installed catalogs are looked up.
///
/// # Resolution Order
///
/// 1. `TSCAT_CATALOG_DIR` environment variable (if set and non-empty)
/// 2. Platform data directory: `<data_dir>/tscat/translations/`
pub fn get_user_catalog_dir() -> Option<PathBuf> {
    get_user_catalog_dir_with_override(None)
}

/// Returns the user catalog directory with an optional override.
pub fn get_user_catalog_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path);
    }

    if let Some(path) = env_path(ENV_CATALOG_DIR) {
        return Some(path);
    }

    dirs::data_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CATALOG_SUBDIR);
        path
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to prevent parallel tests from interfering with each other's env vars
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn config_dir_contains_app_name() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::remove_var(ENV_CONFIG_DIR);

        if let Some(path) = get_config_dir() {
            assert!(
                path.to_string_lossy().contains(APP_NAME),
                "Config dir should contain app name"
            );
        }
    }

    #[test]
    fn user_catalog_dir_ends_with_translations() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::remove_var(ENV_CATALOG_DIR);

        if let Some(path) = get_user_catalog_dir() {
            assert!(path.ends_with(CATALOG_SUBDIR));
        }
    }

    #[test]
    fn override_path_takes_precedence_for_config_dir() {
        let override_path = PathBuf::from("/custom/config");
        let result = get_config_dir_with_override(Some(override_path.clone()));
        assert_eq!(result, Some(override_path));
    }

    #[test]
    fn env_var_overrides_default_catalog_dir() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::set_var(ENV_CATALOG_DIR, "/env/catalogs");

        let result = get_user_catalog_dir();
        assert_eq!(result, Some(PathBuf::from("/env/catalogs")));

        std::env::remove_var(ENV_CATALOG_DIR);
    }

    #[test]
    fn empty_env_var_uses_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::set_var(ENV_CONFIG_DIR, "");

        let result = get_config_dir();
        if let Some(path) = result {
            assert_ne!(path, PathBuf::from(""));
        }

        std::env::remove_var(ENV_CONFIG_DIR);
    }

    #[test]
    fn override_path_takes_precedence_over_env_var() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::set_var(ENV_CATALOG_DIR, "/env/path");

        let override_path = PathBuf::from("/override/path");
        let result = get_user_catalog_dir_with_override(Some(override_path.clone()));
        assert_eq!(result, Some(override_path));

        std::env::remove_var(ENV_CATALOG_DIR);
    }
}
