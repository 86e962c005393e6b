//! Harness home and the files under it.

use std::path::PathBuf;

/// Resolve the harness home directory.
///
/// Priority:
/// 1) VAULTDOC_HOME
/// 2) the user's home directory
/// 3) ./.vaultdoc
pub fn vaultdoc_home() -> PathBuf {
    if let Some(override_path) = std::env::var_os("VAULTDOC_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".vaultdoc")
}

/// Default config file: ~/.vaultdoc/config.toml (never created)
pub fn default_config_path() -> PathBuf {
    vaultdoc_home().join("config.toml")
}

/// Log directory: ~/.vaultdoc/logs
pub fn logs_dir() -> PathBuf {
    vaultdoc_home().join("logs")
}
