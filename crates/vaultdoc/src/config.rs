//! Harness configuration.
//!
//! Resolution order: CLI flags > environment variables > config file > defaults.
//! All paths are under ~/.vaultdoc/ unless `VAULTDOC_HOME` says otherwise.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use vaultdoc_protocol::catalog::{CLIENT_CLASS, SDK_MODULE, TEST_API_KEY};

pub use vaultdoc_protocol::paths::{default_config_path, vaultdoc_home};

pub const ENV_PYTHON: &str = "VAULTDOC_PYTHON";
pub const ENV_GIT: &str = "VAULTDOC_GIT";
pub const ENV_COMMAND_TIMEOUT: &str = "VAULTDOC_COMMAND_TIMEOUT_SECS";
pub const ENV_INSTALL_TIMEOUT: &str = "VAULTDOC_INSTALL_TIMEOUT_SECS";
pub const ENV_SUITE_TIMEOUT: &str = "VAULTDOC_SUITE_TIMEOUT_SECS";

/// Upper bound for every timeout setting: one day
pub const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Main configuration for a harness run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Host interpreter; discovered on PATH when unset
    #[serde(default)]
    pub python: Option<PathBuf>,

    /// Version-control tool; discovered on PATH when unset
    #[serde(default)]
    pub git: Option<PathBuf>,

    #[serde(default = "default_sdk_module")]
    pub sdk_module: String,

    #[serde(default = "default_client_class")]
    pub client_class: String,

    /// Credential used for structural checks. Never sent anywhere.
    #[serde(default = "default_test_api_key")]
    pub test_api_key: String,

    /// Modules that must import before any suite runs
    #[serde(default = "default_required_dependencies")]
    pub required_dependencies: Vec<String>,

    /// Known-good package for the install and freeze steps
    #[serde(default = "default_install_package")]
    pub install_package: String,

    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// Environment creation and package installs
    #[serde(default = "default_install_timeout")]
    pub install_timeout_secs: u64,

    /// One whole suite subprocess
    #[serde(default = "default_suite_timeout")]
    pub suite_timeout_secs: u64,

    /// Ask the SDK for the live network list (network I/O)
    #[serde(default)]
    pub live_networks: bool,
}

fn default_sdk_module() -> String {
    SDK_MODULE.to_string()
}

fn default_client_class() -> String {
    CLIENT_CLASS.to_string()
}

fn default_test_api_key() -> String {
    TEST_API_KEY.to_string()
}

fn default_required_dependencies() -> Vec<String> {
    vec![SDK_MODULE.to_string(), "pytest".to_string()]
}

fn default_install_package() -> String {
    "requests".to_string()
}

fn default_command_timeout() -> u64 {
    120
}

fn default_install_timeout() -> u64 {
    600
}

fn default_suite_timeout() -> u64 {
    1800
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            python: None,
            git: None,
            sdk_module: default_sdk_module(),
            client_class: default_client_class(),
            test_api_key: default_test_api_key(),
            required_dependencies: default_required_dependencies(),
            install_package: default_install_package(),
            command_timeout_secs: default_command_timeout(),
            install_timeout_secs: default_install_timeout(),
            suite_timeout_secs: default_suite_timeout(),
            live_networks: false,
        }
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub python: Option<PathBuf>,
    pub live_networks: bool,
}

impl HarnessConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Resolve the effective configuration from every layer.
    ///
    /// An explicit config path must exist; the default one is optional.
    pub fn resolve(
        overrides: &CliOverrides,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match &overrides.config_path {
            Some(path) => Self::load(path)?,
            None => {
                let path = default_config_path();
                if path.is_file() {
                    Self::load(&path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(env)?;

        if let Some(python) = &overrides.python {
            config.python = Some(python.clone());
        }
        if overrides.live_networks {
            config.live_networks = true;
        }

        config.validate()?;
        Ok(config)
    }

    /// Same as [`resolve`](Self::resolve) using the process environment
    pub fn from_process_env(overrides: &CliOverrides) -> Result<Self, ConfigError> {
        Self::resolve(overrides, &|key: &str| std::env::var(key).ok())
    }

    fn apply_env(&mut self, env: &dyn Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(python) = non_empty(env(ENV_PYTHON)) {
            self.python = Some(PathBuf::from(python));
        }
        if let Some(git) = non_empty(env(ENV_GIT)) {
            self.git = Some(PathBuf::from(git));
        }
        if let Some(raw) = non_empty(env(ENV_COMMAND_TIMEOUT)) {
            self.command_timeout_secs = parse_secs(ENV_COMMAND_TIMEOUT, &raw)?;
        }
        if let Some(raw) = non_empty(env(ENV_INSTALL_TIMEOUT)) {
            self.install_timeout_secs = parse_secs(ENV_INSTALL_TIMEOUT, &raw)?;
        }
        if let Some(raw) = non_empty(env(ENV_SUITE_TIMEOUT)) {
            self.suite_timeout_secs = parse_secs(ENV_SUITE_TIMEOUT, &raw)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("command_timeout_secs", self.command_timeout_secs),
            ("install_timeout_secs", self.install_timeout_secs),
            ("suite_timeout_secs", self.suite_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
            if value > MAX_TIMEOUT_SECS {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    reason: format!("must be at most {} seconds", MAX_TIMEOUT_SECS),
                });
            }
        }
        for (key, value) in [
            ("sdk_module", &self.sdk_module),
            ("client_class", &self.client_class),
            ("install_package", &self.install_package),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.clone(),
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn install_timeout(&self) -> Duration {
        Duration::from_secs(self.install_timeout_secs)
    }

    pub fn suite_timeout(&self) -> Duration {
        Duration::from_secs(self.suite_timeout_secs)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_secs(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::default();
        assert_eq!(config.sdk_module, "vaultsfyi");
        assert_eq!(config.client_class, "VaultsSdk");
        assert_eq!(config.test_api_key, "test_key");
        assert_eq!(config.required_dependencies, vec!["vaultsfyi", "pytest"]);
        assert_eq!(config.install_package, "requests");
        assert_eq!(config.command_timeout(), Duration::from_secs(120));
        assert_eq!(config.install_timeout(), Duration::from_secs(600));
        assert_eq!(config.suite_timeout(), Duration::from_secs(1800));
        assert!(!config.live_networks);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "install_package = \"six\"\ncommand_timeout_secs = 30\n");
        let config = HarnessConfig::load(&path).unwrap();
        assert_eq!(config.install_package, "six");
        assert_eq!(config.command_timeout_secs, 30);
        assert_eq!(config.sdk_module, "vaultsfyi");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "command_timeout_secs = \"soon\"\n");
        assert!(matches!(
            HarnessConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));

        let path = write_config(&dir, "no_such_key = 1\n");
        assert!(matches!(
            HarnessConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let overrides = CliOverrides {
            config_path: Some(dir.path().join("absent.toml")),
            ..Default::default()
        };
        let err = HarnessConfig::resolve(&overrides, &env_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_precedence_cli_over_env_over_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "python = \"/from/file\"\ngit = \"/file/git\"\nsuite_timeout_secs = 10\n",
        );
        let overrides = CliOverrides {
            config_path: Some(path),
            python: Some(PathBuf::from("/from/cli")),
            live_networks: false,
        };
        let env = env_from(&[
            (ENV_PYTHON, "/from/env"),
            (ENV_SUITE_TIMEOUT, "20"),
        ]);
        let config = HarnessConfig::resolve(&overrides, &env).unwrap();
        assert_eq!(config.python, Some(PathBuf::from("/from/cli")));
        assert_eq!(config.git, Some(PathBuf::from("/file/git")));
        assert_eq!(config.suite_timeout_secs, 20);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let dir = TempDir::new().unwrap();
        let overrides = CliOverrides {
            config_path: Some(write_config(&dir, "")),
            ..Default::default()
        };
        let err =
            HarnessConfig::resolve(&overrides, &env_from(&[(ENV_COMMAND_TIMEOUT, "0")])).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));

        let err = HarnessConfig::resolve(&overrides, &env_from(&[(ENV_INSTALL_TIMEOUT, "ten")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_oversized_timeout_rejected() {
        let dir = TempDir::new().unwrap();
        let overrides = CliOverrides {
            config_path: Some(write_config(&dir, "suite_timeout_secs = 86400\n")),
            ..Default::default()
        };
        let config = HarnessConfig::resolve(&overrides, &env_from(&[])).unwrap();
        assert_eq!(config.suite_timeout(), Duration::from_secs(MAX_TIMEOUT_SECS));

        let err = HarnessConfig::resolve(
            &overrides,
            &env_from(&[(ENV_COMMAND_TIMEOUT, "18446744073709551615")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("at most 86400 seconds"));
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let dir = TempDir::new().unwrap();
        let overrides = CliOverrides {
            config_path: Some(write_config(&dir, "")),
            ..Default::default()
        };
        let config =
            HarnessConfig::resolve(&overrides, &env_from(&[(ENV_PYTHON, "  ")])).unwrap();
        assert_eq!(config.python, None);
    }
}
