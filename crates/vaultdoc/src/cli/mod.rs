//! Command implementations for the `vaultdoc` binary.

pub mod error;
pub mod facts;
pub mod preflight;
pub mod run;
pub mod suite;

use anyhow::Result;
use error::HelpfulError;
use std::path::{Path, PathBuf};
use tracing::debug;
use vaultdoc::config::default_config_path;
use vaultdoc::{CliOverrides, HarnessConfig, PythonResolver};
use vaultdoc_runtime::{resolve_python, SdkProbe, ToolCheck};

/// Resolved settings shared by every command that touches Python.
pub struct Context {
    pub config: HarnessConfig,
    pub config_path: Option<PathBuf>,
    pub python: ToolCheck,
}

impl Context {
    pub fn load(overrides: &CliOverrides) -> Result<Self> {
        let config = HarnessConfig::from_process_env(overrides).map_err(|err| {
            let path = overrides
                .config_path
                .clone()
                .unwrap_or_else(default_config_path);
            HelpfulError::invalid_config(&path, &err.to_string())
        })?;

        let python = resolve_python(config.python.as_deref(), config.command_timeout())
            .map_err(|err| HelpfulError::python_not_found(&err.to_string()))?;
        debug!("Using {} ({})", python.path.display(), python.version);

        Ok(Self {
            config,
            config_path: overrides.config_path.clone(),
            python,
        })
    }

    pub fn python(&self) -> &Path {
        &self.python.path
    }

    pub fn resolver(&self) -> PythonResolver {
        PythonResolver::new(
            SdkProbe::new(self.python(), self.config.command_timeout()),
            &self.config.sdk_module,
            &self.config.client_class,
        )
    }
}

/// `VIRTUAL_ENV` of the invoking shell
pub fn virtual_env() -> Option<PathBuf> {
    std::env::var_os("VIRTUAL_ENV")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
