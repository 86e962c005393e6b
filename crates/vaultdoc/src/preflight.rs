//! Environment preflight: required dependencies and isolation status.
//!
//! A missing dependency is fatal to the whole run. Not running isolated is
//! only advisory.

use anyhow::{Context, Result};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};
use vaultdoc_runtime::{InterpreterInfo, IsolationSignal, ProbeOp, ProbeRequest, SdkProbe};

#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("missing dependencies: {}", .missing.join(", "))]
    MissingDependencies { missing: Vec<String> },
}

/// Import outcome for one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyStatus {
    pub name: String,
    /// Import error, `None` when the import succeeded
    pub error: Option<String>,
}

impl DependencyStatus {
    pub fn available(name: &str) -> Self {
        Self {
            name: name.to_string(),
            error: None,
        }
    }

    pub fn missing(name: &str, error: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            error: Some(error.into()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.error.is_none()
    }
}

/// What a resolver found out about the interpreter.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// One entry per requested dependency, in request order
    pub statuses: Vec<DependencyStatus>,
    pub interpreter: Option<InterpreterInfo>,
}

/// Answers "is this dependency importable" for a target interpreter.
pub trait DependencyResolver {
    fn resolve(&self, dependencies: &[String]) -> Result<Resolution>;
}

/// Resolver that asks the host interpreter through the probe.
pub struct PythonResolver {
    probe: SdkProbe,
    sdk_module: String,
    client_class: String,
}

impl PythonResolver {
    pub fn new(probe: SdkProbe, sdk_module: &str, client_class: &str) -> Self {
        Self {
            probe,
            sdk_module: sdk_module.to_string(),
            client_class: client_class.to_string(),
        }
    }
}

impl DependencyResolver for PythonResolver {
    fn resolve(&self, dependencies: &[String]) -> Result<Resolution> {
        let mut ops = vec![ProbeOp::Interpreter];
        ops.extend(dependencies.iter().map(|module| ProbeOp::Import {
            module: module.clone(),
        }));
        let request = ProbeRequest {
            sdk_module: self.sdk_module.clone(),
            client_class: self.client_class.clone(),
            client_kwargs: Default::default(),
            ops,
        };
        let report = self
            .probe
            .run(&request)
            .with_context(|| format!("Failed to query {}", self.probe.python().display()))?;

        let mut results = report.results.into_iter();
        let interpreter = results.next().and_then(|r| r.interpreter_info());
        let statuses = dependencies
            .iter()
            .zip(results)
            .map(|(name, result)| {
                if result.ok {
                    DependencyStatus::available(name)
                } else {
                    DependencyStatus::missing(
                        name,
                        result.detail.unwrap_or_else(|| "import failed".to_string()),
                    )
                }
            })
            .collect();
        Ok(Resolution {
            statuses,
            interpreter,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PreflightReport {
    pub statuses: Vec<DependencyStatus>,
    pub isolation: IsolationSignal,
    pub interpreter: Option<InterpreterInfo>,
}

impl PreflightReport {
    pub fn missing(&self) -> Vec<String> {
        self.statuses
            .iter()
            .filter(|s| !s.is_available())
            .map(|s| s.name.clone())
            .collect()
    }

    pub fn is_isolated(&self) -> bool {
        self.isolation.is_isolated()
    }

    /// Fatal when any dependency is missing
    pub fn ensure_ready(&self) -> Result<(), PreflightError> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PreflightError::MissingDependencies { missing })
        }
    }
}

/// Run the preflight. `virtual_env` is the caller's `VIRTUAL_ENV` value,
/// passed in explicitly so the check does not read ambient state.
pub fn check(
    resolver: &dyn DependencyResolver,
    dependencies: &[String],
    virtual_env: Option<PathBuf>,
) -> Result<PreflightReport> {
    let resolution = resolver.resolve(dependencies)?;

    for status in &resolution.statuses {
        match &status.error {
            None => info!("Dependency {} is available", status.name),
            Some(err) => warn!("Dependency {} is missing: {}", status.name, err),
        }
    }

    let isolation = IsolationSignal {
        virtual_env,
        prefix: resolution.interpreter.as_ref().map(|i| i.prefix.clone()),
        base_prefix: resolution.interpreter.as_ref().map(|i| i.base_prefix.clone()),
        real_prefix: resolution
            .interpreter
            .as_ref()
            .map(|i| i.real_prefix)
            .unwrap_or(false),
    };
    if !isolation.is_isolated() {
        warn!("Not running inside an isolated environment");
    }

    Ok(PreflightReport {
        statuses: resolution.statuses,
        isolation,
        interpreter: resolution.interpreter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeResolver {
        installed: Vec<&'static str>,
        interpreter: Option<InterpreterInfo>,
    }

    impl DependencyResolver for FakeResolver {
        fn resolve(&self, dependencies: &[String]) -> Result<Resolution> {
            Ok(Resolution {
                statuses: dependencies
                    .iter()
                    .map(|d| {
                        if self.installed.iter().any(|i| *i == d.as_str()) {
                            DependencyStatus::available(d)
                        } else {
                            DependencyStatus::missing(d, "ModuleNotFoundError")
                        }
                    })
                    .collect(),
                interpreter: self.interpreter.clone(),
            })
        }
    }

    fn deps() -> Vec<String> {
        vec!["vaultsfyi".to_string(), "pytest".to_string()]
    }

    fn interpreter(prefix: &str, base: &str) -> InterpreterInfo {
        InterpreterInfo {
            executable: format!("{}/bin/python", prefix),
            prefix: prefix.to_string(),
            base_prefix: base.to_string(),
            real_prefix: false,
            version: "3.12.1".to_string(),
        }
    }

    #[test]
    fn test_missing_subset_is_reported_in_order() {
        let resolver = FakeResolver {
            installed: vec!["pytest"],
            interpreter: None,
        };
        let report = check(&resolver, &deps(), None).unwrap();
        assert_eq!(report.missing(), vec!["vaultsfyi"]);
        let err = report.ensure_ready().unwrap_err();
        assert_eq!(err.to_string(), "missing dependencies: vaultsfyi");
    }

    #[test]
    fn test_all_available_is_ready() {
        let resolver = FakeResolver {
            installed: vec!["vaultsfyi", "pytest"],
            interpreter: Some(interpreter("/work/venv", "/usr")),
        };
        let report = check(&resolver, &deps(), None).unwrap();
        assert!(report.ensure_ready().is_ok());
        assert!(report.is_isolated());
    }

    #[test]
    fn test_isolation_from_explicit_inputs() {
        let resolver = FakeResolver {
            installed: vec![],
            interpreter: Some(interpreter("/usr", "/usr")),
        };
        let report = check(&resolver, &[], None).unwrap();
        assert!(!report.is_isolated());

        let report = check(&resolver, &[], Some(PathBuf::from("/work/venv"))).unwrap();
        assert!(report.is_isolated());
    }

    #[test]
    fn test_no_dependencies_is_ready() {
        let resolver = FakeResolver {
            installed: vec![],
            interpreter: None,
        };
        let report = check(&resolver, &[], None).unwrap();
        assert!(report.missing().is_empty());
        assert!(report.ensure_ready().is_ok());
    }
}
