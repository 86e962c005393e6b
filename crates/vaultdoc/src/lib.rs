//! vaultdoc: checks that the published vaults.fyi Python SDK documentation
//! still describes the installed SDK and the documented local workflow.

pub mod config;
pub mod conformance;
pub mod orchestrator;
pub mod preflight;
pub mod report;
pub mod suite;
pub mod workflow;

pub use config::{CliOverrides, ConfigError, HarnessConfig};
pub use orchestrator::{Orchestrator, RunOutcome, RunSummary, SelfExecLauncher, SuiteLauncher};
pub use preflight::{DependencyResolver, PreflightError, PreflightReport, PythonResolver};
pub use suite::SuiteId;
