//! Process-level plumbing for the documentation conformance harness.
//!
//! - [`process`]: bounded subprocess execution with a kill-on-timeout policy
//! - [`tools`]: host interpreter and version-control discovery
//! - [`venv`]: isolated-environment layout and isolation detection
//! - [`probe`]: the embedded Python probe that inspects the SDK surface
//!
//! All I/O is synchronous.

pub mod probe;
pub mod process;
pub mod tools;
pub mod venv;

pub use probe::{InterpreterInfo, ProbeError, ProbeOp, ProbeReport, ProbeRequest, ProbeResult, SdkProbe};
pub use process::{CommandOutput, CommandSpec, ProcessError, StdoutTarget};
pub use tools::{resolve_git, resolve_python, ToolCheck, ToolError};
pub use venv::{IsolationSignal, VenvLayout, ACTIVATION_HINTS, DEFAULT_VENV_NAME};
