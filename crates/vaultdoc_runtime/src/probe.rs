//! SDK probe: reflection-based checks executed inside the Python interpreter.
//!
//! The probe script is embedded in the binary at compile time and passed to the
//! interpreter with `-c`. A batch of operations travels in one environment
//! variable (base64 JSON); the answer comes back as one marker-prefixed JSON
//! line on stdout, one result per operation, in request order. A single
//! interpreter start therefore covers a whole suite.

use crate::process::{self, CommandSpec, ProcessError};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use vaultdoc_protocol::CallShape;

/// Embedded probe source.
const PROBE_SOURCE: &str = include_str!("../shim/sdk_probe.py");

/// Environment variable carrying the encoded request
pub const PROBE_REQUEST_ENV: &str = "VAULTDOC_PROBE_REQUEST";

/// Prefix of the report line on stdout
pub const PROBE_MARKER: &str = "VAULTDOC_PROBE:";

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to encode probe request: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("probe exited with {code:?}: {stderr}")]
    Exited { code: Option<i32>, stderr: String },
    #[error("probe produced no report: {stderr}")]
    MissingReport { stderr: String },
    #[error("malformed probe report: {0}")]
    Decode(String),
    #[error("probe returned {got} results for {expected} operations")]
    Mismatch { expected: usize, got: usize },
}

/// One reflection operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ProbeOp {
    /// Import an arbitrary module
    Import { module: String },
    /// Report interpreter prefixes and version
    Interpreter,
    /// The client type resolves and is callable
    ClientType,
    /// Construct the client with these options
    Construct { kwargs: Map<String, Value> },
    /// Constructing with these options must raise
    Reject { kwargs: Map<String, Value> },
    /// Client member exists and is callable
    Callable { method: String },
    /// `module.name` is a subclass of builtin `base`
    Subclass {
        module: String,
        name: String,
        base: String,
    },
    /// Bind a call shape against the method signature without calling it
    Bind {
        method: String,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    },
    /// Call the SDK's own network listing. Performs network I/O.
    Networks,
}

impl ProbeOp {
    pub fn bind(method: &str, shape: &CallShape) -> Self {
        ProbeOp::Bind {
            method: method.to_string(),
            args: shape.args.clone(),
            kwargs: shape.kwargs.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeRequest {
    pub sdk_module: String,
    pub client_class: String,
    /// Options used for the shared client instance
    pub client_kwargs: Map<String, Value>,
    pub ops: Vec<ProbeOp>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProbeResult {
    pub ok: bool,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbeReport {
    pub sdk_available: bool,
    #[serde(default)]
    pub sdk_error: Option<String>,
    pub results: Vec<ProbeResult>,
}

/// Interpreter facts returned by [`ProbeOp::Interpreter`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InterpreterInfo {
    pub executable: String,
    pub prefix: String,
    pub base_prefix: String,
    pub real_prefix: bool,
    pub version: String,
}

impl ProbeResult {
    pub fn interpreter_info(&self) -> Option<InterpreterInfo> {
        serde_json::from_value(self.data.clone()).ok()
    }

    pub fn network_names(&self) -> Option<Vec<String>> {
        self.data
            .get("names")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Runs probe batches through one interpreter.
#[derive(Debug, Clone)]
pub struct SdkProbe {
    python: PathBuf,
    timeout: Duration,
    envs: Vec<(String, String)>,
}

impl SdkProbe {
    pub fn new(python: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            python: python.into(),
            timeout,
            envs: Vec::new(),
        }
    }

    /// Extra environment for the interpreter (e.g. `PYTHONPATH`)
    pub fn env(mut self, key: &str, value: impl Into<String>) -> Self {
        self.envs.push((key.to_string(), value.into()));
        self
    }

    pub fn python(&self) -> &Path {
        &self.python
    }

    pub fn run(&self, request: &ProbeRequest) -> Result<ProbeReport, ProbeError> {
        let encoded = general_purpose::STANDARD.encode(serde_json::to_vec(request)?);
        let mut spec = CommandSpec::new(&self.python, self.timeout)
            .arg("-c")
            .arg(PROBE_SOURCE)
            .env(PROBE_REQUEST_ENV, encoded);
        for (key, value) in &self.envs {
            spec = spec.env(key, value.clone());
        }

        info!(
            "Probing {} with {} operations via {}",
            request.sdk_module,
            request.ops.len(),
            self.python.display()
        );
        let output = process::run(&spec)?;
        if !output.success() {
            return Err(ProbeError::Exited {
                code: output.code(),
                stderr: process::tail(&output.stderr, 20),
            });
        }

        let report = parse_report(&output.stdout).ok_or_else(|| ProbeError::MissingReport {
            stderr: process::tail(&output.stderr, 20),
        })??;
        if report.results.len() != request.ops.len() {
            return Err(ProbeError::Mismatch {
                expected: request.ops.len(),
                got: report.results.len(),
            });
        }
        debug!(
            "Probe report: sdk_available={} results={}",
            report.sdk_available,
            report.results.len()
        );
        Ok(report)
    }
}

/// Find the last marker line. Anything the SDK prints at import time is ignored.
fn parse_report(stdout: &str) -> Option<Result<ProbeReport, ProbeError>> {
    stdout
        .lines()
        .rev()
        .find_map(|line| line.strip_prefix(PROBE_MARKER))
        .map(|json| serde_json::from_str(json).map_err(|e| ProbeError::Decode(e.to_string())))
}
