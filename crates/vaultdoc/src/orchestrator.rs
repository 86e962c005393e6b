//! Suite orchestrator.
//!
//! Runs the preflight, then every suite as its own process, sequentially. A
//! suite failure never stops its siblings; the run passes only when every
//! suite process exits zero.

use crate::preflight::{self, DependencyResolver, PreflightReport};
use crate::report;
use crate::suite::{read_report, SuiteId};
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use vaultdoc_protocol::SuiteResult;
use vaultdoc_runtime::{process, CommandSpec};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_SUITE_FAILURE: u8 = 1;
pub const EXIT_PREFLIGHT_FAILURE: u8 = 2;

/// Captured result of one suite process.
#[derive(Debug, Clone)]
pub struct SuiteRun {
    /// `None` when killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// Starts a suite in isolation and waits for it.
pub trait SuiteLauncher {
    fn launch(&self, suite: SuiteId, report_path: &Path) -> Result<SuiteRun>;
}

/// Launches suites by re-executing the current binary.
pub struct SelfExecLauncher {
    exe: PathBuf,
    /// Global flags forwarded to every suite (config path, interpreter)
    global_args: Vec<OsString>,
    timeout: Duration,
}

impl SelfExecLauncher {
    pub fn new(exe: PathBuf, global_args: Vec<OsString>, timeout: Duration) -> Self {
        Self {
            exe,
            global_args,
            timeout,
        }
    }

    pub fn current(global_args: Vec<OsString>, timeout: Duration) -> Result<Self> {
        let exe = std::env::current_exe().context("Failed to locate the vaultdoc executable")?;
        Ok(Self::new(exe, global_args, timeout))
    }

    fn command(&self, suite: SuiteId, report_path: &Path) -> CommandSpec {
        CommandSpec::new(&self.exe, self.timeout)
            .args(self.global_args.iter().cloned())
            .args(["suite", suite.as_str(), "--report"])
            .arg(report_path.as_os_str())
    }
}

impl SuiteLauncher for SelfExecLauncher {
    fn launch(&self, suite: SuiteId, report_path: &Path) -> Result<SuiteRun> {
        let spec = self.command(suite, report_path);
        info!("Launching suite {}: {}", suite, spec.display());
        let output = process::run(&spec)?;
        Ok(SuiteRun {
            exit_code: output.code(),
            stdout: output.stdout,
            stderr: output.stderr,
            elapsed: output.elapsed,
        })
    }
}

/// Per-suite line of the final summary.
#[derive(Debug, Clone)]
pub struct SuiteSummary {
    pub suite: SuiteId,
    pub passed: bool,
    /// Counts reported by the suite, when it got far enough to write them
    pub result: Option<SuiteResult>,
    /// Launch error or abnormal exit
    pub error: Option<String>,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub suites: Vec<SuiteSummary>,
}

impl RunSummary {
    pub fn passed_suites(&self) -> usize {
        self.suites.iter().filter(|s| s.passed).count()
    }

    pub fn total_suites(&self) -> usize {
        self.suites.len()
    }

    pub fn all_passed(&self) -> bool {
        self.suites.iter().all(|s| s.passed)
    }
}

#[derive(Debug)]
pub enum RunOutcome {
    /// Required dependencies missing; no suite was started
    PreflightFailed(PreflightReport),
    Completed(RunSummary),
}

impl RunOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::PreflightFailed(_) => EXIT_PREFLIGHT_FAILURE,
            RunOutcome::Completed(summary) if summary.all_passed() => EXIT_SUCCESS,
            RunOutcome::Completed(_) => EXIT_SUITE_FAILURE,
        }
    }
}

pub struct Orchestrator<'a> {
    resolver: &'a dyn DependencyResolver,
    launcher: &'a dyn SuiteLauncher,
}

impl<'a> Orchestrator<'a> {
    pub fn new(resolver: &'a dyn DependencyResolver, launcher: &'a dyn SuiteLauncher) -> Self {
        Self { resolver, launcher }
    }

    /// Run everything, writing the human report to `out`.
    pub fn run(
        &self,
        dependencies: &[String],
        virtual_env: Option<PathBuf>,
        out: &mut dyn Write,
    ) -> Result<RunOutcome> {
        report::write_run_header(out)?;

        let preflight = preflight::check(self.resolver, dependencies, virtual_env)?;
        report::write_preflight(out, &preflight)?;
        if let Err(err) = preflight.ensure_ready() {
            warn!("Preflight failed: {}", err);
            return Ok(RunOutcome::PreflightFailed(preflight));
        }

        report::write_plan(out, &SuiteId::ALL)?;

        let reports = tempfile::Builder::new()
            .prefix("vaultdoc-reports-")
            .tempdir()
            .context("Failed to create suite report directory")?;

        let mut summary = RunSummary::default();
        for suite in SuiteId::ALL {
            let report_path = reports.path().join(format!("{}.json", suite.as_str()));
            let entry = self.run_one(suite, &report_path, out)?;
            summary.suites.push(entry);
        }

        report::write_summary(out, &summary)?;
        Ok(RunOutcome::Completed(summary))
    }

    fn run_one(&self, suite: SuiteId, report_path: &Path, out: &mut dyn Write) -> Result<SuiteSummary> {
        writeln!(out, "\nRunning {} ({})...", suite.title(), suite.as_str())?;

        let entry = match self.launcher.launch(suite, report_path) {
            Ok(run) => {
                let passed = run.exit_code == Some(0);
                let result = read_report(report_path);
                report::write_suite_run(out, suite, passed, &run)?;
                let error = match (passed, run.exit_code) {
                    (true, _) => None,
                    (false, Some(code)) if result.is_none() => {
                        Some(format!("exited with {} before reporting", code))
                    }
                    (false, Some(_)) => None,
                    (false, None) => Some("terminated by signal".to_string()),
                };
                SuiteSummary {
                    suite,
                    passed,
                    result,
                    error,
                    elapsed: run.elapsed,
                }
            }
            Err(err) => {
                warn!("Suite {} could not run: {:#}", suite, err);
                writeln!(out, "FAIL {}: {:#}", suite.title(), err)?;
                SuiteSummary {
                    suite,
                    passed: false,
                    result: None,
                    error: Some(format!("{:#}", err)),
                    elapsed: Duration::ZERO,
                }
            }
        };
        Ok(entry)
    }
}
