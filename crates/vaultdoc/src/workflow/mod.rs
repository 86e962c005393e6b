//! Workflow script verifier.
//!
//! Runs each scenario in its own scratch directory, removed when the scenario
//! ends whatever the result. Steps within a scenario are strictly ordered: once
//! a step does not pass, the remaining steps are skipped as blocked.

pub mod scenarios;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info, warn};
use vaultdoc_protocol::{
    LayoutEntry, Postcondition, Program, Scenario, StepAction, TestOutcome, WorkflowStep,
};
use vaultdoc_runtime::{process, CommandOutput, CommandSpec, VenvLayout, DEFAULT_VENV_NAME};

/// External tools and limits for workflow steps.
#[derive(Debug, Clone)]
pub struct WorkflowTools {
    pub python: PathBuf,
    /// `None` when version control is unavailable
    pub git: Option<PathBuf>,
    pub command_timeout: Duration,
    pub install_timeout: Duration,
}

/// How a single step ended.
#[derive(Debug, Clone, PartialEq, Eq)]
enum StepVerdict {
    Passed,
    Failed(String),
    Skipped(String),
}

pub struct WorkflowVerifier {
    tools: WorkflowTools,
}

impl WorkflowVerifier {
    pub fn new(tools: WorkflowTools) -> Self {
        Self { tools }
    }

    /// Run a scenario in a fresh scratch directory.
    pub fn run_scenario(&self, scenario: &Scenario) -> Vec<TestOutcome> {
        let scratch = match tempfile::Builder::new().prefix("vaultdoc-").tempdir() {
            Ok(dir) => dir,
            Err(e) => {
                warn!("Cannot create scratch directory for {}: {}", scenario.name, e);
                return scenario
                    .steps
                    .iter()
                    .map(|step| {
                        TestOutcome::failed(
                            outcome_name(scenario, step),
                            format!("cannot create scratch directory: {}", e),
                        )
                    })
                    .collect();
            }
        };
        info!("Scenario '{}' in {}", scenario.name, scratch.path().display());
        let outcomes = self.run_in(scenario, scratch.path());
        close_scratch(scratch);
        outcomes
    }

    /// Run a scenario inside an existing directory.
    pub fn run_in(&self, scenario: &Scenario, dir: &Path) -> Vec<TestOutcome> {
        let mut outcomes = Vec::with_capacity(scenario.steps.len());
        let mut blocked_by: Option<String> = None;

        for step in &scenario.steps {
            let name = outcome_name(scenario, step);
            if let Some(blocker) = &blocked_by {
                outcomes.push(TestOutcome::skipped(name, format!("blocked by '{}'", blocker)));
                continue;
            }

            let outcome = match self.execute(step, dir) {
                StepVerdict::Passed => TestOutcome::passed(name),
                StepVerdict::Failed(detail) => {
                    warn!("Step '{}' failed: {}", step.name, detail);
                    blocked_by = Some(step.name.clone());
                    TestOutcome::failed(name, detail)
                }
                StepVerdict::Skipped(reason) => {
                    info!("Step '{}' skipped: {}", step.name, reason);
                    blocked_by = Some(step.name.clone());
                    TestOutcome::skipped(name, reason)
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    fn execute(&self, step: &WorkflowStep, dir: &Path) -> StepVerdict {
        let output = match &step.action {
            StepAction::Command {
                program,
                args,
                stdout_to,
                long_running,
            } => {
                let Some(executable) = self.program_path(*program, dir) else {
                    let reason = format!("{} not available", program.as_str());
                    return if step.optional_tool {
                        StepVerdict::Skipped(reason)
                    } else {
                        StepVerdict::Failed(reason)
                    };
                };
                let timeout = if *long_running {
                    self.tools.install_timeout
                } else {
                    self.tools.command_timeout
                };
                let mut spec = CommandSpec::new(executable, timeout)
                    .args(args.iter())
                    .current_dir(dir);
                if let Some(target) = stdout_to {
                    spec = spec.stdout_to(target.clone());
                }
                debug!("Step '{}': {}", step.name, spec.display());

                let output = match process::run(&spec) {
                    Ok(output) => output,
                    Err(e) => return StepVerdict::Failed(e.to_string()),
                };
                if output.code() != Some(step.expected_exit_code) {
                    return StepVerdict::Failed(format!(
                        "expected exit code {}, got {}",
                        step.expected_exit_code,
                        output.failure_summary()
                    ));
                }
                Some(output)
            }
            StepAction::WriteFile { path, contents } => {
                if let Err(e) = write_file(&dir.join(path), contents) {
                    return StepVerdict::Failed(format!("cannot write {}: {}", path.display(), e));
                }
                None
            }
            StepAction::Materialize { entries } => {
                if let Err(e) = materialize(dir, entries) {
                    return StepVerdict::Failed(format!("cannot create layout: {}", e));
                }
                None
            }
            StepAction::Inspect => None,
        };

        match check_postcondition(&step.postcondition, dir, output.as_ref()) {
            Ok(()) => StepVerdict::Passed,
            Err(detail) => StepVerdict::Failed(detail),
        }
    }

    fn program_path(&self, program: Program, dir: &Path) -> Option<PathBuf> {
        let layout = VenvLayout::new(dir.join(DEFAULT_VENV_NAME));
        match program {
            Program::HostPython => Some(self.tools.python.clone()),
            Program::EnvPython => Some(layout.interpreter()),
            Program::EnvInstaller => Some(layout.installer()),
            Program::Git => self.tools.git.clone(),
        }
    }
}

fn outcome_name(scenario: &Scenario, step: &WorkflowStep) -> String {
    format!("{}: {}", scenario.name, step.name)
}

fn close_scratch(scratch: TempDir) {
    let path = scratch.path().to_path_buf();
    if let Err(e) = scratch.close() {
        warn!("Failed to remove scratch directory {}: {}", path.display(), e);
    }
}

fn write_file(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

fn materialize(dir: &Path, entries: &[LayoutEntry]) -> std::io::Result<()> {
    for entry in entries {
        let path = dir.join(entry.path());
        if entry.is_dir() {
            fs::create_dir_all(&path)?;
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;
        }
    }
    Ok(())
}

/// `Err` carries the failure detail.
fn check_postcondition(
    postcondition: &Postcondition,
    dir: &Path,
    output: Option<&CommandOutput>,
) -> Result<(), String> {
    match postcondition {
        Postcondition::ExitStatus => Ok(()),
        Postcondition::PathsExist { paths } => {
            let missing: Vec<String> = paths
                .iter()
                .filter(|p| !dir.join(p).exists())
                .map(|p| p.display().to_string())
                .collect();
            if missing.is_empty() {
                Ok(())
            } else {
                Err(format!("missing: {}", missing.join(", ")))
            }
        }
        Postcondition::EnvLayoutExists { parts } => {
            let layout = VenvLayout::new(dir.join(DEFAULT_VENV_NAME));
            let missing = layout.missing(parts);
            if missing.is_empty() {
                Ok(())
            } else {
                Err(format!(
                    "missing: {}",
                    missing
                        .iter()
                        .map(|p| relative(dir, p))
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            }
        }
        Postcondition::StdoutContains { token } => {
            let stdout = captured(output)?;
            if stdout.contains(token.as_str()) {
                Ok(())
            } else {
                Err(format!("stdout does not contain '{}': {}", token, process::tail(stdout, 10)))
            }
        }
        Postcondition::StdoutExcludes { tokens } => {
            let stdout = captured(output)?;
            let present: Vec<&str> = tokens
                .iter()
                .map(String::as_str)
                .filter(|t| stdout.contains(t))
                .collect();
            if present.is_empty() {
                Ok(())
            } else {
                Err(format!(
                    "stdout mentions {}: {}",
                    present.join(", "),
                    process::tail(stdout, 10)
                ))
            }
        }
        Postcondition::FileContains { path, token } => {
            let content = fs::read_to_string(dir.join(path))
                .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
            if content.contains(token.as_str()) {
                Ok(())
            } else {
                Err(format!("{} does not contain '{}'", path.display(), token))
            }
        }
        Postcondition::LayoutPresent { entries } => {
            let wrong: Vec<&str> = entries
                .iter()
                .filter(|e| {
                    let path = dir.join(e.path());
                    if e.is_dir() {
                        !path.is_dir()
                    } else {
                        !path.is_file()
                    }
                })
                .map(|e| e.0.as_str())
                .collect();
            if wrong.is_empty() {
                Ok(())
            } else {
                Err(format!("missing or wrong kind: {}", wrong.join(", ")))
            }
        }
    }
}

fn captured(output: Option<&CommandOutput>) -> Result<&str, String> {
    output
        .map(|o| o.stdout.as_str())
        .ok_or_else(|| "step produced no output to inspect".to_string())
}

fn relative(base: &Path, path: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}
