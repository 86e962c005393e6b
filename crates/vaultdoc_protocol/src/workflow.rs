//! Workflow step model: documented shell and filesystem actions with postconditions.
//!
//! Paths are relative to the scenario's scratch directory. Programs are symbolic
//! so the same step list describes the workflow on every platform; the runtime
//! resolves them to concrete executables.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Symbolic executable used by a command step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Program {
    /// The host interpreter the harness was configured with
    HostPython,
    /// Interpreter inside the scenario's isolated environment
    EnvPython,
    /// Package installer inside the scenario's isolated environment
    EnvInstaller,
    /// Version-control tool
    Git,
}

impl Program {
    pub fn as_str(&self) -> &'static str {
        match self {
            Program::HostPython => "python",
            Program::EnvPython => "venv/python",
            Program::EnvInstaller => "venv/pip",
            Program::Git => "git",
        }
    }
}

/// A single entry of a materialized layout. Trailing `/` marks a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry(pub String);

impl LayoutEntry {
    pub fn is_dir(&self) -> bool {
        self.0.ends_with('/')
    }

    pub fn path(&self) -> PathBuf {
        PathBuf::from(self.0.trim_end_matches('/'))
    }
}

/// What a step does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum StepAction {
    /// Run a program. With `stdout_to` set, stdout is redirected into that file.
    Command {
        program: Program,
        args: Vec<String>,
        #[serde(default)]
        stdout_to: Option<PathBuf>,
        /// Use the long install timeout instead of the ordinary one
        #[serde(default)]
        long_running: bool,
    },
    /// Write a file with fixed contents
    WriteFile { path: PathBuf, contents: String },
    /// Create every entry of a layout (directories and empty files)
    Materialize { entries: Vec<LayoutEntry> },
    /// Nothing to execute; only the postcondition is evaluated
    Inspect,
}

/// Predicate evaluated after the action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "kebab-case")]
pub enum Postcondition {
    /// Exit status only
    ExitStatus,
    /// Every path exists
    PathsExist { paths: Vec<PathBuf> },
    /// Every path of the isolated environment layout exists
    EnvLayoutExists { parts: Vec<EnvPart> },
    /// Captured stdout contains the token
    StdoutContains { token: String },
    /// Captured stdout mentions none of the tokens
    StdoutExcludes { tokens: Vec<String> },
    /// File content contains the token
    FileContains { path: PathBuf, token: String },
    /// Every layout entry exists with the right kind
    LayoutPresent { entries: Vec<LayoutEntry> },
}

/// Platform-dependent parts of an isolated environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvPart {
    Root,
    Interpreter,
    Installer,
    ActivationScript,
}

/// A single documented shell or filesystem action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub name: String,
    pub action: StepAction,
    pub expected_exit_code: i32,
    pub postcondition: Postcondition,
    /// Environment failure skips the step instead of failing it (e.g. git missing)
    #[serde(default)]
    pub optional_tool: bool,
}

impl WorkflowStep {
    pub fn command(name: &str, program: Program, args: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            action: StepAction::Command {
                program,
                args: args.iter().map(|a| a.to_string()).collect(),
                stdout_to: None,
                long_running: false,
            },
            expected_exit_code: 0,
            postcondition: Postcondition::ExitStatus,
            optional_tool: false,
        }
    }

    pub fn write_file(name: &str, path: &str, contents: &str) -> Self {
        Self {
            name: name.to_string(),
            action: StepAction::WriteFile {
                path: PathBuf::from(path),
                contents: contents.to_string(),
            },
            expected_exit_code: 0,
            postcondition: Postcondition::PathsExist {
                paths: vec![PathBuf::from(path)],
            },
            optional_tool: false,
        }
    }

    pub fn materialize(name: &str, entries: &[&str]) -> Self {
        let entries: Vec<LayoutEntry> = entries.iter().map(|e| LayoutEntry(e.to_string())).collect();
        Self {
            name: name.to_string(),
            action: StepAction::Materialize {
                entries: entries.clone(),
            },
            expected_exit_code: 0,
            postcondition: Postcondition::LayoutPresent { entries },
            optional_tool: false,
        }
    }

    pub fn inspect(name: &str, postcondition: Postcondition) -> Self {
        Self {
            name: name.to_string(),
            action: StepAction::Inspect,
            expected_exit_code: 0,
            postcondition,
            optional_tool: false,
        }
    }

    pub fn expect(mut self, postcondition: Postcondition) -> Self {
        self.postcondition = postcondition;
        self
    }

    pub fn redirect_stdout(mut self, path: &str) -> Self {
        if let StepAction::Command { stdout_to, .. } = &mut self.action {
            *stdout_to = Some(PathBuf::from(path));
        }
        self
    }

    pub fn long_running(mut self) -> Self {
        if let StepAction::Command { long_running, .. } = &mut self.action {
            *long_running = true;
        }
        self
    }

    pub fn optional_tool(mut self) -> Self {
        self.optional_tool = true;
        self
    }
}

/// An ordered list of steps sharing one scratch directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub steps: Vec<WorkflowStep>,
}

impl Scenario {
    pub fn new(name: &str, steps: Vec<WorkflowStep>) -> Self {
        Self {
            name: name.to_string(),
            steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_entry_kind() {
        assert!(LayoutEntry("src/".to_string()).is_dir());
        assert!(!LayoutEntry("src/main.py".to_string()).is_dir());
        assert_eq!(LayoutEntry("venv/".to_string()).path(), PathBuf::from("venv"));
    }

    #[test]
    fn test_redirect_only_applies_to_commands() {
        let step = WorkflowStep::command("freeze", Program::EnvInstaller, &["freeze"])
            .redirect_stdout("requirements.txt");
        match step.action {
            StepAction::Command { stdout_to, .. } => {
                assert_eq!(stdout_to, Some(PathBuf::from("requirements.txt")))
            }
            other => panic!("unexpected action {:?}", other),
        }

        let write = WorkflowStep::write_file("ignore", ".gitignore", "venv/").redirect_stdout("x");
        assert!(matches!(write.action, StepAction::WriteFile { .. }));
    }
}
