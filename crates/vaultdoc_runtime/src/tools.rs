//! Discovery of the external tools the harness drives: the host Python
//! interpreter and the version-control tool.

use crate::process::{self, CommandSpec};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const PYTHON_CANDIDATES: [&str; 2] = ["python3", "python"];

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{tool} not available ({})", .notes.join("; "))]
    NotFound { tool: String, notes: Vec<String> },
}

/// A resolved tool plus what was tried on the way.
#[derive(Debug, Clone)]
pub struct ToolCheck {
    pub path: PathBuf,
    pub version: String,
    pub notes: Vec<String>,
}

/// Resolve the host interpreter. An explicit path wins; otherwise the first
/// candidate on PATH that answers `--version` within `timeout`.
pub fn resolve_python(explicit: Option<&Path>, timeout: Duration) -> Result<ToolCheck, ToolError> {
    match explicit {
        Some(path) => resolve_from(&[path.to_path_buf()], "python", timeout),
        None => {
            let mut notes = Vec::new();
            let mut found = Vec::new();
            for candidate in PYTHON_CANDIDATES {
                match which::which(candidate) {
                    Ok(path) => found.push(path),
                    Err(err) => notes.push(format!("{candidate} not on PATH: {err}")),
                }
            }
            resolve_from(&found, "python", timeout).map_err(|err| match err {
                ToolError::NotFound { tool, notes: more } => {
                    notes.extend(more);
                    ToolError::NotFound { tool, notes }
                }
            })
        }
    }
}

/// Resolve the version-control tool. `None` means the tool is unavailable,
/// which callers treat as a reason to skip rather than fail.
pub fn resolve_git(explicit: Option<&Path>, timeout: Duration) -> Option<ToolCheck> {
    let candidates = match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => which::which("git").into_iter().collect(),
    };
    match resolve_from(&candidates, "git", timeout) {
        Ok(check) => Some(check),
        Err(err) => {
            debug!("git unavailable: {}", err);
            None
        }
    }
}

fn resolve_from(candidates: &[PathBuf], tool: &str, timeout: Duration) -> Result<ToolCheck, ToolError> {
    let mut notes = Vec::new();
    for candidate in candidates {
        let spec = CommandSpec::new(candidate, timeout).arg("--version");
        match process::run(&spec) {
            Ok(output) if output.success() => {
                // Old Python 2 builds print the version on stderr
                let raw = if output.stdout.trim().is_empty() {
                    output.stderr
                } else {
                    output.stdout
                };
                let version = raw.trim().to_string();
                debug!("Resolved {} at {} ({})", tool, candidate.display(), version);
                return Ok(ToolCheck {
                    path: candidate.clone(),
                    version,
                    notes,
                });
            }
            Ok(output) => notes.push(format!(
                "{} returned {}",
                candidate.display(),
                output.failure_summary()
            )),
            Err(err) => notes.push(format!("{} unavailable: {err}", candidate.display())),
        }
    }
    if candidates.is_empty() {
        notes.push("no candidates".to_string());
    }
    Err(ToolError::NotFound {
        tool: tool.to_string(),
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(10);

    #[test]
    fn test_explicit_missing_python_is_not_found() {
        let err = resolve_python(Some(Path::new("/no/such/python")), TIMEOUT).unwrap_err();
        let ToolError::NotFound { tool, notes } = err;
        assert_eq!(tool, "python");
        assert!(notes.iter().any(|n| n.contains("/no/such/python")));
    }

    #[test]
    fn test_explicit_missing_git_is_none() {
        assert!(resolve_git(Some(Path::new("/no/such/git")), TIMEOUT).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_hanging_version_check_is_bounded() {
        let dir = tempfile::TempDir::new().unwrap();
        let fake = dir.path().join("git");
        std::fs::write(&fake, "#!/bin/sh\nsleep 30\n").unwrap();
        let mut perms = std::fs::metadata(&fake).unwrap().permissions();
        std::os::unix::fs::PermissionsExt::set_mode(&mut perms, 0o755);
        std::fs::set_permissions(&fake, perms).unwrap();

        let started = std::time::Instant::now();
        assert!(resolve_git(Some(&fake), Duration::from_millis(300)).is_none());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_not_found_message_lists_notes() {
        let err = ToolError::NotFound {
            tool: "git".to_string(),
            notes: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "git not available (a; b)");
    }
}
