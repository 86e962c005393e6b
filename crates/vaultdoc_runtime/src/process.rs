//! Bounded subprocess execution.
//!
//! Every child gets a deadline covering both its exit and the end of its
//! output. Pipes are drained on background threads so a chatty child cannot
//! block on a full pipe while we poll for exit. On Unix each child leads its
//! own process group, so a timeout kills everything it started (venv, pip)
//! and not just the direct child. When the deadline passes the group is
//! killed, the child reaped, and the call fails with
//! [`ProcessError::TimedOut`]. There are no retries.

use std::ffi::OsString;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Poll interval while waiting for a child to exit
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} timed out after {}s and was killed", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },
    #[error("failed to open stdout target {}: {source}", .path.display())]
    Redirect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed while waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Where a child's stdout goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdoutTarget {
    Capture,
    /// Truncate/create the file and write stdout into it
    File(PathBuf),
}

/// A fully described subprocess invocation.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    pub envs: Vec<(String, String)>,
    pub stdout: StdoutTarget,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            envs: Vec::new(),
            stdout: StdoutTarget::Capture,
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: &str, value: impl Into<String>) -> Self {
        self.envs.push((key.to_string(), value.into()));
        self
    }

    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = StdoutTarget::File(path.into());
        self
    }

    /// `program arg1 arg2 ...` for logs and failure messages
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

/// Captured result of a finished child.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    /// Empty when stdout was redirected to a file
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Exit code, `None` when terminated by a signal
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    /// Short failure summary: exit code plus trimmed stderr
    pub fn failure_summary(&self) -> String {
        let code = self
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("exit code {}", code)
        } else {
            format!("exit code {}: {}", code, tail(stderr, 20))
        }
    }
}

/// Last `lines` lines of `text`
pub fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

/// Run a command to completion or until its deadline.
///
/// A timeout too large to represent as an instant means no deadline.
pub fn run(spec: &CommandSpec) -> Result<CommandOutput, ProcessError> {
    let program = spec.program.display().to_string();
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .stdin(Stdio::null())
        .stderr(Stdio::piped());

    if let Some(cwd) = &spec.cwd {
        cmd.current_dir(cwd);
    }
    for (key, value) in &spec.envs {
        cmd.env(key, value);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    match &spec.stdout {
        StdoutTarget::Capture => {
            cmd.stdout(Stdio::piped());
        }
        StdoutTarget::File(path) => {
            let target = resolve_target(spec.cwd.as_deref(), path);
            let file = File::create(&target).map_err(|source| ProcessError::Redirect {
                path: target.clone(),
                source,
            })?;
            cmd.stdout(Stdio::from(file));
        }
    }

    let started = Instant::now();
    let deadline = started.checked_add(spec.timeout);
    let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
        program: program.clone(),
        source,
    })?;
    debug!("Spawned {} (pid={})", spec.display(), child.id());

    let stdout_reader = child.stdout.take().map(drain);
    let stderr_reader = child.stderr.take().map(drain);

    let timed_out = || ProcessError::TimedOut {
        program: program.clone(),
        timeout: spec.timeout,
    };

    let status = match wait_with_deadline(&mut child, deadline) {
        Ok(Some(status)) => status,
        Ok(None) => {
            warn!(
                "{} exceeded {}s, killing process group {}",
                spec.display(),
                spec.timeout.as_secs(),
                child.id()
            );
            kill_and_reap(&mut child);
            // Readers are detached: they end once the killed group closes the pipes.
            return Err(timed_out());
        }
        Err(source) => {
            kill_and_reap(&mut child);
            return Err(ProcessError::Wait {
                program: program.clone(),
                source,
            });
        }
    };

    // A background grandchild may still hold the pipes open after the child exits.
    let (stdout, stderr) = match (
        collect(stdout_reader, deadline),
        collect(stderr_reader, deadline),
    ) {
        (Some(stdout), Some(stderr)) => (stdout, stderr),
        _ => {
            warn!(
                "{} exited but its output stayed open past {}s, killing process group {}",
                spec.display(),
                spec.timeout.as_secs(),
                child.id()
            );
            kill_group(&child);
            return Err(timed_out());
        }
    };

    let output = CommandOutput {
        status,
        stdout,
        stderr,
        elapsed: started.elapsed(),
    };
    debug!(
        "{} finished with {:?} in {:.2}s",
        spec.display(),
        output.code(),
        output.elapsed.as_secs_f64()
    );
    Ok(output)
}

fn resolve_target(cwd: Option<&Path>, path: &Path) -> PathBuf {
    match cwd {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// `None` when the pipe is still open at the deadline.
fn collect(reader: Option<Receiver<String>>, deadline: Option<Instant>) -> Option<String> {
    let Some(rx) = reader else {
        return Some(String::new());
    };
    let received = match deadline {
        Some(deadline) => rx.recv_timeout(deadline.saturating_duration_since(Instant::now())),
        None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
    };
    match received {
        Ok(text) => Some(text),
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
        Err(RecvTimeoutError::Timeout) => None,
    }
}

/// `Ok(None)` when the deadline passed before the child exited.
fn wait_with_deadline(
    child: &mut Child,
    deadline: Option<Instant>,
) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Ok(None);
        }
        std::thread::sleep(EXIT_POLL_INTERVAL);
    }
}

fn kill_and_reap(child: &mut Child) {
    kill_group(child);
    let _ = child.kill();
    let _ = child.wait();
}

/// SIGKILL the child's process group.
#[cfg(unix)]
fn kill_group(child: &Child) {
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        return;
    };
    // SAFETY: kill(2) with a negative pid signals the group the child leads.
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc != 0 {
        debug!("kill(-{}) failed: {}", pgid, std::io::Error::last_os_error());
    }
}

#[cfg(not(unix))]
fn kill_group(_child: &Child) {}
