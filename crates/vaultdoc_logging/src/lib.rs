//! Shared logging setup for the vaultdoc binary and its suite subprocesses.
//!
//! Every process writes its own log file under `<home>/logs`: the
//! orchestrator and one-shot commands use `vaultdoc.log`, each suite process
//! `suite-<name>.log`. A file holds one run; opening it shifts the previous
//! runs to `.1`, `.2`, ... and drops the oldest. A run that outgrows the size
//! cap stops logging to the file after a single marker line.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use vaultdoc_protocol::paths::logs_dir;

const DEFAULT_LOG_FILTER: &str = "vaultdoc=info,vaultdoc_runtime=info";
const VERBOSE_LOG_FILTER: &str = "vaultdoc=debug,vaultdoc_runtime=debug";
/// Previous runs kept per process name
const KEPT_RUNS: usize = 5;
const MAX_RUN_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Logging configuration.
pub struct LogConfig<'a> {
    /// Log file stem, e.g. `vaultdoc` or `suite-imports`
    pub process_name: &'a str,
    /// Console shows debug output
    pub verbose: bool,
    /// Console shows warnings only (suite subprocesses)
    pub quiet: bool,
}

/// Initialize tracing with a per-process run log and stderr output.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let log_dir = ensure_logs_dir()?;
    let run_log = RunLog::open(&log_dir, config.process_name, KEPT_RUNS, MAX_RUN_LOG_BYTES)
        .with_context(|| format!("Failed to open run log for {}", config.process_name))?;
    let file_writer = SharedRunLog(Arc::new(Mutex::new(run_log)));

    let file_filter = if config.verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        env_or_default()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(console_filter(config.verbose, config.quiet)),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

/// Console-only fallback when the log directory is unusable.
pub fn init_console_logging(verbose: bool, quiet: bool) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(console_filter(verbose, quiet))
        .try_init();
}

fn console_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if quiet {
        EnvFilter::new("warn")
    } else if verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        env_or_default()
    }
}

fn env_or_default() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Ensure the logs directory exists.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir();
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

/// Log file of the current run.
struct RunLog {
    file: File,
    written: u64,
    limit: u64,
    capped: bool,
}

impl RunLog {
    fn open(dir: &Path, process_name: &str, kept_runs: usize, limit: u64) -> io::Result<Self> {
        let stem = sanitize_name(process_name);
        shift_previous_runs(dir, &stem, kept_runs)?;
        let file = File::create(dir.join(format!("{}.log", stem)))?;
        Ok(Self {
            file,
            written: 0,
            limit,
            capped: false,
        })
    }
}

/// `stem.log` becomes `stem.log.1`, `.1` becomes `.2`, ... up to `kept_runs`.
fn shift_previous_runs(dir: &Path, stem: &str, kept_runs: usize) -> io::Result<()> {
    let previous = |n: usize| dir.join(format!("{}.log.{}", stem, n));
    if kept_runs == 0 {
        return Ok(());
    }
    let oldest = previous(kept_runs);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }
    for n in (1..kept_runs).rev() {
        let src = previous(n);
        if src.exists() {
            fs::rename(&src, previous(n + 1))?;
        }
    }
    let current = dir.join(format!("{}.log", stem));
    if current.exists() {
        fs::rename(&current, previous(1))?;
    }
    Ok(())
}

impl Write for RunLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.capped {
            return Ok(buf.len());
        }
        if self.written + buf.len() as u64 > self.limit {
            self.capped = true;
            writeln!(self.file, "-- log size cap of {} bytes reached, further output dropped --", self.limit)?;
            return Ok(buf.len());
        }
        self.file.write_all(buf)?;
        self.written += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[derive(Clone)]
struct SharedRunLog(Arc<Mutex<RunLog>>);

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedRunLog {
    type Writer = SharedRunLog;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for SharedRunLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "run log lock poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "run log lock poisoned"))?
            .flush()
    }
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("vaultdoc"), "vaultdoc");
        assert_eq!(sanitize_name("suite-venv setup"), "suite-venv_setup");
    }

    #[test]
    fn test_logs_live_under_harness_home() {
        assert_eq!(logs_dir(), vaultdoc_protocol::paths::vaultdoc_home().join("logs"));
    }

    #[test]
    fn test_each_run_gets_a_fresh_file() {
        let dir = TempDir::new().unwrap();
        for run in 0..4 {
            let mut log = RunLog::open(dir.path(), "suite-imports", 2, 1024).unwrap();
            writeln!(log, "run {}", run).unwrap();
            log.flush().unwrap();
        }
        let read = |name: &str| fs::read_to_string(dir.path().join(name)).unwrap();
        assert_eq!(read("suite-imports.log"), "run 3\n");
        assert_eq!(read("suite-imports.log.1"), "run 2\n");
        assert_eq!(read("suite-imports.log.2"), "run 1\n");
        assert!(!dir.path().join("suite-imports.log.3").exists());
    }

    #[test]
    fn test_processes_do_not_share_files() {
        let dir = TempDir::new().unwrap();
        let mut parent = RunLog::open(dir.path(), "vaultdoc", 5, 1024).unwrap();
        let mut suite = RunLog::open(dir.path(), "suite-parameters", 5, 1024).unwrap();
        parent.write_all(b"orchestrator\n").unwrap();
        suite.write_all(b"suite\n").unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("vaultdoc.log")).unwrap(), "orchestrator\n");
        assert_eq!(fs::read_to_string(dir.path().join("suite-parameters.log")).unwrap(), "suite\n");
    }

    #[test]
    fn test_size_cap_drops_overflow_once() {
        let dir = TempDir::new().unwrap();
        let mut log = RunLog::open(dir.path(), "vaultdoc", 5, 16).unwrap();
        log.write_all(b"0123456789\n").unwrap();
        log.write_all(b"0123456789\n").unwrap();
        log.write_all(b"0123456789\n").unwrap();
        log.flush().unwrap();
        let content = fs::read_to_string(dir.path().join("vaultdoc.log")).unwrap();
        assert!(content.starts_with("0123456789\n-- log size cap of 16 bytes reached"));
        assert_eq!(content.lines().count(), 2);
    }
}
