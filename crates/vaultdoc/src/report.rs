//! Human-readable console report.
//!
//! Everything here writes to a caller-supplied `Write` so the orchestrator's
//! output can be captured in tests.

use crate::orchestrator::{RunSummary, SuiteRun};
use crate::preflight::PreflightReport;
use crate::suite::SuiteId;
use chrono::Local;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use std::io::{self, Write};
use std::time::Duration;
use vaultdoc_protocol::{OutcomeStatus, SuiteResult, TestOutcome};
use vaultdoc_runtime::ACTIVATION_HINTS;

const RULE: &str = "============================================================";

pub fn write_run_header(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "vaults.fyi SDK documentation checks")?;
    writeln!(out, "Started {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "{}", RULE)
}

/// Dependency lines plus the isolation advisory.
pub fn write_preflight(out: &mut dyn Write, report: &PreflightReport) -> io::Result<()> {
    writeln!(out, "\nChecking dependencies...")?;
    if let Some(info) = &report.interpreter {
        writeln!(out, "  interpreter: {} ({})", info.executable, info.version)?;
    }
    for status in &report.statuses {
        match &status.error {
            None => writeln!(out, "  ok       {}", status.name)?,
            Some(err) => writeln!(out, "  MISSING  {}: {}", status.name, first_line(err))?,
        }
    }

    let missing = report.missing();
    if !missing.is_empty() {
        writeln!(out, "\nMissing dependencies: {}", missing.join(", "))?;
        writeln!(out, "Install with: pip install {}", missing.join(" "))?;
    }

    if !report.is_isolated() {
        writeln!(out, "\nWARNING: not running inside a virtual environment.")?;
        writeln!(out, "Recommended setup:")?;
        for hint in ACTIVATION_HINTS {
            writeln!(out, "  {}", hint)?;
        }
    }
    Ok(())
}

pub fn write_plan(out: &mut dyn Write, suites: &[SuiteId]) -> io::Result<()> {
    writeln!(out, "\nTest plan:")?;
    for (i, suite) in suites.iter().enumerate() {
        writeln!(out, "  {}. {} ({})", i + 1, suite.title(), suite.as_str())?;
    }
    Ok(())
}

/// Pass/fail banner, with the captured streams when the suite failed.
pub fn write_suite_run(
    out: &mut dyn Write,
    suite: SuiteId,
    passed: bool,
    run: &SuiteRun,
) -> io::Result<()> {
    if passed {
        writeln!(out, "PASS {} ({})", suite.title(), format_elapsed(run.elapsed))?;
        return Ok(());
    }

    let code = run
        .exit_code
        .map(|c| c.to_string())
        .unwrap_or_else(|| "signal".to_string());
    writeln!(
        out,
        "FAIL {} (exit {}, {})",
        suite.title(),
        code,
        format_elapsed(run.elapsed)
    )?;
    if !run.stdout.trim().is_empty() {
        writeln!(out, "STDOUT:\n{}", run.stdout.trim_end())?;
    }
    if !run.stderr.trim().is_empty() {
        writeln!(out, "STDERR:\n{}", run.stderr.trim_end())?;
    }
    Ok(())
}

/// Summary line plus a per-suite table.
pub fn write_summary(out: &mut dyn Write, summary: &RunSummary) -> io::Result<()> {
    writeln!(out, "\n{}", RULE)?;
    writeln!(
        out,
        "{}/{} test suites passed",
        summary.passed_suites(),
        summary.total_suites()
    )?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        ["Suite", "Result", "Passed", "Failed", "Skipped", "Time"]
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );

    for entry in &summary.suites {
        let (label, color) = if entry.passed {
            ("PASS", Color::Green)
        } else {
            ("FAIL", Color::Red)
        };
        let counts = counts(entry.result.as_ref());
        table.add_row(vec![
            Cell::new(entry.suite.title()),
            Cell::new(label).fg(color),
            Cell::new(&counts[0]),
            Cell::new(&counts[1]),
            Cell::new(&counts[2]),
            Cell::new(format_elapsed(entry.elapsed)),
        ]);
    }
    writeln!(out, "{}", table)?;

    for entry in &summary.suites {
        if let Some(err) = &entry.error {
            writeln!(out, "{}: {}", entry.suite.title(), err)?;
        }
    }
    Ok(())
}

fn counts(result: Option<&SuiteResult>) -> [String; 3] {
    match result {
        Some(r) => [
            r.passed_count.to_string(),
            r.failed_count().to_string(),
            r.skipped_count.to_string(),
        ],
        None => ["-".to_string(), "-".to_string(), "-".to_string()],
    }
}

/// One line per outcome, as printed by a suite process.
pub fn write_outcomes(out: &mut dyn Write, outcomes: &[TestOutcome]) -> io::Result<()> {
    for outcome in outcomes {
        writeln!(out, "{}", outcome_line(outcome))?;
    }
    Ok(())
}

pub fn outcome_line(outcome: &TestOutcome) -> String {
    match (&outcome.status, &outcome.detail) {
        (_, None) => format!("{} {}", outcome.status.as_str(), outcome.name),
        (OutcomeStatus::Passed, Some(note)) => {
            format!("PASS {} ({})", outcome.name, first_line(note))
        }
        (status, Some(detail)) => {
            format!("{} {}: {}", status.as_str(), outcome.name, first_line(detail))
        }
    }
}

/// Suite footer: `<passed>/<total> checks passed`, plus skips when any.
pub fn write_suite_footer(out: &mut dyn Write, result: &SuiteResult) -> io::Result<()> {
    if result.skipped_count > 0 {
        writeln!(
            out,
            "\n{}/{} checks passed ({} skipped)",
            result.passed_count, result.total_count, result.skipped_count
        )
    } else {
        writeln!(out, "\n{}/{} checks passed", result.passed_count, result.total_count)
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 60.0 {
        format!("{}m{:02}s", elapsed.as_secs() / 60, elapsed.as_secs() % 60)
    } else {
        format!("{:.1}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::SuiteSummary;
    use crate::preflight::DependencyStatus;
    use std::path::PathBuf;
    use vaultdoc_runtime::IsolationSignal;

    fn render(f: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_outcome_lines() {
        assert_eq!(outcome_line(&TestOutcome::passed("a")), "PASS a");
        assert_eq!(
            outcome_line(&TestOutcome::failed("b", "missing\ntraceback")),
            "FAIL b: missing"
        );
        assert_eq!(
            outcome_line(&TestOutcome::skipped("c", "git not available")),
            "SKIP c: git not available"
        );
        assert_eq!(
            outcome_line(&TestOutcome::passed("d").with_detail("callable only")),
            "PASS d (callable only)"
        );
    }

    #[test]
    fn test_preflight_advisory_when_not_isolated() {
        let report = PreflightReport {
            statuses: vec![
                DependencyStatus::available("vaultsfyi"),
                DependencyStatus::missing("pytest", "ModuleNotFoundError: No module named 'pytest'"),
            ],
            isolation: IsolationSignal::default(),
            interpreter: None,
        };
        let text = render(|out| write_preflight(out, &report));
        assert!(text.contains("ok       vaultsfyi"));
        assert!(text.contains("MISSING  pytest"));
        assert!(text.contains("pip install pytest"));
        assert!(text.contains("python -m venv venv"));
        assert!(text.contains("source venv/bin/activate"));
    }

    #[test]
    fn test_no_advisory_when_isolated() {
        let report = PreflightReport {
            statuses: vec![DependencyStatus::available("vaultsfyi")],
            isolation: IsolationSignal {
                virtual_env: Some(PathBuf::from("/work/venv")),
                ..Default::default()
            },
            interpreter: None,
        };
        let text = render(|out| write_preflight(out, &report));
        assert!(!text.contains("WARNING"));
        assert!(!text.contains("Missing dependencies"));
    }

    #[test]
    fn test_summary_table() {
        let summary = RunSummary {
            suites: vec![
                SuiteSummary {
                    suite: SuiteId::Imports,
                    passed: true,
                    result: Some(SuiteResult::from_outcomes(
                        "imports",
                        vec![TestOutcome::passed("x"), TestOutcome::skipped("y", "no git")],
                    )),
                    error: None,
                    elapsed: Duration::from_millis(1500),
                },
                SuiteSummary {
                    suite: SuiteId::Parameters,
                    passed: false,
                    result: None,
                    error: Some("parameters timed out after 1800s and was killed".to_string()),
                    elapsed: Duration::ZERO,
                },
            ],
        };
        let text = render(|out| write_summary(out, &summary));
        assert!(text.contains("1/2 test suites passed"));
        assert!(text.contains("SDK Imports and Examples"));
        assert!(text.contains("Parameter Coverage Tests: parameters timed out"));
    }

    #[test]
    fn test_failed_suite_shows_streams() {
        let run = SuiteRun {
            exit_code: Some(1),
            stdout: "FAIL get_positions: missing\n".to_string(),
            stderr: String::new(),
            elapsed: Duration::from_secs(2),
        };
        let text = render(|out| write_suite_run(out, SuiteId::Imports, false, &run));
        assert!(text.starts_with("FAIL SDK Imports and Examples (exit 1, 2.0s)"));
        assert!(text.contains("STDOUT:\nFAIL get_positions: missing"));
        assert!(!text.contains("STDERR"));
    }

    #[test]
    fn test_suite_footer() {
        let result = SuiteResult::from_outcomes(
            "venv-setup",
            vec![TestOutcome::passed("a"), TestOutcome::skipped("b", "git not available")],
        );
        let text = render(|out| write_suite_footer(out, &result));
        assert_eq!(text.trim(), "1/1 checks passed (1 skipped)");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(300)), "0.3s");
        assert_eq!(format_elapsed(Duration::from_secs(75)), "1m15s");
    }
}
