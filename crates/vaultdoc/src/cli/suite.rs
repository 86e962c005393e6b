//! `vaultdoc suite <name>`: run one suite in this process.
//!
//! Prints one line per outcome on stdout and exits non-zero when anything
//! failed. The orchestrator captures that output and reads the report file.

use super::Context;
use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;
use vaultdoc::orchestrator::{EXIT_SUCCESS, EXIT_SUITE_FAILURE};
use vaultdoc::suite::{run_suite, write_report};
use vaultdoc::{report, SuiteId};

pub struct SuiteArgs {
    pub suite: SuiteId,
    pub report: Option<PathBuf>,
}

pub fn run(ctx: &Context, args: SuiteArgs) -> Result<u8> {
    let result = run_suite(args.suite, &ctx.config, ctx.python())?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", args.suite.title())?;
    report::write_outcomes(&mut out, &result.outcomes)?;
    report::write_suite_footer(&mut out, &result)?;
    out.flush()?;

    if let Some(path) = &args.report {
        if let Err(err) = write_report(path, &result) {
            warn!("{:#}", err);
        }
    }

    Ok(if result.is_success() {
        EXIT_SUCCESS
    } else {
        EXIT_SUITE_FAILURE
    })
}
