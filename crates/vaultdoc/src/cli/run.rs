//! `vaultdoc run`: preflight, then every suite in its own process.

use super::error::HelpfulError;
use super::{virtual_env, Context};
use anyhow::Result;
use std::ffi::OsString;
use std::io::Write;
use tracing::info;
use vaultdoc::{Orchestrator, RunOutcome, SelfExecLauncher};

pub fn run(ctx: &Context) -> Result<u8> {
    let resolver = ctx.resolver();
    let launcher = SelfExecLauncher::current(suite_args(ctx), ctx.config.suite_timeout())?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = Orchestrator::new(&resolver, &launcher).run(
        &ctx.config.required_dependencies,
        virtual_env(),
        &mut out,
    )?;
    out.flush()?;

    if let RunOutcome::PreflightFailed(report) = &outcome {
        eprintln!("{}", HelpfulError::missing_dependencies(&report.missing()));
    }
    let code = outcome.exit_code();
    info!("Run finished with exit code {}", code);
    Ok(code)
}

/// Global flags forwarded to each suite process so it sees the same settings.
fn suite_args(ctx: &Context) -> Vec<OsString> {
    let mut args = vec![OsString::from("--python"), ctx.python().as_os_str().to_owned()];
    if let Some(path) = &ctx.config_path {
        args.push(OsString::from("--config"));
        args.push(path.as_os_str().to_owned());
    }
    if ctx.config.live_networks {
        args.push(OsString::from("--live-networks"));
    }
    args
}
