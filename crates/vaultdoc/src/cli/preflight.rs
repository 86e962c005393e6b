//! `vaultdoc preflight`: dependency and isolation check only.

use super::error::HelpfulError;
use super::{virtual_env, Context};
use anyhow::Result;
use std::io::Write;
use vaultdoc::orchestrator::{EXIT_PREFLIGHT_FAILURE, EXIT_SUCCESS};
use vaultdoc::{preflight, report};

pub fn run(ctx: &Context) -> Result<u8> {
    let resolver = ctx.resolver();
    let result = preflight::check(&resolver, &ctx.config.required_dependencies, virtual_env())?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report::write_preflight(&mut out, &result)?;
    out.flush()?;

    let missing = result.missing();
    if missing.is_empty() {
        writeln!(out, "\nAll dependencies available")?;
        Ok(EXIT_SUCCESS)
    } else {
        eprintln!("{}", HelpfulError::missing_dependencies(&missing));
        Ok(EXIT_PREFLIGHT_FAILURE)
    }
}
