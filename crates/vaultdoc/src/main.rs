//! vaultdoc command-line entry point.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use vaultdoc::orchestrator::{EXIT_PREFLIGHT_FAILURE, EXIT_SUITE_FAILURE};
use vaultdoc::{CliOverrides, SuiteId};
use vaultdoc_logging::{init_console_logging, init_logging, LogConfig};

mod cli;

#[derive(Parser, Debug)]
#[command(
    name = "vaultdoc",
    version,
    about = "Check the vaults.fyi Python SDK against its documentation"
)]
struct Cli {
    /// Enable verbose logging (debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.vaultdoc/config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Python interpreter to check (default: python3 or python on PATH)
    #[arg(long, global = true)]
    python: Option<PathBuf>,

    /// Let the SDK fetch the live network list (network I/O)
    #[arg(long, global = true)]
    live_networks: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Preflight, then every suite in its own process
    Run,

    /// Check required dependencies and environment isolation
    Preflight,

    /// Run a single suite in this process
    Suite {
        #[arg(value_enum)]
        suite: SuiteId,

        /// Write the suite result as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List the documented contract facts
    Facts {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn run_command(cli: Cli) -> Result<u8> {
    let overrides = CliOverrides {
        config_path: cli.config,
        python: cli.python,
        live_networks: cli.live_networks,
    };

    match cli.command {
        Commands::Facts { json } => cli::facts::run(cli::facts::FactsArgs { json }),
        Commands::Run => cli::run::run(&cli::Context::load(&overrides)?),
        Commands::Preflight => cli::preflight::run(&cli::Context::load(&overrides)?),
        Commands::Suite { suite, report } => cli::suite::run(
            &cli::Context::load(&overrides)?,
            cli::suite::SuiteArgs { suite, report },
        ),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Suite processes log to their own file and keep stderr for warnings.
    let (process_name, quiet) = match &cli.command {
        Commands::Suite { suite, .. } => (format!("suite-{}", suite.as_str()), true),
        _ => ("vaultdoc".to_string(), false),
    };
    if let Err(err) = init_logging(LogConfig {
        process_name: &process_name,
        verbose: cli.verbose,
        quiet,
    }) {
        init_console_logging(cli.verbose, quiet);
        eprintln!("Warning: file logging unavailable: {:#}", err);
    }

    match run_command(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            if let Some(helpful) = err.downcast_ref::<cli::error::HelpfulError>() {
                eprintln!("{}", helpful);
                ExitCode::from(EXIT_PREFLIGHT_FAILURE)
            } else {
                eprintln!("{:?}", err);
                ExitCode::from(EXIT_SUITE_FAILURE)
            }
        }
    }
}
