//! Suites: the units the orchestrator runs as separate processes.
//!
//! A suite prints its outcomes, writes its [`SuiteResult`] to a report file
//! when asked, and exits non-zero when any outcome failed.

use crate::conformance::{self, catalog_checks, PythonSurface, SdkSurface, SurfaceNetworkLookup};
use crate::config::HarnessConfig;
use crate::workflow::{scenarios, WorkflowTools, WorkflowVerifier};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;
use vaultdoc_protocol::catalog::{self, PLACEHOLDER_ADDRESS};
use vaultdoc_protocol::{
    ApiConfig, CallShape, ContractFact, NetworkLookup, NoLookup, SuiteResult, TestOutcome,
};
use vaultdoc_runtime::{resolve_git, SdkProbe};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SuiteId {
    /// Documented local workflow
    VenvSetup,
    /// SDK imports, construction, methods, exceptions and examples
    Imports,
    /// Documented parameter combinations and value catalogues
    Parameters,
}

impl SuiteId {
    pub const ALL: [SuiteId; 3] = [SuiteId::VenvSetup, SuiteId::Imports, SuiteId::Parameters];

    pub fn as_str(&self) -> &'static str {
        match self {
            SuiteId::VenvSetup => "venv-setup",
            SuiteId::Imports => "imports",
            SuiteId::Parameters => "parameters",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SuiteId::VenvSetup => "Virtual Environment Setup",
            SuiteId::Imports => "SDK Imports and Examples",
            SuiteId::Parameters => "Parameter Coverage Tests",
        }
    }
}

impl std::fmt::Display for SuiteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Facts behind the documentation's worked examples.
pub fn documentation_example_facts() -> Vec<ContractFact> {
    vec![
        ContractFact::callable("get_benchmarks"),
        ContractFact::callable("get_all_vaults"),
        ContractFact::binds(
            "get_all_vaults",
            "filtering example",
            CallShape::new()
                .kwarg("assetSymbol", "USDC")
                .kwarg("network", "mainnet")
                .kwarg("onlyTransactional", true)
                .kwarg("page", 0)
                .kwarg("perPage", 50),
        ),
        ContractFact::callable("get_actions"),
        ContractFact::binds(
            "get_deposit_options",
            "find_best_yields example",
            CallShape::new()
                .kwarg("user_address", PLACEHOLDER_ADDRESS)
                .kwarg("allowed_assets", serde_json::json!(["USDC"]))
                .kwarg("allowedNetworks", serde_json::json!(["mainnet"])),
        ),
    ]
}

/// Documented workflow scenarios.
pub fn venv_setup_outcomes(verifier: &WorkflowVerifier, install_package: &str) -> Vec<TestOutcome> {
    scenarios::documented_scenarios(install_package)
        .iter()
        .flat_map(|scenario| verifier.run_scenario(scenario))
        .collect()
}

/// Imports suite: construction, methods, exceptions, documentation examples
/// and the network validation example.
pub fn imports_outcomes(surface: &dyn SdkSurface, live_networks: bool) -> Result<Vec<TestOutcome>> {
    let mut facts = catalog::constructor_facts();
    facts.extend(catalog::method_facts());
    facts.extend(catalog::exception_facts());
    facts.extend(documentation_example_facts());

    let run = conformance::check_facts(surface, &facts)?;
    let mut outcomes = run.outcomes;

    if run.sdk_available {
        let live = SurfaceNetworkLookup::new(surface);
        let lookup: &dyn NetworkLookup = if live_networks { &live } else { &NoLookup };
        outcomes.extend(catalog_checks::network_resolution_outcomes(lookup));
    } else {
        outcomes.push(TestOutcome::skipped(
            "supported networks resolve",
            "SDK not available",
        ));
    }
    Ok(outcomes)
}

/// Parameters suite: every documented call shape plus the value catalogues.
pub fn parameters_outcomes(surface: &dyn SdkSurface) -> Result<Vec<TestOutcome>> {
    let facts = catalog::parameter_facts();
    let mut outcomes = conformance::check_facts(surface, &facts)?.outcomes;
    outcomes.extend(catalog_checks::network_catalog_outcomes());
    outcomes.extend(catalog_checks::asset_symbol_outcomes());
    outcomes.extend(catalog_checks::action_type_outcomes());
    outcomes.extend(catalog_checks::api_configuration_outcomes(&ApiConfig::default()));
    Ok(outcomes)
}

/// Run one suite against the configured interpreter.
pub fn run_suite(id: SuiteId, config: &HarnessConfig, python: &Path) -> Result<SuiteResult> {
    info!("Running suite {} with {}", id, python.display());
    let outcomes = match id {
        SuiteId::VenvSetup => {
            let git =
                resolve_git(config.git.as_deref(), config.command_timeout()).map(|check| check.path);
            let verifier = WorkflowVerifier::new(WorkflowTools {
                python: python.to_path_buf(),
                git,
                command_timeout: config.command_timeout(),
                install_timeout: config.install_timeout(),
            });
            venv_setup_outcomes(&verifier, &config.install_package)
        }
        SuiteId::Imports => imports_outcomes(&python_surface(config, python), config.live_networks)?,
        SuiteId::Parameters => parameters_outcomes(&python_surface(config, python))?,
    };
    Ok(SuiteResult::from_outcomes(id.as_str(), outcomes))
}

fn python_surface(config: &HarnessConfig, python: &Path) -> PythonSurface {
    PythonSurface::new(
        SdkProbe::new(python, config.command_timeout()),
        &config.sdk_module,
        &config.client_class,
        &config.test_api_key,
    )
}

pub fn write_report(path: &Path, result: &SuiteResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result).context("Failed to serialize suite result")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write suite report {}", path.display()))
}

/// `None` when the suite died before writing its report.
pub fn read_report(path: &Path) -> Option<SuiteResult> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}
