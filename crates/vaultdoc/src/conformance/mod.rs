//! SDK conformance checking.
//!
//! Facts are evaluated in one batch against an [`SdkSurface`]. When the SDK
//! cannot be imported every fact is reported as skipped, never failed. Each
//! fact yields its own outcome so all gaps are visible in one run.

pub mod catalog_checks;
pub mod python;

use anyhow::Result;
use tracing::{info, warn};
use vaultdoc_protocol::{ContractFact, NetworkLookup, ProtocolError, TestOutcome};

pub use python::PythonSurface;

/// Verdict for one fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub holds: bool,
    pub detail: Option<String>,
}

impl Verdict {
    pub fn holds() -> Self {
        Self {
            holds: true,
            detail: None,
        }
    }

    pub fn fails(detail: impl Into<String>) -> Self {
        Self {
            holds: false,
            detail: Some(detail.into()),
        }
    }
}

/// Result of evaluating a batch of facts.
#[derive(Debug, Clone)]
pub struct SurfaceReport {
    pub available: bool,
    /// Import error when the SDK is unavailable
    pub unavailable_reason: Option<String>,
    /// The client type resolves and is callable
    pub client_type: Verdict,
    /// One verdict per fact, in input order
    pub verdicts: Vec<Verdict>,
}

/// Live SDK surface the facts are checked against.
pub trait SdkSurface {
    fn evaluate(&self, facts: &[ContractFact]) -> Result<SurfaceReport>;

    /// The SDK's own network listing. Performs network I/O.
    fn list_networks(&self) -> Result<Vec<String>>;
}

/// Outcome name of the client-type check
pub const CLIENT_TYPE_CHECK: &str = "client type is callable";

/// Evaluate facts and turn verdicts into outcomes.
///
/// The first outcome is always the client-type check.
pub fn check_facts(surface: &dyn SdkSurface, facts: &[ContractFact]) -> Result<FactsRun> {
    let report = surface.evaluate(facts)?;
    if report.verdicts.len() != facts.len() {
        anyhow::bail!(
            "surface returned {} verdicts for {} facts",
            report.verdicts.len(),
            facts.len()
        );
    }

    if !report.available {
        let reason = format!(
            "SDK not available: {}",
            report
                .unavailable_reason
                .as_deref()
                .unwrap_or("import failed")
        );
        info!("Skipping {} facts: {}", facts.len(), reason);
        let mut outcomes = vec![TestOutcome::skipped(CLIENT_TYPE_CHECK, reason.clone())];
        outcomes.extend(
            facts
                .iter()
                .map(|fact| TestOutcome::skipped(fact.label.clone(), reason.clone())),
        );
        return Ok(FactsRun {
            sdk_available: false,
            outcomes,
        });
    }

    let mut outcomes = vec![verdict_outcome(CLIENT_TYPE_CHECK, report.client_type)];
    for (fact, verdict) in facts.iter().zip(report.verdicts) {
        if !verdict.holds {
            warn!("{} fact failed: {}", fact.kind, fact.label);
        }
        outcomes.push(verdict_outcome(&fact.label, verdict));
    }
    Ok(FactsRun {
        sdk_available: true,
        outcomes,
    })
}

/// Outcomes of one batch plus the availability it was run with.
#[derive(Debug, Clone)]
pub struct FactsRun {
    pub sdk_available: bool,
    pub outcomes: Vec<TestOutcome>,
}

fn verdict_outcome(name: &str, verdict: Verdict) -> TestOutcome {
    let outcome = TestOutcome::from_check(
        name,
        verdict.holds,
        verdict.detail.clone().unwrap_or_else(|| "check failed".to_string()),
    );
    match (verdict.holds, verdict.detail) {
        // Passing checks may still carry a note (e.g. signature not introspectable)
        (true, Some(note)) => outcome.with_detail(note),
        _ => outcome,
    }
}

/// Network lookup backed by the SDK's own listing.
pub struct SurfaceNetworkLookup<'a> {
    surface: &'a dyn SdkSurface,
}

impl<'a> SurfaceNetworkLookup<'a> {
    pub fn new(surface: &'a dyn SdkSurface) -> Self {
        Self { surface }
    }
}

impl NetworkLookup for SurfaceNetworkLookup<'_> {
    fn fetch_networks(&self) -> vaultdoc_protocol::Result<Vec<String>> {
        self.surface
            .list_networks()
            .map_err(|e| ProtocolError::LookupUnavailable(format!("{:#}", e)))
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeSurface;
    use super::*;
    use vaultdoc_protocol::catalog;
    use vaultdoc_protocol::{resolve_supported_networks, NetworkSource, OutcomeStatus};

    #[test]
    fn test_unavailable_sdk_skips_everything() {
        let surface = FakeSurface {
            unavailable: Some("ModuleNotFoundError: No module named 'vaultsfyi'".to_string()),
            ..Default::default()
        };
        let facts = catalog::contract_facts();
        let run = check_facts(&surface, &facts).unwrap();
        assert!(!run.sdk_available);
        assert_eq!(run.outcomes.len(), facts.len() + 1);
        assert!(run.outcomes.iter().all(|o| o.is_skipped()));
        assert!(run.outcomes[0]
            .detail
            .as_deref()
            .unwrap()
            .contains("No module named"));
    }

    #[test]
    fn test_each_missing_method_reported_individually() {
        let surface = FakeSurface {
            missing_methods: vec!["get_idle_assets", "get_vault_total_returns"],
            ..Default::default()
        };
        let facts = catalog::method_facts();
        let run = check_facts(&surface, &facts).unwrap();
        let failed: Vec<_> = run
            .outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Failed)
            .map(|o| o.name.as_str())
            .collect();
        assert_eq!(
            failed,
            vec![
                "method get_idle_assets is callable",
                "method get_vault_total_returns is callable"
            ]
        );
        assert_eq!(run.outcomes.iter().filter(|o| o.is_passed()).count(), 11);
    }

    #[test]
    fn test_accepted_missing_credential_is_a_failure() {
        let surface = FakeSurface {
            accepts_missing_credential: true,
            ..Default::default()
        };
        let run = check_facts(&surface, &catalog::constructor_facts()).unwrap();
        let statuses: Vec<_> = run.outcomes.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![
                OutcomeStatus::Passed,
                OutcomeStatus::Passed,
                OutcomeStatus::Passed,
                OutcomeStatus::Failed
            ]
        );
    }

    #[test]
    fn test_passing_note_is_kept() {
        let outcome = verdict_outcome(
            "x",
            Verdict {
                holds: true,
                detail: Some("signature not introspectable".to_string()),
            },
        );
        assert!(outcome.is_passed());
        assert_eq!(outcome.detail.as_deref(), Some("signature not introspectable"));
    }

    #[test]
    fn test_surface_lookup_falls_back_on_error() {
        let surface = FakeSurface::default();
        let list = resolve_supported_networks(&SurfaceNetworkLookup::new(&surface));
        assert_eq!(list.source, NetworkSource::Fallback);
        assert!(list.fallback_reason.unwrap().contains("get_networks"));

        let surface = FakeSurface {
            networks: Some(vec!["mainnet".to_string(), "sonic".to_string()]),
            ..Default::default()
        };
        let list = resolve_supported_networks(&SurfaceNetworkLookup::new(&surface));
        assert_eq!(list.source, NetworkSource::Dynamic);
        assert!(list.contains("sonic"));
    }
}
