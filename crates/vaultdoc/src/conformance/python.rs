//! [`SdkSurface`] backed by the embedded Python probe.

use super::{SdkSurface, SurfaceReport, Verdict};
use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use vaultdoc_protocol::{ContractFact, Expectation};
use vaultdoc_runtime::{ProbeOp, ProbeRequest, ProbeResult, SdkProbe};

pub struct PythonSurface {
    probe: SdkProbe,
    sdk_module: String,
    client_class: String,
    /// Options for the shared client instance used by member checks
    client_kwargs: Map<String, Value>,
}

impl PythonSurface {
    pub fn new(probe: SdkProbe, sdk_module: &str, client_class: &str, api_key: &str) -> Self {
        let mut client_kwargs = Map::new();
        client_kwargs.insert("api_key".to_string(), Value::String(api_key.to_string()));
        Self {
            probe,
            sdk_module: sdk_module.to_string(),
            client_class: client_class.to_string(),
            client_kwargs,
        }
    }

    fn request(&self, ops: Vec<ProbeOp>) -> ProbeRequest {
        ProbeRequest {
            sdk_module: self.sdk_module.clone(),
            client_class: self.client_class.clone(),
            client_kwargs: self.client_kwargs.clone(),
            ops,
        }
    }
}

/// Translate a fact into the reflection operation that decides it.
pub fn probe_op(fact: &ContractFact) -> ProbeOp {
    match &fact.expected {
        Expectation::Constructs { options } => ProbeOp::Construct {
            kwargs: options.kwargs.clone(),
        },
        Expectation::Rejects { options } => ProbeOp::Reject {
            kwargs: options.kwargs.clone(),
        },
        Expectation::Callable => ProbeOp::Callable {
            method: fact.subject.clone(),
        },
        Expectation::SubtypeOf { module, base } => ProbeOp::Subclass {
            module: module.clone(),
            name: fact.subject.clone(),
            base: base.clone(),
        },
        Expectation::Binds { shape } => ProbeOp::bind(&fact.subject, shape),
    }
}

fn verdict(result: ProbeResult) -> Verdict {
    Verdict {
        holds: result.ok,
        detail: result.detail,
    }
}

impl SdkSurface for PythonSurface {
    fn evaluate(&self, facts: &[ContractFact]) -> Result<SurfaceReport> {
        let mut ops = vec![ProbeOp::ClientType];
        ops.extend(facts.iter().map(probe_op));

        let report = self
            .probe
            .run(&self.request(ops))
            .context("SDK probe failed")?;

        let mut results = report.results.into_iter();
        let client_type = results
            .next()
            .map(verdict)
            .unwrap_or_else(|| Verdict::fails("no result for client type"));
        Ok(SurfaceReport {
            available: report.sdk_available,
            unavailable_reason: report.sdk_error,
            client_type,
            verdicts: results.map(verdict).collect(),
        })
    }

    fn list_networks(&self) -> Result<Vec<String>> {
        let report = self
            .probe
            .run(&self.request(vec![ProbeOp::Networks]))
            .context("SDK probe failed")?;
        let Some(result) = report.results.into_iter().next() else {
            bail!("no result for network listing");
        };
        if !result.ok {
            bail!(
                "{}",
                result
                    .detail
                    .unwrap_or_else(|| "network listing failed".to_string())
            );
        }
        result
            .network_names()
            .context("network listing returned no names")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vaultdoc_protocol::catalog;

    #[test]
    fn test_fact_to_op_mapping() {
        let facts = catalog::contract_facts();
        let ops: Vec<ProbeOp> = facts.iter().map(probe_op).collect();
        assert!(matches!(ops[0], ProbeOp::Construct { .. }));
        assert!(matches!(ops[2], ProbeOp::Reject { ref kwargs } if kwargs.is_empty()));

        let callable = ops
            .iter()
            .find(|op| matches!(op, ProbeOp::Callable { method } if method == "get_positions"));
        assert!(callable.is_some());

        let subclass = facts
            .iter()
            .zip(&ops)
            .find(|(f, _)| f.subject == "RateLimitError")
            .map(|(_, op)| op.clone());
        assert_eq!(
            subclass,
            Some(ProbeOp::Subclass {
                module: "vaultsfyi.exceptions".to_string(),
                name: "RateLimitError".to_string(),
                base: "Exception".to_string(),
            })
        );
    }

    #[test]
    fn test_positional_shape_survives_translation() {
        let fact = ContractFact::binds(
            "get_positions",
            "common pattern",
            vaultdoc_protocol::CallShape::new().arg("0x..."),
        );
        match probe_op(&fact) {
            ProbeOp::Bind { method, args, kwargs } => {
                assert_eq!(method, "get_positions");
                assert_eq!(args, vec![json!("0x...")]);
                assert!(kwargs.is_empty());
            }
            other => panic!("unexpected op {:?}", other),
        }
    }

    #[test]
    fn test_request_carries_credential() {
        let surface = PythonSurface::new(
            SdkProbe::new("python3", std::time::Duration::from_secs(5)),
            "vaultsfyi",
            "VaultsSdk",
            "test_key",
        );
        let request = surface.request(vec![ProbeOp::ClientType]);
        assert_eq!(request.client_kwargs.get("api_key"), Some(&json!("test_key")));
        assert_eq!(request.sdk_module, "vaultsfyi");
    }
}
