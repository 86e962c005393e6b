//! Documented Contract Stability Tests
//!
//! The catalog mirrors published documentation. These tests pin the values a
//! reader of the docs relies on, so an accidental edit shows up as a failure.

use vaultdoc_protocol::catalog::*;
use vaultdoc_protocol::*;

#[test]
fn test_documented_method_order() {
    let methods: Vec<_> = documented_methods().collect();
    assert_eq!(
        methods,
        vec![
            "get_benchmarks",
            "get_historical_benchmarks",
            "get_all_vaults",
            "get_vault",
            "get_vault_historical_data",
            "get_positions",
            "get_deposit_options",
            "get_idle_assets",
            "get_actions",
            "get_transactions_context",
            "get_vault_holder_events",
            "get_vault_total_returns",
        ]
    );
}

#[test]
fn test_documented_exceptions() {
    let facts = catalog::exception_facts();
    let names: Vec<_> = facts.iter().map(|f| f.subject.as_str()).collect();
    assert_eq!(
        names,
        vec!["AuthenticationError", "HttpResponseError", "RateLimitError", "VaultsFyiError"]
    );
    for fact in facts {
        match fact.expected {
            Expectation::SubtypeOf { module, base } => {
                assert_eq!(module, "vaultsfyi.exceptions");
                assert_eq!(base, "Exception");
            }
            other => panic!("unexpected expectation {:?}", other),
        }
    }
}

#[test]
fn test_asset_symbols_are_uppercase() {
    for asset in ASSET_SYMBOLS {
        assert!(!asset.is_empty());
        assert_eq!(asset, asset.to_uppercase(), "Asset {} should be uppercase", asset);
    }
}

#[test]
fn test_action_types_are_lowercase() {
    for action in ACTION_TYPES {
        assert!(!action.is_empty());
        assert_eq!(action, action.to_lowercase(), "Action {} should be lowercase", action);
    }
}

#[test]
fn test_networks_endpoint_uses_documented_configuration() -> anyhow::Result<()> {
    let config = ApiConfig::default();
    let url = config.networks_endpoint()?;
    assert!(url.as_str().starts_with("https://"));
    assert!(url.as_str().contains("vaults.fyi"));
    assert!(url.path().starts_with("/v2/"));
    Ok(())
}

#[test]
fn test_facts_serialize_for_listing() -> anyhow::Result<()> {
    let facts = contract_facts();
    let json = serde_json::to_string(&facts)?;
    let back: Vec<ContractFact> = serde_json::from_str(&json)?;
    assert_eq!(back.len(), facts.len());
    Ok(())
}
