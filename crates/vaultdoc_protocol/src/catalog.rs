//! The documented contract of the vaults.fyi Python SDK.
//!
//! Every constant here mirrors a published documentation example. The endpoint
//! table is the single definition of the public surface: method-presence facts
//! and parameter-shape facts are both derived from it.

use crate::types::{CallShape, ContractFact};
use serde::Serialize;
use serde_json::json;

/// Import name of the SDK package
pub const SDK_MODULE: &str = "vaultsfyi";
/// Client type exported by the SDK package
pub const CLIENT_CLASS: &str = "VaultsSdk";
/// Module holding the documented exception hierarchy
pub const EXCEPTIONS_MODULE: &str = "vaultsfyi.exceptions";
/// Base type every documented exception must derive from
pub const BASE_ERROR_TYPE: &str = "Exception";
/// Credential used for structural checks; never valid against the live API
pub const TEST_API_KEY: &str = "test_key";

pub const EXAMPLE_USER_ADDRESS: &str = "0xdB79e7E9e1412457528e40db9fCDBe69f558777d";
pub const EXAMPLE_VAULT_ADDRESS: &str = "0x1234567890123456789012345678901234567890";
pub const EXAMPLE_ASSET_ADDRESS: &str = "0xA0b86a33E6441f3F56F2B05e7b4B8B7F5A5f0e1B";
/// Placeholder address used in the short-form examples
pub const PLACEHOLDER_ADDRESS: &str = "0x...";

/// Documented exception names, all expected under [`EXCEPTIONS_MODULE`].
pub const DOCUMENTED_EXCEPTIONS: [&str; 4] = [
    "AuthenticationError",
    "HttpResponseError",
    "RateLimitError",
    "VaultsFyiError",
];

/// Fallback network identifiers (documentation snapshot of July 4, 2025).
pub const SUPPORTED_NETWORKS: [&str; 13] = [
    "arbitrum",
    "base",
    "berachain",
    "bsc",
    "celo",
    "gnosis",
    "ink",
    "mainnet",
    "optimism",
    "polygon",
    "swellchain",
    "unichain",
    "worldchain",
];

pub const ASSET_SYMBOLS: [&str; 5] = ["USDC", "USDS", "USDT", "DAI", "WBTC"];

pub const ACTION_TYPES: [&str; 2] = ["deposit", "redeem"];

/// Named constructor options of the client.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ConstructorOption {
    pub name: &'static str,
    pub required: bool,
}

pub const CONSTRUCTOR_OPTIONS: [ConstructorOption; 4] = [
    ConstructorOption { name: "api_key", required: true },
    ConstructorOption { name: "api_base_url", required: false },
    ConstructorOption { name: "timeout", required: false },
    ConstructorOption { name: "max_retries", required: false },
];

/// One documented endpoint method and its documented parameter names.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EndpointSpec {
    pub method: &'static str,
    pub summary: &'static str,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
}

impl EndpointSpec {
    /// True when `name` is one of the documented parameter names.
    pub fn documents(&self, name: &str) -> bool {
        self.required.contains(&name) || self.optional.contains(&name)
    }
}

pub const ENDPOINTS: [EndpointSpec; 12] = [
    EndpointSpec {
        method: "get_benchmarks",
        summary: "benchmark retrieval",
        required: &["network", "code"],
        optional: &[],
    },
    EndpointSpec {
        method: "get_historical_benchmarks",
        summary: "historical benchmark retrieval",
        required: &["network", "code"],
        optional: &["page", "per_page", "from_timestamp", "to_timestamp"],
    },
    EndpointSpec {
        method: "get_all_vaults",
        summary: "vault listing",
        required: &[],
        optional: &["network", "assetSymbol", "onlyTransactional", "page", "perPage"],
    },
    EndpointSpec {
        method: "get_vault",
        summary: "single-vault retrieval",
        required: &["network", "vault_address"],
        optional: &[],
    },
    EndpointSpec {
        method: "get_vault_historical_data",
        summary: "vault historical data",
        required: &["network", "vault_address"],
        optional: &["apyInterval", "fromTimestamp", "toTimestamp", "page", "perPage"],
    },
    EndpointSpec {
        method: "get_positions",
        summary: "position retrieval",
        required: &["user_address"],
        optional: &[],
    },
    EndpointSpec {
        method: "get_deposit_options",
        summary: "deposit-option retrieval",
        required: &["user_address"],
        optional: &["allowed_assets", "allowedNetworks", "disallowedNetworks"],
    },
    EndpointSpec {
        method: "get_idle_assets",
        summary: "idle-asset retrieval",
        required: &["user_address"],
        optional: &[],
    },
    EndpointSpec {
        method: "get_actions",
        summary: "action retrieval",
        required: &["action", "user_address", "network", "vault_address"],
        optional: &["amount", "asset_address", "simulate"],
    },
    EndpointSpec {
        method: "get_transactions_context",
        summary: "transaction-context retrieval",
        required: &["user_address", "network", "vault_address"],
        optional: &[],
    },
    EndpointSpec {
        method: "get_vault_holder_events",
        summary: "vault holder-event retrieval",
        required: &["user_address", "network", "vault_address"],
        optional: &[],
    },
    EndpointSpec {
        method: "get_vault_total_returns",
        summary: "vault total-returns retrieval",
        required: &["user_address", "network", "vault_address"],
        optional: &[],
    },
];

/// Documented method names in documentation order.
pub fn documented_methods() -> impl Iterator<Item = &'static str> {
    ENDPOINTS.iter().map(|e| e.method)
}

pub fn endpoint(method: &str) -> Option<&'static EndpointSpec> {
    ENDPOINTS.iter().find(|e| e.method == method)
}

/// A named documentation example of a call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentedCall {
    pub method: &'static str,
    pub variant: &'static str,
    pub shape: CallShape,
}

impl DocumentedCall {
    fn new(method: &'static str, variant: &'static str, shape: CallShape) -> Self {
        Self { method, variant, shape }
    }
}

/// Every documented argument structure, including the short-form patterns.
pub fn documented_calls() -> Vec<DocumentedCall> {
    let user = EXAMPLE_USER_ADDRESS;
    let vault = EXAMPLE_VAULT_ADDRESS;
    let mut calls = vec![
        DocumentedCall::new(
            "get_benchmarks",
            "reference",
            CallShape::new().kwarg("network", "mainnet").kwarg("code", "usd"),
        ),
        DocumentedCall::new(
            "get_historical_benchmarks",
            "reference",
            CallShape::new()
                .kwarg("network", "mainnet")
                .kwarg("code", "usd")
                .kwarg("page", 0)
                .kwarg("per_page", 100)
                .kwarg("from_timestamp", 1640995200)
                .kwarg("to_timestamp", 1672531200),
        ),
        DocumentedCall::new(
            "get_all_vaults",
            "credit-efficient filter",
            CallShape::new()
                .kwarg("network", "mainnet")
                .kwarg("assetSymbol", "USDC")
                .kwarg("onlyTransactional", true),
        ),
        DocumentedCall::new(
            "get_all_vaults",
            "pagination",
            CallShape::new().kwarg("page", 0).kwarg("perPage", 50),
        ),
        DocumentedCall::new("get_all_vaults", "common pattern", CallShape::new()),
        DocumentedCall::new(
            "get_vault",
            "reference",
            CallShape::new().kwarg("network", "mainnet").kwarg("vault_address", vault),
        ),
        DocumentedCall::new(
            "get_vault_historical_data",
            "reference",
            CallShape::new()
                .kwarg("network", "mainnet")
                .kwarg("vault_address", vault)
                .kwarg("apyInterval", "7day")
                .kwarg("fromTimestamp", 1640995200)
                .kwarg("toTimestamp", 1672531200)
                .kwarg("page", 0)
                .kwarg("perPage", 100),
        ),
        DocumentedCall::new(
            "get_positions",
            "reference",
            CallShape::new().kwarg("user_address", user),
        ),
        DocumentedCall::new(
            "get_positions",
            "common pattern",
            CallShape::new().arg(PLACEHOLDER_ADDRESS),
        ),
        DocumentedCall::new(
            "get_deposit_options",
            "reference",
            CallShape::new()
                .kwarg("user_address", user)
                .kwarg("allowed_assets", json!(["USDC", "USDS"]))
                .kwarg("allowedNetworks", json!(["mainnet", "base"]))
                .kwarg("disallowedNetworks", json!(["arbitrum"])),
        ),
        DocumentedCall::new(
            "get_deposit_options",
            "credit-efficient filter",
            CallShape::new()
                .kwarg("user_address", PLACEHOLDER_ADDRESS)
                .kwarg("allowed_assets", json!(["USDC", "USDT"])),
        ),
        DocumentedCall::new(
            "get_deposit_options",
            "best yields helper",
            CallShape::new()
                .kwarg("user_address", PLACEHOLDER_ADDRESS)
                .kwarg("allowed_assets", json!(["USDC"]))
                .kwarg("allowedNetworks", json!(["mainnet"])),
        ),
        DocumentedCall::new(
            "get_idle_assets",
            "reference",
            CallShape::new().kwarg("user_address", user),
        ),
        DocumentedCall::new(
            "get_actions",
            "reference",
            CallShape::new()
                .kwarg("action", "deposit")
                .kwarg("user_address", user)
                .kwarg("network", "mainnet")
                .kwarg("vault_address", vault)
                .kwarg("amount", "1000000000")
                .kwarg("asset_address", EXAMPLE_ASSET_ADDRESS)
                .kwarg("simulate", true),
        ),
        DocumentedCall::new(
            "get_actions",
            "common pattern",
            CallShape::new()
                .arg("deposit")
                .arg(PLACEHOLDER_ADDRESS)
                .arg("mainnet")
                .arg(PLACEHOLDER_ADDRESS)
                .kwarg("amount", "1000000"),
        ),
    ];

    for method in [
        "get_transactions_context",
        "get_vault_holder_events",
        "get_vault_total_returns",
    ] {
        calls.push(DocumentedCall::new(
            method,
            "reference",
            CallShape::new()
                .kwarg("user_address", user)
                .kwarg("network", "mainnet")
                .kwarg("vault_address", vault),
        ));
    }

    calls
}

/// Documented constructor example with every option set.
pub fn full_constructor_options() -> CallShape {
    CallShape::new()
        .kwarg("api_key", "your_api_key_here")
        .kwarg("api_base_url", "https://api.vaults.fyi")
        .kwarg("timeout", 30)
        .kwarg("max_retries", 3)
}

/// Minimal constructor example: the required credential only.
pub fn minimal_constructor_options() -> CallShape {
    CallShape::new().kwarg("api_key", TEST_API_KEY)
}

pub fn constructor_facts() -> Vec<ContractFact> {
    vec![
        ContractFact::constructs("all documented options", full_constructor_options()),
        ContractFact::constructs("required credential only", minimal_constructor_options()),
        ContractFact::rejects("missing required credential", CallShape::new()),
    ]
}

pub fn method_facts() -> Vec<ContractFact> {
    documented_methods().map(ContractFact::callable).collect()
}

pub fn exception_facts() -> Vec<ContractFact> {
    DOCUMENTED_EXCEPTIONS
        .iter()
        .map(|name| ContractFact::subtype_of(name, EXCEPTIONS_MODULE, BASE_ERROR_TYPE))
        .collect()
}

pub fn parameter_facts() -> Vec<ContractFact> {
    documented_calls()
        .into_iter()
        .map(|call| ContractFact::binds(call.method, call.variant, call.shape))
        .collect()
}

/// Every fact, in report order.
pub fn contract_facts() -> Vec<ContractFact> {
    let mut facts = constructor_facts();
    facts.extend(method_facts());
    facts.extend(exception_facts());
    facts.extend(parameter_facts());
    facts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Expectation, FactKind};
    use std::collections::HashSet;

    #[test]
    fn test_twelve_documented_methods() {
        let methods: HashSet<_> = documented_methods().collect();
        assert_eq!(methods.len(), 12);
        assert!(methods.contains("get_deposit_options"));
        assert!(methods.contains("get_vault_total_returns"));
    }

    #[test]
    fn test_every_documented_call_targets_a_documented_method() {
        for call in documented_calls() {
            assert!(
                endpoint(call.method).is_some(),
                "{} is not in the endpoint table",
                call.method
            );
        }
    }

    #[test]
    fn test_keyword_names_are_documented_parameters() {
        for call in documented_calls() {
            let spec = endpoint(call.method).unwrap();
            for name in call.shape.keyword_names() {
                assert!(
                    spec.documents(name),
                    "{} [{}] uses undocumented parameter {}",
                    call.method,
                    call.variant,
                    name
                );
            }
        }
    }

    #[test]
    fn test_reference_calls_supply_every_required_parameter() {
        for call in documented_calls().into_iter().filter(|c| c.variant == "reference") {
            let spec = endpoint(call.method).unwrap();
            for required in spec.required {
                assert!(
                    call.shape.kwargs.contains_key(*required),
                    "{} reference example omits {}",
                    call.method,
                    required
                );
            }
        }
    }

    #[test]
    fn test_every_method_has_a_documented_call() {
        let called: HashSet<_> = documented_calls().iter().map(|c| c.method).collect();
        for method in documented_methods() {
            assert!(called.contains(method), "{} has no documented call", method);
        }
    }

    #[test]
    fn test_required_constructor_option_is_api_key() {
        let required: Vec<_> = CONSTRUCTOR_OPTIONS
            .iter()
            .filter(|o| o.required)
            .map(|o| o.name)
            .collect();
        assert_eq!(required, vec!["api_key"]);

        let full = full_constructor_options();
        for option in CONSTRUCTOR_OPTIONS {
            assert!(full.kwargs.contains_key(option.name));
        }
    }

    #[test]
    fn test_contract_facts_cover_every_kind() {
        let facts = contract_facts();
        for kind in [
            FactKind::ConstructorOption,
            FactKind::MethodPresence,
            FactKind::ExceptionType,
            FactKind::ParameterShape,
        ] {
            assert!(facts.iter().any(|f| f.kind == kind), "no {} facts", kind);
        }
        assert_eq!(
            facts.iter().filter(|f| f.kind == FactKind::ExceptionType).count(),
            4
        );
        assert!(facts
            .iter()
            .any(|f| matches!(&f.expected, Expectation::Rejects { options } if options.is_empty())));
    }

    #[test]
    fn test_best_yields_scenario_shape() {
        let call = documented_calls()
            .into_iter()
            .find(|c| c.method == "get_deposit_options" && c.variant == "best yields helper")
            .unwrap();
        assert_eq!(call.shape.kwargs["user_address"], json!("0x..."));
        assert_eq!(call.shape.kwargs["allowed_assets"], json!(["USDC"]));
        assert_eq!(call.shape.kwargs["allowedNetworks"], json!(["mainnet"]));
    }
}
