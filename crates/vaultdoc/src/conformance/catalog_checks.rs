//! Checks over the documented value catalogues. These need no SDK.

use vaultdoc_protocol::catalog::{ACTION_TYPES, ASSET_SYMBOLS, SUPPORTED_NETWORKS};
use vaultdoc_protocol::networks::is_well_formed_network;
use vaultdoc_protocol::{
    resolve_supported_networks, ApiConfig, NetworkLookup, NetworkSource,
    TestOutcome,
};

const DOCUMENTED_NETWORK_COUNT: usize = 13;
const KEY_NETWORKS: [&str; 3] = ["mainnet", "base", "arbitrum"];

pub fn network_catalog_outcomes() -> Vec<TestOutcome> {
    let malformed: Vec<&str> = SUPPORTED_NETWORKS
        .iter()
        .copied()
        .filter(|n| !is_well_formed_network(n))
        .collect();
    let absent: Vec<&str> = KEY_NETWORKS
        .iter()
        .copied()
        .filter(|k| !SUPPORTED_NETWORKS.contains(k))
        .collect();

    vec![
        TestOutcome::from_check(
            "documented networks: 13 entries",
            SUPPORTED_NETWORKS.len() == DOCUMENTED_NETWORK_COUNT,
            format!("found {} entries", SUPPORTED_NETWORKS.len()),
        ),
        TestOutcome::from_check(
            "documented networks are lowercase and non-empty",
            malformed.is_empty(),
            format!("malformed: {}", malformed.join(", ")),
        ),
        TestOutcome::from_check(
            "documented networks include mainnet, base, arbitrum",
            absent.is_empty(),
            format!("absent: {}", absent.join(", ")),
        ),
    ]
}

pub fn asset_symbol_outcomes() -> Vec<TestOutcome> {
    ASSET_SYMBOLS
        .iter()
        .map(|asset| {
            TestOutcome::from_check(
                format!("asset symbol {} is uppercase", asset),
                !asset.is_empty() && *asset == asset.to_uppercase(),
                format!("'{}' is not a non-empty uppercase symbol", asset),
            )
        })
        .collect()
}

pub fn action_type_outcomes() -> Vec<TestOutcome> {
    ACTION_TYPES
        .iter()
        .map(|action| {
            TestOutcome::from_check(
                format!("action type {} is lowercase", action),
                !action.is_empty() && *action == action.to_lowercase(),
                format!("'{}' is not a non-empty lowercase action", action),
            )
        })
        .collect()
}

pub fn api_configuration_outcomes(config: &ApiConfig) -> Vec<TestOutcome> {
    let base = match config.base() {
        Ok(url) => TestOutcome::from_check(
            "API base URL is https on vaults.fyi",
            url.host_str().map_or(false, |h| h.contains("vaults.fyi")),
            format!("unexpected host in {}", config.base_url),
        ),
        Err(e) => TestOutcome::failed("API base URL is https on vaults.fyi", e.to_string()),
    };
    let networks = match config.networks_endpoint() {
        Ok(url) => TestOutcome::from_check(
            "networks endpoint",
            url.as_str() == "https://api.vaults.fyi/v2/networks",
            format!("resolved to {}", url),
        ),
        Err(e) => TestOutcome::failed("networks endpoint", e.to_string()),
    };

    vec![
        base,
        TestOutcome::from_check(
            "API version is v2",
            config.version == "v2",
            format!("got {}", config.version),
        ),
        TestOutcome::from_check(
            "auth header is x-api-key",
            config.auth_header == "x-api-key",
            format!("got {}", config.auth_header),
        ),
        TestOutcome::from_check(
            "response format is JSON",
            config.response_format == "JSON",
            format!("got {}", config.response_format),
        ),
        networks,
    ]
}

/// Resolve the current network list once and check membership against it.
pub fn network_resolution_outcomes(lookup: &dyn NetworkLookup) -> Vec<TestOutcome> {
    let list = resolve_supported_networks(lookup);
    let source = match list.source {
        NetworkSource::Dynamic => "dynamic lookup".to_string(),
        NetworkSource::Fallback => format!(
            "fallback list ({})",
            list.fallback_reason.as_deref().unwrap_or("no reason given")
        ),
    };
    let malformed: Vec<&str> = list
        .names
        .iter()
        .map(String::as_str)
        .filter(|n| !is_well_formed_network(n))
        .collect();

    let resolved = if list.names.is_empty() {
        TestOutcome::failed("supported networks resolve", "resolved list is empty")
    } else if !malformed.is_empty() {
        TestOutcome::failed(
            "supported networks resolve",
            format!("malformed names from {}: {}", source, malformed.join(", ")),
        )
    } else {
        TestOutcome::passed("supported networks resolve")
            .with_detail(format!("{} networks from {}", list.names.len(), source))
    };

    vec![
        resolved,
        TestOutcome::from_check(
            "validate_network accepts mainnet",
            list.contains("mainnet"),
            format!("mainnet not in list from {}", source),
        ),
        TestOutcome::from_check(
            "validate_network rejects unknown network",
            !list.contains("not-a-network"),
            "unknown network accepted",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use vaultdoc_protocol::{NoLookup, ProtocolError};

    struct Listed(Vec<&'static str>);

    impl NetworkLookup for Listed {
        fn fetch_networks(&self) -> vaultdoc_protocol::Result<Vec<String>> {
            if self.0.is_empty() {
                return Err(ProtocolError::LookupUnavailable("offline".to_string()));
            }
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    #[test]
    fn test_catalog_checks_pass() {
        let outcomes: Vec<TestOutcome> = network_catalog_outcomes()
            .into_iter()
            .chain(asset_symbol_outcomes())
            .chain(action_type_outcomes())
            .chain(api_configuration_outcomes(&ApiConfig::default()))
            .collect();
        assert_eq!(outcomes.len(), 3 + 5 + 2 + 5);
        for outcome in &outcomes {
            assert!(outcome.is_passed(), "{} failed: {:?}", outcome.name, outcome.detail);
        }
    }

    #[test]
    fn test_plain_http_base_url_fails() {
        let config = ApiConfig {
            base_url: "http://api.vaults.fyi".to_string(),
            ..ApiConfig::default()
        };
        let outcomes = api_configuration_outcomes(&config);
        assert!(outcomes[0].is_failed());
        assert!(outcomes[0].detail.as_deref().unwrap().contains("https"));
    }

    #[test]
    fn test_resolution_with_fallback() {
        let outcomes = network_resolution_outcomes(&NoLookup);
        assert!(outcomes.iter().all(|o| o.is_passed()));
        assert!(outcomes[0].detail.as_deref().unwrap().contains("fallback"));
    }

    #[test]
    fn test_resolution_with_dynamic_list() {
        let outcomes = network_resolution_outcomes(&Listed(vec!["mainnet", "sonic"]));
        assert!(outcomes.iter().all(|o| o.is_passed()));
        assert!(outcomes[0].detail.as_deref().unwrap().contains("dynamic"));
    }

    #[test]
    fn test_resolution_rejects_malformed_dynamic_names() {
        let outcomes = network_resolution_outcomes(&Listed(vec!["Mainnet"]));
        assert!(outcomes[0].is_failed());
        assert!(outcomes[1].is_failed());
    }

    struct Counting {
        calls: Cell<usize>,
        reachable: bool,
    }

    impl NetworkLookup for Counting {
        fn fetch_networks(&self) -> vaultdoc_protocol::Result<Vec<String>> {
            self.calls.set(self.calls.get() + 1);
            if !self.reachable {
                return Err(ProtocolError::LookupUnavailable("timed out".to_string()));
            }
            Ok(vec!["mainnet".to_string(), "base".to_string()])
        }
    }

    #[test]
    fn test_resolution_fetches_once() {
        for reachable in [true, false] {
            let lookup = Counting {
                calls: Cell::new(0),
                reachable,
            };
            let outcomes = network_resolution_outcomes(&lookup);
            assert_eq!(outcomes.len(), 3);
            assert!(outcomes.iter().all(|o| o.is_passed()));
            assert_eq!(lookup.calls.get(), 1, "reachable = {}", reachable);
        }
    }
}
