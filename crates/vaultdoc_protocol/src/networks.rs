//! Supported-network resolution.
//!
//! The current list comes from a dynamic lookup when one is available. Any
//! lookup failure falls back to the documented snapshot in
//! [`SUPPORTED_NETWORKS`](crate::catalog::SUPPORTED_NETWORKS).

use crate::catalog::SUPPORTED_NETWORKS;
use crate::error::{ProtocolError, Result};
use serde::Serialize;

/// Source of the current network list.
pub trait NetworkLookup {
    fn fetch_networks(&self) -> Result<Vec<String>>;
}

/// Lookup that is never available; resolution always uses the fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLookup;

impl NetworkLookup for NoLookup {
    fn fetch_networks(&self) -> Result<Vec<String>> {
        Err(ProtocolError::LookupUnavailable(
            "dynamic lookup disabled".to_string(),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkSource {
    Dynamic,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkList {
    pub names: Vec<String>,
    pub source: NetworkSource,
    /// Why the fallback was used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl NetworkList {
    pub fn contains(&self, network: &str) -> bool {
        self.names.iter().any(|n| n == network)
    }
}

pub fn fallback_networks() -> Vec<String> {
    SUPPORTED_NETWORKS.iter().map(|n| n.to_string()).collect()
}

/// Resolve the supported networks, preferring the lookup.
pub fn resolve_supported_networks(lookup: &dyn NetworkLookup) -> NetworkList {
    let reason = match lookup.fetch_networks() {
        Ok(names) if !names.is_empty() => {
            return NetworkList {
                names,
                source: NetworkSource::Dynamic,
                fallback_reason: None,
            }
        }
        Ok(_) => ProtocolError::EmptyLookup.to_string(),
        Err(e) => e.to_string(),
    };

    NetworkList {
        names: fallback_networks(),
        source: NetworkSource::Fallback,
        fallback_reason: Some(reason),
    }
}

/// Check a network name against the resolved list.
pub fn validate_network(lookup: &dyn NetworkLookup, network: &str) -> bool {
    resolve_supported_networks(lookup).contains(network)
}

/// Network identifiers are non-empty and lowercase.
pub fn is_well_formed_network(name: &str) -> bool {
    !name.is_empty() && name == name.to_lowercase()
}
