//! Documented REST API configuration of vaults.fyi.
//!
//! These values are referenced by documentation examples only; the harness never
//! issues requests against them.

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

pub const API_BASE_URL: &str = "https://api.vaults.fyi";
pub const API_VERSION: &str = "v2";
pub const AUTH_HEADER: &str = "x-api-key";
pub const RESPONSE_FORMAT: &str = "JSON";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub version: String,
    pub auth_header: String,
    pub response_format: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_string(),
            version: API_VERSION.to_string(),
            auth_header: AUTH_HEADER.to_string(),
            response_format: RESPONSE_FORMAT.to_string(),
        }
    }
}

impl ApiConfig {
    /// Parse and check the base URL: absolute, https, with a host.
    pub fn base(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url).map_err(|e| ProtocolError::InvalidUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "https" {
            return Err(ProtocolError::InvalidUrl {
                url: self.base_url.clone(),
                reason: format!("scheme must be https, got {}", url.scheme()),
            });
        }
        if url.host_str().is_none() {
            return Err(ProtocolError::InvalidUrl {
                url: self.base_url.clone(),
                reason: "missing host".to_string(),
            });
        }
        Ok(url)
    }

    /// `<base>/<version>/<path>`
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!("{}/{}", self.version, path.trim_start_matches('/'));
        self.base()?
            .join(&joined)
            .map_err(|e| ProtocolError::InvalidUrl {
                url: joined,
                reason: e.to_string(),
            })
    }

    pub fn networks_endpoint(&self) -> Result<Url> {
        self.endpoint("networks")
    }
}
