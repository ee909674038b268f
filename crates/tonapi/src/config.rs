//! Streaming client configuration.

use serde::{Deserialize, Serialize};

use crate::logging::LogConfig;
use crate::TONAPI_URL;

/// Environment variable overriding the API endpoint.
pub const ENDPOINT_ENV: &str = "TONAPI_ENDPOINT";
/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "TONAPI_TOKEN";

/// Where to connect and how to authenticate.
///
/// Deserializes from any serde format; every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamingConfig {
    /// API root, e.g. `https://tonapi.io`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Bearer token. `None` (or empty) connects unauthenticated.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_endpoint() -> String {
    TONAPI_URL.to_string()
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            token: None,
            log: LogConfig::default(),
        }
    }
}

impl StreamingConfig {
    /// Defaults overridden by `TONAPI_ENDPOINT` and `TONAPI_TOKEN`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.is_empty()) {
            config.endpoint = endpoint;
        }
        config.token = lookup(TOKEN_ENV).filter(|v| !v.is_empty());
        config
    }
}
