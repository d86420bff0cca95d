//! Knot API proxy configuration.

use serde::Deserialize;

/// Knot API configuration.
///
/// Credentials are optional at load time; calls that need them fail with a
/// configuration error instead of preventing the server from starting.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KnotConfig {
    /// Base URL of the Knot API.
    pub api_base: String,
    /// Base URL of the mock transaction tunnel.
    pub tunnel_base: String,
    pub client_id: String,
    pub client_secret: String,
    /// Knot environment name handed to the client SDK.
    pub environment: String,
    /// Product used when a launch request does not name one.
    pub default_product: String,
    /// Merchants offered when a launch request does not list any.
    pub default_merchant_ids: Vec<u32>,
    /// Per-request timeout for upstream calls.
    pub timeout_secs: u64,
}

impl Default for KnotConfig {
    fn default() -> Self {
        Self {
            api_base: "https://development.knotapi.com".to_string(),
            tunnel_base: "https://knot.tunnel.tel".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            environment: "development".to_string(),
            default_product: "transaction_link".to_string(),
            default_merchant_ids: vec![19],
            timeout_secs: 30,
        }
    }
}

impl KnotConfig {
    /// Whether both halves of the API credentials are present.
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knot_config_default() {
        let config = KnotConfig::default();
        assert_eq!(config.api_base, "https://development.knotapi.com");
        assert_eq!(config.default_merchant_ids, vec![19]);
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_has_credentials_needs_both() {
        let config = KnotConfig {
            client_id: "id".to_string(),
            ..Default::default()
        };
        assert!(!config.has_credentials());
    }
}
