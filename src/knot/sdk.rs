//! Client SDK launch configuration.

use serde::{Deserialize, Serialize};

use crate::config::KnotConfig;

/// Default SDK entry point.
pub const DEFAULT_ENTRY_POINT: &str = "api";

/// Launch request; unset options fall back to configured defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LaunchRequest {
    pub external_user_id: String,
    pub product: Option<String>,
    pub merchant_ids: Option<Vec<u32>>,
    pub entry_point: Option<String>,
    pub use_categories: Option<bool>,
    pub use_search: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkConfig {
    pub session_id: String,
    pub client_id: String,
    pub environment: String,
    pub product: String,
    pub merchant_ids: Vec<u32>,
    pub use_categories: bool,
    pub use_search: bool,
    pub entry_point: String,
}

/// Build the SDK configuration for a created session.
///
/// An explicit empty merchant list is kept as-is; only an absent one falls
/// back to the default list.
pub fn compose_sdk_config(config: &KnotConfig, session_id: &str, launch: &LaunchRequest) -> SdkConfig {
    SdkConfig {
        session_id: session_id.to_string(),
        client_id: config.client_id.clone(),
        environment: config.environment.clone(),
        product: launch
            .product
            .clone()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| config.default_product.clone()),
        merchant_ids: launch
            .merchant_ids
            .clone()
            .unwrap_or_else(|| config.default_merchant_ids.clone()),
        use_categories: launch.use_categories.unwrap_or(true),
        use_search: launch.use_search.unwrap_or(true),
        entry_point: launch
            .entry_point
            .clone()
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_ENTRY_POINT.to_string()),
    }
}
