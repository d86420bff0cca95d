//! Knot API proxy.
//!
//! Forwards session creation and transaction sync calls to Knot and passes
//! the upstream JSON through unchanged. Calls are not retried.

use std::time::Duration;

use base64::prelude::*;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::KnotConfig;

mod sdk;
mod webhook;

pub use sdk::{compose_sdk_config, LaunchRequest, SdkConfig};
pub use webhook::{
    handle_webhook, AuthenticatedEvent, LoggingWebhookHook, WebhookHook, WebhookOutcome,
    AUTHENTICATED_EVENT,
};

/// API version sent on session creation.
pub const KNOT_VERSION: &str = "2.0";
/// Session type requested from Knot.
pub const SESSION_TYPE: &str = "transaction_link";

/// Errors from Knot calls.
#[derive(Debug, thiserror::Error)]
pub enum KnotError {
    #[error("Knot credentials not configured")]
    CredentialsMissing,

    /// Knot answered with a non-success status.
    #[error("{detail}")]
    Upstream { status: u16, detail: &'static str },

    #[error("Knot request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Knot session response missing 'session' key")]
    MissingSession,
}

pub type Result<T> = std::result::Result<T, KnotError>;

/// Body for transaction sync calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncRequest {
    pub merchant_id: i64,
    pub external_user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

#[derive(Serialize)]
struct SessionRequest<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    external_user_id: &'a str,
}

/// HTTP client for the Knot API.
#[derive(Clone)]
pub struct KnotClient {
    http: Client,
    config: KnotConfig,
}

impl KnotClient {
    pub fn new(config: KnotConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &KnotConfig {
        &self.config
    }

    fn basic_auth(&self) -> Result<String> {
        if !self.config.has_credentials() {
            return Err(KnotError::CredentialsMissing);
        }
        let credentials = format!("{}:{}", self.config.client_id, self.config.client_secret);
        Ok(format!("Basic {}", BASE64_STANDARD.encode(credentials)))
    }

    async fn send(&self, request: RequestBuilder, detail: &'static str) -> Result<Value> {
        let response = request.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), detail, "Knot call failed");
            return Err(KnotError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(response.json().await?)
    }

    /// Create a transaction-link session for a user.
    pub async fn create_session(&self, external_user_id: &str) -> Result<Value> {
        let auth = self.basic_auth()?;
        let url = format!("{}/session/create", self.config.api_base);
        debug!(%url, external_user_id, "creating Knot session");

        let request = self
            .http
            .post(url)
            .header("Authorization", auth)
            .header("Knot-Version", KNOT_VERSION)
            .json(&SessionRequest {
                kind: SESSION_TYPE,
                external_user_id,
            });
        self.send(request, "Failed to create Knot session").await
    }

    /// Sync a user's transactions for a merchant.
    pub async fn sync_transactions(&self, request: &SyncRequest) -> Result<Value> {
        let auth = self.basic_auth()?;
        let mut body = request.clone();
        if body.cursor.as_deref().is_some_and(str::is_empty) {
            body.cursor = None;
        }

        let request = self
            .http
            .post(format!("{}/transactions/sync", self.config.api_base))
            .header("Authorization", auth)
            .json(&body);
        self.send(request, "Failed to sync transactions").await
    }

    /// Sync against the mock tunnel. No credentials, no cursor.
    pub async fn sync_transactions_mock(&self, request: &SyncRequest) -> Result<Value> {
        let body = SyncRequest {
            cursor: None,
            ..request.clone()
        };
        let request = self
            .http
            .post(format!("{}/transactions/sync", self.config.tunnel_base))
            .json(&body);
        self.send(request, "Failed to sync transactions (mock)").await
    }

    /// Create a session and the SDK configuration a client needs to launch it.
    pub async fn launch_session(&self, launch: &LaunchRequest) -> Result<Value> {
        let session = self.create_session(&launch.external_user_id).await?;
        let session_id = session
            .get("session")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or(KnotError::MissingSession)?;

        let sdk_config = compose_sdk_config(&self.config, session_id, launch);
        Ok(serde_json::json!({
            "session": session,
            "sdkConfig": sdk_config,
        }))
    }
}
