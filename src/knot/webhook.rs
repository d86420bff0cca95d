//! Knot webhook handling.

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

/// Event type that carries a newly linked merchant account.
pub const AUTHENTICATED_EVENT: &str = "AUTHENTICATED";

/// Identifiers extracted from an `AUTHENTICATED` event.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedEvent {
    pub merchant_id: Option<Value>,
    pub external_user_id: Option<String>,
}

/// Receives authenticated-account events.
#[async_trait]
pub trait WebhookHook: Send + Sync {
    async fn on_authenticated(&self, event: AuthenticatedEvent);
}

/// Hook that only logs the event.
#[derive(Debug, Default)]
pub struct LoggingWebhookHook;

#[async_trait]
impl WebhookHook for LoggingWebhookHook {
    async fn on_authenticated(&self, event: AuthenticatedEvent) {
        info!(
            merchant_id = ?event.merchant_id,
            external_user_id = ?event.external_user_id,
            "Knot account authenticated"
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Handled,
    Ignored,
}

impl WebhookOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            WebhookOutcome::Handled => "authenticated event handled",
            WebhookOutcome::Ignored => "ignored",
        }
    }
}

/// Dispatch a webhook delivery by its `X-Knot-Event` value.
pub async fn handle_webhook(
    hook: &dyn WebhookHook,
    event_type: Option<&str>,
    payload: &Value,
) -> WebhookOutcome {
    if event_type != Some(AUTHENTICATED_EVENT) {
        return WebhookOutcome::Ignored;
    }

    let event = AuthenticatedEvent {
        merchant_id: payload.get("merchantId").filter(|v| !v.is_null()).cloned(),
        external_user_id: payload
            .get("externalUserId")
            .and_then(Value::as_str)
            .map(str::to_string),
    };
    hook.on_authenticated(event).await;
    WebhookOutcome::Handled
}
