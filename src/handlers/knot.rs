//! Knot proxy endpoints.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::error::{ApiError, ApiJson, ApiQuery};
use super::AppState;
use crate::knot::{handle_webhook, LaunchRequest, SyncRequest};

/// Header carrying the webhook event type.
pub const EVENT_HEADER: &str = "x-knot-event";

const MOCK_ORDER: &str = include_str!("../../fixtures/mock_order.json");

type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/session", post(create_session))
        .route("/session/launch", post(launch_session))
        .route("/transactions/sync", post(sync_transactions))
        .route("/transactions/mock-sync", post(mock_sync_transactions))
        .route("/webhook", post(webhook))
        .route("/mock-order", get(mock_order))
}

#[derive(Debug, Deserialize)]
struct SessionParams {
    external_user_id: String,
}

async fn create_session(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SessionParams>,
) -> ApiResult<Value> {
    Ok(Json(state.knot.create_session(&params.external_user_id).await?))
}

async fn launch_session(
    State(state): State<AppState>,
    ApiJson(launch): ApiJson<LaunchRequest>,
) -> ApiResult<Value> {
    Ok(Json(state.knot.launch_session(&launch).await?))
}

async fn sync_transactions(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SyncRequest>,
) -> ApiResult<Value> {
    info!(
        merchant_id = request.merchant_id,
        external_user_id = %request.external_user_id,
        "syncing transactions"
    );
    Ok(Json(state.knot.sync_transactions(&request).await?))
}

async fn mock_sync_transactions(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SyncRequest>,
) -> ApiResult<Value> {
    Ok(Json(state.knot.sync_transactions_mock(&request).await?))
}

async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<Value>,
) -> Json<Value> {
    let event_type = headers.get(EVENT_HEADER).and_then(|v| v.to_str().ok());
    info!(event_type = event_type.unwrap_or("<none>"), "Knot webhook received");

    let outcome = handle_webhook(state.webhook.as_ref(), event_type, &payload).await;
    Json(json!({ "status": outcome.status() }))
}

async fn mock_order() -> ApiResult<Value> {
    serde_json::from_str(MOCK_ORDER)
        .map(Json)
        .map_err(|e| ApiError::internal(format!("invalid mock order fixture: {e}")))
}
