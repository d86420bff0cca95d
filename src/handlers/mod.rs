//! HTTP API.
//!
//! Order queries live under `/api/orders`, the Knot proxy directly under
//! `/api`. `GET /` and `GET /health` are served at the root.

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::knot::{KnotClient, WebhookHook};
use crate::query::OrderQueryService;

mod error;
mod knot;
mod orders;

pub use error::{ApiError, ApiJson, ApiQuery};
pub use knot::EVENT_HEADER;

pub const API_TITLE: &str = "Restaurant Stats API";

/// Shared, read-only handler state.
#[derive(Clone)]
pub struct AppState {
    pub queries: OrderQueryService,
    pub knot: KnotClient,
    pub webhook: Arc<dyn WebhookHook>,
}

/// Build the axum router (separated for testing).
pub fn router(state: AppState, cors_allow_any: bool) -> Router {
    let api = Router::new()
        .nest("/orders", orders::routes())
        .merge(knot::routes());

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors_allow_any {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    }
}

/// Bind and serve until the process is stopped.
pub async fn serve(
    state: AppState,
    config: &ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(state, config.cors_allow_any);
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "{API_TITLE} listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": API_TITLE,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
