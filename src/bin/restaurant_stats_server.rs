//! restaurant-stats-server: order statistics API and Knot proxy.
//!
//! Connects to MongoDB (retrying with backoff), makes sure the order
//! indexes exist, then serves the HTTP API.
//!
//! ## Configuration
//! - `--config <path>` / `RESTAURANT_STATS_CONFIG`: YAML config file
//! - `RESTAURANT_STATS__SERVER__PORT`, `RESTAURANT_STATS__STORAGE__MONGODB__URI`, ...
//! - `RESTAURANT_STATS_LOG`: tracing filter (default `info`)

use std::sync::Arc;

use tracing::{error, info};

use restaurant_stats::config::Config;
use restaurant_stats::handlers::{serve, AppState};
use restaurant_stats::ingest::ensure_indexes;
use restaurant_stats::knot::{KnotClient, LoggingWebhookHook};
use restaurant_stats::query::OrderQueryService;
use restaurant_stats::storage::{MongoOrderStore, OrderStore};
use restaurant_stats::utils::bootstrap::{init_tracing, parse_config_path};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_path = parse_config_path(std::env::args());
    let config = Config::load(config_path.as_deref()).inspect_err(|e| {
        error!(error = %e, "failed to load configuration");
    })?;

    info!(
        bind = %config.server.bind_address(),
        database = %config.storage.mongodb.database,
        knot_credentials = config.knot.has_credentials(),
        "starting restaurant-stats-server"
    );

    let store: Arc<dyn OrderStore> = Arc::new(
        MongoOrderStore::connect(&config.storage.mongodb)
            .await
            .inspect_err(|e| error!(error = %e, "failed to connect to MongoDB"))?,
    );
    ensure_indexes(store.as_ref()).await;

    let state = AppState {
        queries: OrderQueryService::new(store),
        knot: KnotClient::new(config.knot.clone())?,
        webhook: Arc::new(LoggingWebhookHook),
    };

    serve(state, &config.server)
        .await
        .map_err(|e| -> Box<dyn std::error::Error> { e })
}
