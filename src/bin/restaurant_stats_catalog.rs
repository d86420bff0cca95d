//! restaurant-stats-catalog: build the restaurant catalog through a text agent.
//!
//! Cities come from the command line, or from `agent.cities` when none are
//! given. The merged catalog is written to `agent.output_path`.
//!
//! ```text
//! restaurant-stats-catalog [-c config.yaml] "Princeton, NJ" "Trenton, NJ"
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use restaurant_stats::catalog::{CatalogBuilder, HttpTextAgent};
use restaurant_stats::config::Config;
use restaurant_stats::utils::bootstrap::{
    init_tracing, parse_config_path, positional_args, write_json,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let config = Config::load(parse_config_path(&args).as_deref()).inspect_err(|e| {
        error!(error = %e, "failed to load configuration");
    })?;
    let agent_config = config.agent;

    let mut queries = positional_args(&args);
    if queries.is_empty() {
        queries = agent_config.cities.clone();
    }
    if agent_config.api_key.is_empty() {
        warn!("agent.api_key is empty; requests will be sent without authorization");
    }

    info!(cities = ?queries, model = %agent_config.model, "building restaurant catalog");

    let delay = Duration::from_millis(agent_config.request_delay_ms);
    let output_path = agent_config.output_path.clone();
    let builder = CatalogBuilder::new(Arc::new(HttpTextAgent::new(agent_config)?), delay);

    let catalog = builder.build(&queries).await;
    if catalog.is_empty() {
        warn!("no restaurants found; writing an empty catalog");
    }

    write_json(&output_path, &catalog)?;
    info!(restaurants = catalog.len(), path = %output_path, "catalog saved");
    Ok(())
}
