//! restaurant-stats-ingest: normalize generated orders and load them into MongoDB.
//!
//! Reads the orders file (positional argument, else `generator.orders_path`),
//! transforms each record, inserts in batches and provisions indexes.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use tracing::{error, info};

use restaurant_stats::config::Config;
use restaurant_stats::ingest::run_ingest;
use restaurant_stats::storage::MongoOrderStore;
use restaurant_stats::transform::TransformOptions;
use restaurant_stats::utils::bootstrap::{
    init_tracing, parse_config_path, positional_args, read_json,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let config = Config::load(parse_config_path(&args).as_deref()).inspect_err(|e| {
        error!(error = %e, "failed to load configuration");
    })?;

    let input = positional_args(&args)
        .into_iter()
        .next()
        .unwrap_or_else(|| config.generator.orders_path.clone());
    let raw_orders: Vec<Value> = read_json(&input)?;
    info!(count = raw_orders.len(), path = %input, "loaded raw orders");

    let store = MongoOrderStore::connect(&config.storage.mongodb)
        .await
        .inspect_err(|e| error!(error = %e, "failed to connect to MongoDB"))?;

    let options = TransformOptions::from(&config.ingest);
    let mut rng = StdRng::from_os_rng();
    let report = run_ingest(
        &store,
        raw_orders,
        &options,
        config.ingest.batch_size,
        &mut rng,
    )
    .await;

    info!(
        in_file = report.in_file,
        transformed = report.transformed,
        inserted = report.inserted,
        database = %config.storage.mongodb.database,
        collection = %config.storage.mongodb.collection,
        "ingest finished"
    );
    Ok(())
}
