//! restaurant-stats-generate: synthesize orders from the restaurant catalog.
//!
//! Reads `generator.catalog_path`, writes `generator.orders_path`. An
//! optional positional argument overrides `generator.num_orders`.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use tracing::{error, info, warn};

use restaurant_stats::config::Config;
use restaurant_stats::catalog::parse_entries;
use restaurant_stats::synth::generate_orders;
use restaurant_stats::utils::bootstrap::{
    init_tracing, parse_config_path, positional_args, read_json, write_json,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let config = Config::load(parse_config_path(&args).as_deref()).inspect_err(|e| {
        error!(error = %e, "failed to load configuration");
    })?;
    let generator = config.generator;

    let count = match positional_args(&args).first() {
        Some(n) => n.parse::<usize>()?,
        None => generator.num_orders,
    };

    let values: Vec<Value> = read_json(&generator.catalog_path)?;
    let listed = values.len();
    let catalog = parse_entries(values);
    if catalog.len() < listed {
        warn!(
            skipped = listed - catalog.len(),
            "catalog entries could not be decoded"
        );
    }
    info!(
        restaurants = catalog.len(),
        path = %generator.catalog_path,
        "loaded restaurant catalog"
    );

    let mut rng = match generator.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let report = generate_orders(&catalog, count, generator.max_attempts, &mut rng);

    write_json(&generator.orders_path, &report.orders)?;
    info!(
        generated = report.orders.len(),
        requested = count,
        failed = report.failed,
        total_revenue = report.total_revenue(),
        average_order_value = report.average_order_value(),
        restaurants_used = report.restaurants_used(),
        path = %generator.orders_path,
        "orders saved"
    );
    Ok(())
}
