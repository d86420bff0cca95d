//! Batch pipeline configuration: order generation and ingestion.

use serde::Deserialize;

use crate::transform::LocationPolicy;

/// Synthetic order generation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub num_orders: usize,
    /// Restaurants tried per order slot before giving up on it.
    pub max_attempts: u32,
    /// Catalog JSON file read by the generator.
    pub catalog_path: String,
    /// Generated orders JSON file, also read by ingest.
    pub orders_path: String,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_orders: 500,
            max_attempts: 5,
            catalog_path: "restaurants.json".to_string(),
            orders_path: "generated_orders.json".to_string(),
            seed: None,
        }
    }
}

/// Upper bound for `ingest.days_ago_max` (about a century).
pub const MAX_DAYS_AGO: u32 = 36_500;

/// Transform and insert settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub batch_size: usize,
    pub location_policy: LocationPolicy,
    /// Completion dates are drawn from this many days in the past.
    pub days_ago_min: u32,
    pub days_ago_max: u32,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            location_policy: LocationPolicy::default(),
            days_ago_min: 1,
            days_ago_max: 90,
        }
    }
}
