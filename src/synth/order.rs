//! Synthetic order composition.

use std::collections::HashSet;

use rand::Rng;
use tracing::{info, warn};

use super::{geo, pricing};
use crate::model::{
    round2, CatalogEntry, GeoPoint, RawLocation, RawOrder, RawShipping, RawStore,
    RawStoreLocation, DEFAULT_STATUS, SCHEMA_VERSION,
};
use crate::utils::retry::{retry_bounded, RetryOutcome};

/// Base for synthetic external user ids.
pub const USER_ID_BASE: u64 = 10_000;
/// Length of a synthetic order id.
pub const ORDER_ID_LEN: usize = 12;
/// URL prefix the order id is appended to.
pub const ORDER_URL_PREFIX: &str = "https://www.doordash.com/orders/";
/// Name used for catalog entries without one.
pub const UNKNOWN_RESTAURANT: &str = "Unknown Restaurant";

/// Failures reported individually before going quiet.
const FAILURE_LOG_LIMIT: usize = 5;
/// Progress is logged every this many slots.
const PROGRESS_INTERVAL: usize = 10;

const ORDER_ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Random lowercase-alphanumeric order id.
pub fn generate_order_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ORDER_ID_LEN)
        .map(|_| ORDER_ID_CHARSET[rng.random_range(0..ORDER_ID_CHARSET.len())] as char)
        .collect()
}

/// Compose one synthetic order from a restaurant.
///
/// Returns `None` when the restaurant has no orderable menu items.
pub fn generate_order<R: Rng + ?Sized>(
    entry: &CatalogEntry,
    index: usize,
    rng: &mut R,
) -> Option<RawOrder> {
    let products = pricing::select_menu_items(entry, rng);
    if products.is_empty() {
        return None;
    }
    let price = pricing::calculate_pricing(&products, rng);

    let name = if entry.restaurant.is_empty() {
        UNKNOWN_RESTAURANT.to_string()
    } else {
        entry.restaurant.clone()
    };

    let mut store_address = geo::parse_address(&entry.address, rng);
    store_address.location = entry
        .coordinates
        .map(|c| GeoPoint::new(c.lon, c.lat))
        .filter(GeoPoint::is_valid);

    Some(RawOrder {
        external_user_id: (USER_ID_BASE + index as u64).to_string(),
        url: format!("{}{}", ORDER_URL_PREFIX, generate_order_id(rng)),
        order_status: Some(DEFAULT_STATUS.to_string()),
        shipping: RawShipping {
            location: RawLocation {
                address: geo::generate_address(rng),
            },
        },
        store: RawStore {
            location: RawStoreLocation {
                address: store_address,
                name,
                phone_number: geo::generate_phone_number(rng),
            },
        },
        price,
        products,
        schema_version: Some(SCHEMA_VERSION.to_string()),
    })
}

/// Outcome of a generation run.
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub orders: Vec<RawOrder>,
    /// Slots that exhausted their retry budget.
    pub failed: usize,
}

impl GenerationReport {
    pub fn total_revenue(&self) -> f64 {
        round2(self.orders.iter().map(|o| o.price.total).sum())
    }

    pub fn average_order_value(&self) -> f64 {
        if self.orders.is_empty() {
            return 0.0;
        }
        round2(self.total_revenue() / self.orders.len() as f64)
    }

    pub fn restaurants_used(&self) -> usize {
        self.orders
            .iter()
            .map(|o| o.store.location.name.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Generate `count` orders from random restaurants.
///
/// Each slot resamples a restaurant up to `max_attempts` times. Slots that
/// never produce an order are counted in [`GenerationReport::failed`]; the
/// run always continues.
pub fn generate_orders<R: Rng + ?Sized>(
    catalog: &[CatalogEntry],
    count: usize,
    max_attempts: u32,
    rng: &mut R,
) -> GenerationReport {
    let mut report = GenerationReport::default();
    if catalog.is_empty() {
        warn!("catalog is empty, no orders generated");
        report.failed = count;
        return report;
    }

    for i in 0..count {
        let outcome = retry_bounded(max_attempts, |_| {
            let entry = &catalog[rng.random_range(0..catalog.len())];
            generate_order(entry, i, rng)
        });

        match outcome {
            RetryOutcome::Succeeded { value, .. } => report.orders.push(value),
            RetryOutcome::Exhausted { attempts } => {
                report.failed += 1;
                if report.failed <= FAILURE_LOG_LIMIT {
                    warn!(slot = i + 1, attempts, "failed to generate order");
                }
            }
        }

        if (i + 1) % PROGRESS_INTERVAL == 0 {
            info!(
                attempted = i + 1,
                total = count,
                generated = report.orders.len(),
                failed = report.failed,
                "generation progress"
            );
        }
    }

    report
}
