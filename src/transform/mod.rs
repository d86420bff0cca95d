//! Raw order normalization.
//!
//! Converts delivery-platform style [`RawOrder`] records into the stored
//! [`Order`] schema: derives the order key from the URL, back-dates the
//! completion time, assigns geo-points and flattens the price breakdown.

use std::ops::RangeInclusive;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::{IngestConfig, MAX_DAYS_AGO};
use crate::model::{
    Address, AdjustmentType, Order, Price, Product, RawAddress, RawOrder, Store, DEFAULT_COUNTRY,
    DEFAULT_CURRENCY, DEFAULT_STATUS, SCHEMA_VERSION,
};
use crate::synth::geo;

/// Errors from normalizing a single order.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Order URL '{0}' has no order key")]
    MissingOrderKey(String),

    #[error("Malformed order record: {0}")]
    Decode(#[from] serde_json::Error),
}

/// How address geo-points are assigned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationPolicy {
    /// Always assign a fresh point in the service area.
    #[default]
    Synthesize,
    /// Keep a valid input point; synthesize only when missing or invalid.
    PreferInput,
}

#[derive(Debug, Clone)]
pub struct TransformOptions {
    pub location_policy: LocationPolicy,
    /// Completion dates fall this many whole days before now.
    pub days_ago: RangeInclusive<u32>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            location_policy: LocationPolicy::default(),
            days_ago: 1..=90,
        }
    }
}

impl From<&IngestConfig> for TransformOptions {
    fn from(config: &IngestConfig) -> Self {
        Self {
            location_policy: config.location_policy,
            days_ago: config.days_ago_min..=config.days_ago_max,
        }
    }
}

/// Last path segment of an order URL.
///
/// Strings that are not absolute URLs are split on `/` as-is.
pub fn extract_order_key(url: &str) -> Result<String, TransformError> {
    let key = match url::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_string(),
        Err(_) => url.rsplit('/').next().unwrap_or_default().to_string(),
    };

    if key.is_empty() {
        return Err(TransformError::MissingOrderKey(url.to_string()));
    }
    Ok(key)
}

/// Normalize one raw order, timestamped relative to now.
pub fn transform_order<R: Rng + ?Sized>(
    raw: RawOrder,
    options: &TransformOptions,
    rng: &mut R,
) -> Result<Order, TransformError> {
    transform_order_at(raw, options, Utc::now(), rng)
}

/// Normalize one raw order with an explicit reference time.
pub fn transform_order_at<R: Rng + ?Sized>(
    raw: RawOrder,
    options: &TransformOptions,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<Order, TransformError> {
    let order_key = extract_order_key(&raw.url)?;
    let order_completed_at = completed_at(now, &options.days_ago, rng);

    let tax = raw.price.sum_of(&AdjustmentType::Tax);
    let tip = raw.price.sum_of(&AdjustmentType::Tip);

    let shipping_address = to_address(raw.shipping.location.address, options.location_policy, rng);
    let store_location = raw.store.location;
    let store = Store {
        name: store_location.name,
        phone_number: store_location.phone_number,
        address: to_address(store_location.address, options.location_policy, rng),
    };

    let price = Price {
        sub_total: raw.price.sub_total,
        tax,
        tip,
        total: raw.price.total,
        currency: raw
            .price
            .currency
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
    };

    let products = raw
        .products
        .into_iter()
        .map(|p| Product {
            name: p.name,
            quantity: p.quantity,
            unit_price: p.price.unit_price,
            total: p.price.total,
        })
        .collect();

    Ok(Order {
        order_key,
        order_completed_at,
        status: raw
            .order_status
            .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        user_id: raw.external_user_id,
        shipping_address,
        store,
        price,
        products,
        schema_version: raw
            .schema_version
            .unwrap_or_else(|| SCHEMA_VERSION.to_string()),
    })
}

fn completed_at<R: Rng + ?Sized>(
    now: DateTime<Utc>,
    days_ago: &RangeInclusive<u32>,
    rng: &mut R,
) -> DateTime<Utc> {
    let days = rng.random_range(days_ago.clone()).min(MAX_DAYS_AGO);
    let hours = rng.random_range(0..=23);
    let minutes = rng.random_range(0..=59);
    now - Duration::days(i64::from(days)) + Duration::hours(hours) + Duration::minutes(minutes)
}

fn to_address<R: Rng + ?Sized>(raw: RawAddress, policy: LocationPolicy, rng: &mut R) -> Address {
    let location = match policy {
        LocationPolicy::Synthesize => geo::generate_point(rng),
        LocationPolicy::PreferInput => raw
            .location
            .filter(|point| point.is_valid())
            .unwrap_or_else(|| geo::generate_point(rng)),
    };

    Address {
        line1: raw.line1,
        city: raw.city,
        region: raw.region,
        postal_code: raw.postal_code,
        country_code: raw
            .country_code
            .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
        location,
    }
}

/// Result of normalizing a batch of raw records.
#[derive(Debug, Default)]
pub struct TransformReport {
    pub orders: Vec<Order>,
    /// Records that failed to decode or transform.
    pub skipped: usize,
}

/// Decode and normalize each record independently.
///
/// Failures are logged with the record's 1-based position and skipped.
pub fn transform_batch<R: Rng + ?Sized>(
    values: Vec<serde_json::Value>,
    options: &TransformOptions,
    rng: &mut R,
) -> TransformReport {
    let mut report = TransformReport::default();

    for (i, value) in values.into_iter().enumerate() {
        let result = serde_json::from_value::<RawOrder>(value)
            .map_err(TransformError::from)
            .and_then(|raw| transform_order(raw, options, rng));

        match result {
            Ok(order) => report.orders.push(order),
            Err(e) => {
                report.skipped += 1;
                warn!(position = i + 1, error = %e, "failed to transform order");
            }
        }
    }

    info!(
        transformed = report.orders.len(),
        skipped = report.skipped,
        "transformed orders"
    );
    report
}
