//! Order and catalog data model.
//!
//! Three shapes flow through the pipeline:
//! - [`CatalogEntry`]: one restaurant from the offline catalog
//! - [`RawOrder`]: a synthesized (or exported) order before normalization
//! - [`Order`]: the normalized document stored in and served from the order store

mod catalog;
mod order;
mod raw_order;

pub use catalog::{CatalogEntry, Coordinates, MenuItem, Menus, PricedItem};
pub use order::{Address, GeoKind, GeoPoint, Order, Price, Product, Store};
pub use raw_order::{
    AdjustmentType, RawAddress, RawAdjustment, RawLocation, RawOrder, RawPrice, RawProduct,
    RawProductPrice, RawShipping, RawStore, RawStoreLocation,
};

use serde::{Deserialize, Deserializer};

/// Default order status for synthesized and imported orders.
pub const DEFAULT_STATUS: &str = "COMPLETED";
/// Default ISO country code for addresses.
pub const DEFAULT_COUNTRY: &str = "US";
/// Default ISO currency code for prices.
pub const DEFAULT_CURRENCY: &str = "USD";
/// Schema version stamped on synthesized orders.
pub const SCHEMA_VERSION: &str = "11/08/2025";

/// Round a monetary amount to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Deserialize `null` as the type's default.
///
/// Exported order documents carry explicit nulls for fields they do not know;
/// those are treated the same as absent fields.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
