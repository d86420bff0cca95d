//! MongoDB implementation of the order store.

mod documents;
mod order_store;

pub use order_store::MongoOrderStore;

/// Default collection name.
pub(crate) const ORDERS_COLLECTION: &str = "orders";

/// Server error code for a unique index violation.
pub(crate) const DUPLICATE_KEY_CODE: i32 = 11000;

/// Earth radius MongoDB uses for spherical geometry, in kilometers.
pub(crate) const EARTH_RADIUS_KM: f64 = 6378.1;
