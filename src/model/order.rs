//! Normalized order documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// GeoJSON point. Coordinates are `[longitude, latitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: GeoKind,
    pub coordinates: [f64; 2],
}

/// GeoJSON geometry type. Only points are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeoKind {
    #[default]
    Point,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: GeoKind::Point,
            coordinates: [longitude, latitude],
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }

    /// Whether the point is usable by a `2dsphere` index.
    pub fn is_valid(&self) -> bool {
        let (lon, lat) = (self.longitude(), self.latitude());
        lon.is_finite()
            && lat.is_finite()
            && (-180.0..=180.0).contains(&lon)
            && (-90.0..=90.0).contains(&lat)
    }

    /// Great-circle distance in kilometers (haversine, mean Earth radius).
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0088;

        let (lat1, lat2) = (self.latitude().to_radians(), other.latitude().to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.longitude() - self.longitude()).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// Postal address with a geo-point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub city: String,
    pub region: String,
    #[serde(rename = "postalCode")]
    pub postal_code: String,
    #[serde(rename = "countryCode")]
    pub country_code: String,
    pub location: GeoPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub name: String,
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    pub address: Address,
}

/// Flattened price breakdown. Tax and tip are summed out of the adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    #[serde(rename = "subTotal")]
    pub sub_total: f64,
    pub tax: f64,
    pub tip: f64,
    pub total: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub quantity: u32,
    #[serde(rename = "unitPrice")]
    pub unit_price: f64,
    pub total: f64,
}

/// A normalized, query-ready order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique key, taken from the last segment of the order URL.
    pub order_key: String,
    pub order_completed_at: DateTime<Utc>,
    pub status: String,
    pub user_id: String,
    pub shipping_address: Address,
    pub store: Store,
    pub price: Price,
    pub products: Vec<Product>,
    pub schema_version: String,
}
