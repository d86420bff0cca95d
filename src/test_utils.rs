//! Order fixtures for tests.
//!
//! Builders for normalized orders with just the fields a test cares about.

use chrono::{DateTime, Utc};

use crate::model::{Address, GeoPoint, Order, Price, Product, Store, SCHEMA_VERSION};
use crate::synth::geo;

/// 2025-10-01T12:00:00Z, the default completion time.
pub fn fixed_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_759_320_000, 0).unwrap_or_default()
}

/// Builder for a normalized order at the service-area hub.
#[derive(Debug, Clone)]
pub struct OrderBuilder {
    order: Order,
}

fn address(line1: &str, location: GeoPoint) -> Address {
    Address {
        line1: line1.to_string(),
        city: geo::CITY.to_string(),
        region: geo::REGION.to_string(),
        postal_code: "08540".to_string(),
        country_code: "US".to_string(),
        location,
    }
}

impl OrderBuilder {
    pub fn new(order_key: &str) -> Self {
        Self {
            order: Order {
                order_key: order_key.to_string(),
                order_completed_at: fixed_time(),
                status: "COMPLETED".to_string(),
                user_id: "10000".to_string(),
                shipping_address: address("1 Nassau St", geo::hub()),
                store: Store {
                    name: "Test Kitchen".to_string(),
                    phone_number: "+16095550100".to_string(),
                    address: address("2 Witherspoon St", geo::hub()),
                },
                price: Price {
                    sub_total: 20.0,
                    tax: 1.4,
                    tip: 3.0,
                    total: 24.4,
                    currency: "USD".to_string(),
                },
                products: vec![Product {
                    name: "Falafel Sandwich".to_string(),
                    quantity: 2,
                    unit_price: 10.0,
                    total: 20.0,
                }],
                schema_version: SCHEMA_VERSION.to_string(),
            },
        }
    }

    pub fn user(mut self, user_id: &str) -> Self {
        self.order.user_id = user_id.to_string();
        self
    }

    pub fn store(mut self, name: &str) -> Self {
        self.order.store.name = name.to_string();
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.order.status = status.to_string();
        self
    }

    pub fn completed_at(mut self, at: DateTime<Utc>) -> Self {
        self.order.order_completed_at = at;
        self
    }

    /// Sets the total; tax and tip are kept as given.
    pub fn total(mut self, total: f64) -> Self {
        self.order.price.total = total;
        self
    }

    pub fn tax_tip(mut self, tax: f64, tip: f64) -> Self {
        self.order.price.tax = tax;
        self.order.price.tip = tip;
        self
    }

    pub fn shipping_at(mut self, longitude: f64, latitude: f64) -> Self {
        self.order.shipping_address.location = GeoPoint::new(longitude, latitude);
        self
    }

    pub fn store_at(mut self, longitude: f64, latitude: f64) -> Self {
        self.order.store.address.location = GeoPoint::new(longitude, latitude);
        self
    }

    pub fn build(self) -> Order {
        self.order
    }
}

/// Point `km` kilometers due north of the hub.
pub fn north_of_hub(km: f64) -> (f64, f64) {
    const KM_PER_DEGREE_LAT: f64 = 111.195;
    (geo::HUB_LONGITUDE, geo::HUB_LATITUDE + km / KM_PER_DEGREE_LAT)
}
