//! Pre-normalization order records.
//!
//! Mirrors the delivery-platform export format (camelCase). Every field is
//! optional on input: absent or null values decode to defaults so that a
//! partial export still transforms.

use serde::{Deserialize, Serialize};

use super::{null_default, GeoPoint};

/// Adjustment category applied to an order subtotal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdjustmentType {
    Fee,
    Tax,
    Discount,
    Tip,
    Other(String),
}

impl AdjustmentType {
    /// Parse case-insensitively.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "FEE" => AdjustmentType::Fee,
            "TAX" => AdjustmentType::Tax,
            "DISCOUNT" => AdjustmentType::Discount,
            "TIP" => AdjustmentType::Tip,
            _ => AdjustmentType::Other(value.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AdjustmentType::Fee => "FEE",
            AdjustmentType::Tax => "TAX",
            AdjustmentType::Discount => "DISCOUNT",
            AdjustmentType::Tip => "TIP",
            AdjustmentType::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAddress {
    #[serde(deserialize_with = "null_default")]
    pub line1: String,
    #[serde(deserialize_with = "null_default")]
    pub city: String,
    #[serde(deserialize_with = "null_default")]
    pub region: String,
    #[serde(rename = "postalCode", deserialize_with = "null_default")]
    pub postal_code: String,
    #[serde(rename = "countryCode", skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// Only present in exports that carry real coordinates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawLocation {
    #[serde(deserialize_with = "null_default")]
    pub address: RawAddress,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawShipping {
    #[serde(deserialize_with = "null_default")]
    pub location: RawLocation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawStoreLocation {
    #[serde(deserialize_with = "null_default")]
    pub address: RawAddress,
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    #[serde(rename = "phoneNumber", deserialize_with = "null_default")]
    pub phone_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawStore {
    #[serde(deserialize_with = "null_default")]
    pub location: RawStoreLocation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAdjustment {
    #[serde(rename = "type", deserialize_with = "null_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_default")]
    pub label: String,
    #[serde(deserialize_with = "null_default")]
    pub amount: f64,
}

impl RawAdjustment {
    pub fn new(kind: AdjustmentType, label: &str, amount: f64) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            label: label.to_string(),
            amount,
        }
    }

    pub fn adjustment_type(&self) -> AdjustmentType {
        AdjustmentType::parse(&self.kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPrice {
    #[serde(rename = "subTotal", deserialize_with = "null_default")]
    pub sub_total: f64,
    #[serde(deserialize_with = "null_default")]
    pub adjustments: Vec<RawAdjustment>,
    #[serde(deserialize_with = "null_default")]
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl RawPrice {
    /// Sum of adjustment amounts of the given type, rounded to cents.
    pub fn sum_of(&self, kind: &AdjustmentType) -> f64 {
        let sum: f64 = self
            .adjustments
            .iter()
            .filter(|adj| &adj.adjustment_type() == kind)
            .map(|adj| adj.amount)
            .sum();
        super::round2(sum)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawProductPrice {
    #[serde(rename = "unitPrice", deserialize_with = "null_default")]
    pub unit_price: f64,
    #[serde(deserialize_with = "null_default")]
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawProduct {
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    #[serde(deserialize_with = "null_default")]
    pub quantity: u32,
    #[serde(deserialize_with = "null_default")]
    pub price: RawProductPrice,
    #[serde(rename = "orderStatus", skip_serializing_if = "Option::is_none")]
    pub order_status: Option<String>,
}

/// A synthesized or exported order before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawOrder {
    #[serde(deserialize_with = "null_default")]
    pub external_user_id: String,
    #[serde(deserialize_with = "null_default")]
    pub url: String,
    #[serde(rename = "orderStatus", skip_serializing_if = "Option::is_none")]
    pub order_status: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub shipping: RawShipping,
    #[serde(deserialize_with = "null_default")]
    pub store: RawStore,
    #[serde(deserialize_with = "null_default")]
    pub price: RawPrice,
    #[serde(deserialize_with = "null_default")]
    pub products: Vec<RawProduct>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
}
