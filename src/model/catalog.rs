//! Restaurant catalog entries.
//!
//! Catalog files come from a text agent, so every field past the restaurant
//! name is decoded leniently: a malformed value reads as absent instead of
//! rejecting the restaurant.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::null_default;

/// Latitude/longitude pair as reported by the catalog source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Structured menu item with a known price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricedItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "unitPrice")]
    pub unit_price: Option<f64>,
}

/// A menu entry.
///
/// Catalog sources return either bare item names or `{name, unitPrice}`
/// objects. Anything else is kept as-is so a single odd entry does not
/// reject the whole restaurant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MenuItem {
    Priced(PricedItem),
    Text(String),
    Other(Value),
}

impl MenuItem {
    /// Name and unit price, if this item can be ordered.
    pub fn priced(&self) -> Option<(&str, f64)> {
        match self {
            MenuItem::Priced(PricedItem {
                name: Some(name),
                unit_price: Some(price),
            }) if !name.is_empty() => Some((name.as_str(), *price)),
            _ => None,
        }
    }
}

impl From<Value> for MenuItem {
    /// Only JSON objects become [`MenuItem::Priced`]; arrays and scalars
    /// other than strings are kept as [`MenuItem::Other`].
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => MenuItem::Text(text),
            Value::Object(_) => match serde_json::from_value::<PricedItem>(value.clone()) {
                Ok(item) => MenuItem::Priced(item),
                Err(_) => MenuItem::Other(value),
            },
            other => MenuItem::Other(other),
        }
    }
}

impl<'de> Deserialize<'de> for MenuItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(MenuItem::from)
    }
}

/// Category name -> items. A null category is kept as `None`.
pub type Menus = BTreeMap<String, Option<Vec<MenuItem>>>;

/// One restaurant in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default, deserialize_with = "null_default")]
    pub restaurant: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(default, deserialize_with = "lenient")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, deserialize_with = "lenient_menus")]
    pub menus: Option<Menus>,
}

impl CatalogEntry {
    /// Iterate every menu item across all categories, in category order.
    pub fn menu_items(&self) -> impl Iterator<Item = &MenuItem> {
        self.menus
            .iter()
            .flat_map(|menus| menus.values())
            .flatten()
            .flatten()
    }
}

/// Decode `T`, reading any value of the wrong shape as `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = lenient(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// A non-object `menus` reads as `None`; categories that are neither a
/// list nor null are dropped.
fn lenient_menus<'de, D>(deserializer: D) -> Result<Option<Menus>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(categories) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };

    let menus = categories
        .into_iter()
        .filter_map(|(category, items)| match items {
            Value::Array(items) => Some((
                category,
                Some(items.into_iter().map(MenuItem::from).collect()),
            )),
            Value::Null => Some((category, None)),
            _ => None,
        })
        .collect();
    Ok(Some(menus))
}
