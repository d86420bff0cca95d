//! Query parameters and their validated forms.
//!
//! `*Params` types are what arrives over HTTP; `validate` turns them into
//! the typed values the store understands or rejects them before any
//! storage access.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use super::QueryError;
use crate::model::{GeoPoint, Order};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_STATS_LIMIT: u32 = 10;
pub const MAX_STATS_LIMIT: u32 = 50;
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 5.0;
pub const MIN_DISTANCE_KM: f64 = 0.1;
pub const MAX_DISTANCE_KM: f64 = 100.0;

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339, a naive date-time (taken as UTC) or a bare date
/// (midnight UTC).
pub fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, QueryError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Some(naive) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(naive.and_utc());
    }
    Err(QueryError::Validation(format!(
        "{field} must be an ISO-8601 timestamp, got '{value}'"
    )))
}

/// Filter parameters shared by listing and stats endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    pub user_id: Option<String>,
    pub status: Option<String>,
    pub store_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_total: Option<f64>,
    pub max_total: Option<f64>,
}

/// Validated order filter. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub user_id: Option<String>,
    pub status: Option<String>,
    /// Case-insensitive literal substring of the store name.
    pub store_name: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub min_total: Option<f64>,
    pub max_total: Option<f64>,
}

impl FilterParams {
    pub fn validate(&self) -> Result<OrderFilter, QueryError> {
        for (field, value) in [("min_total", self.min_total), ("max_total", self.max_total)] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(QueryError::Validation(format!(
                        "{field} must be greater than or equal to 0"
                    )));
                }
            }
        }
        if let (Some(min), Some(max)) = (self.min_total, self.max_total) {
            if min > max {
                return Err(QueryError::Validation(
                    "min_total must not exceed max_total".to_string(),
                ));
            }
        }

        let start_date = non_empty(&self.start_date)
            .map(|v| parse_timestamp("start_date", &v))
            .transpose()?;
        let end_date = non_empty(&self.end_date)
            .map(|v| parse_timestamp("end_date", &v))
            .transpose()?;

        Ok(OrderFilter {
            user_id: non_empty(&self.user_id),
            status: non_empty(&self.status),
            store_name: non_empty(&self.store_name),
            start_date,
            end_date,
            min_total: self.min_total,
            max_total: self.max_total,
        })
    }
}

impl OrderFilter {
    pub fn for_user(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            ..Default::default()
        }
    }

    pub fn for_store(store_name: &str) -> Self {
        Self {
            store_name: Some(store_name.to_string()),
            ..Default::default()
        }
    }

    /// In-memory evaluation, equivalent to the database query.
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(user_id) = &self.user_id {
            if &order.user_id != user_id {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if &order.status != status {
                return false;
            }
        }
        if let Some(name) = &self.store_name {
            if !order
                .store
                .name
                .to_lowercase()
                .contains(&name.to_lowercase())
            {
                return false;
            }
        }
        if self.start_date.is_some_and(|start| order.order_completed_at < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| order.order_completed_at > end) {
            return false;
        }
        if self.min_total.is_some_and(|min| order.price.total < min) {
            return false;
        }
        if self.max_total.is_some_and(|max| order.price.total > max) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Validated 1-based pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Documents to skip before this page.
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }
}

impl PageParams {
    pub fn validate(&self) -> Result<Pagination, QueryError> {
        let page = self.page.unwrap_or(1);
        if page < 1 || page > i64::from(u32::MAX) {
            return Err(QueryError::Validation(
                "page must be greater than or equal to 1".to_string(),
            ));
        }
        let page_size = self.page_size.unwrap_or(i64::from(DEFAULT_PAGE_SIZE));
        if !(1..=i64::from(MAX_PAGE_SIZE)).contains(&page_size) {
            return Err(QueryError::Validation(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(Pagination {
            page: page as u32,
            page_size: page_size as u32,
        })
    }
}

/// Time bucket for date statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateGrouping {
    #[default]
    Day,
    /// ISO-8601 week, e.g. `2025-W07`.
    Week,
    Month,
}

impl DateGrouping {
    pub fn parse(value: &str) -> Result<Self, QueryError> {
        match value {
            "day" => Ok(DateGrouping::Day),
            "week" => Ok(DateGrouping::Week),
            "month" => Ok(DateGrouping::Month),
            other => Err(QueryError::Validation(format!(
                "group_by must be one of day, week, month; got '{other}'"
            ))),
        }
    }

    /// strftime-style format, valid for both chrono and `$dateToString`.
    pub fn format(&self) -> &'static str {
        match self {
            DateGrouping::Day => "%Y-%m-%d",
            DateGrouping::Week => "%G-W%V",
            DateGrouping::Month => "%Y-%m",
        }
    }

    pub fn bucket(&self, at: &DateTime<Utc>) -> String {
        at.format(self.format()).to_string()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsParams {
    pub limit: Option<i64>,
    pub group_by: Option<String>,
}

impl StatsParams {
    pub fn limit(&self) -> Result<u32, QueryError> {
        let limit = self.limit.unwrap_or(i64::from(DEFAULT_STATS_LIMIT));
        if !(1..=i64::from(MAX_STATS_LIMIT)).contains(&limit) {
            return Err(QueryError::Validation(format!(
                "limit must be between 1 and {MAX_STATS_LIMIT}"
            )));
        }
        Ok(limit as u32)
    }

    pub fn grouping(&self) -> Result<DateGrouping, QueryError> {
        match non_empty(&self.group_by) {
            Some(value) => DateGrouping::parse(&value),
            None => Ok(DateGrouping::default()),
        }
    }
}

/// Which address a proximity search looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoField {
    Shipping,
    Store,
}

impl GeoField {
    /// Document path of the indexed geo-point.
    pub fn path(&self) -> &'static str {
        match self {
            GeoField::Shipping => "shipping_address.location",
            GeoField::Store => "store.address.location",
        }
    }

    pub fn point<'a>(&self, order: &'a Order) -> &'a GeoPoint {
        match self {
            GeoField::Shipping => &order.shipping_address.location,
            GeoField::Store => &order.store.address.location,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NearbyParams {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub max_distance_km: Option<f64>,
    pub use_shipping: Option<bool>,
}

/// Validated proximity search.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub center: GeoPoint,
    pub max_distance_km: f64,
    pub field: GeoField,
}

impl NearbyParams {
    pub fn validate(&self) -> Result<NearbyQuery, QueryError> {
        let longitude = self
            .longitude
            .ok_or_else(|| QueryError::Validation("longitude is required".to_string()))?;
        let latitude = self
            .latitude
            .ok_or_else(|| QueryError::Validation("latitude is required".to_string()))?;

        if !(-180.0..=180.0).contains(&longitude) {
            return Err(QueryError::Validation(
                "longitude must be between -180 and 180".to_string(),
            ));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(QueryError::Validation(
                "latitude must be between -90 and 90".to_string(),
            ));
        }

        let max_distance_km = self.max_distance_km.unwrap_or(DEFAULT_MAX_DISTANCE_KM);
        if !(MIN_DISTANCE_KM..=MAX_DISTANCE_KM).contains(&max_distance_km) {
            return Err(QueryError::Validation(format!(
                "max_distance_km must be between {MIN_DISTANCE_KM} and {MAX_DISTANCE_KM}"
            )));
        }

        Ok(NearbyQuery {
            center: GeoPoint::new(longitude, latitude),
            max_distance_km,
            field: if self.use_shipping.unwrap_or(true) {
                GeoField::Shipping
            } else {
                GeoField::Store
            },
        })
    }
}
