//! Order query service.
//!
//! Validates request parameters, then delegates to an [`OrderStore`].
//! Validation always happens before the store is touched.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::model::Order;
use crate::storage::{OrderStore, StorageError};

mod filter;
mod stats;

pub use filter::{
    parse_timestamp, DateGrouping, FilterParams, GeoField, NearbyParams, NearbyQuery,
    OrderFilter, PageParams, Pagination, StatsParams, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub(crate) use stats::Accumulator;
pub use stats::{DateStats, OrderStats, RestaurantStats};

/// Errors from the query layer.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("{0}")]
    Validation(String),

    #[error("Order with key '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, QueryError>;

/// One page of orders plus the full match count.
#[derive(Debug, Clone, Serialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl OrderPage {
    fn new((orders, total): (Vec<Order>, u64), page: Pagination) -> Self {
        Self {
            orders,
            total,
            page: page.page,
            page_size: page.page_size,
        }
    }
}

/// Read-only queries over the order store.
#[derive(Clone)]
pub struct OrderQueryService {
    store: Arc<dyn OrderStore>,
}

impl OrderQueryService {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// Filtered orders, newest first.
    pub async fn list(&self, filter: &FilterParams, page: &PageParams) -> Result<OrderPage> {
        let filter = filter.validate()?;
        let page = page.validate()?;
        debug!(?filter, page = page.page, page_size = page.page_size, "listing orders");
        let found = self.store.find_orders(&filter, &page).await?;
        Ok(OrderPage::new(found, page))
    }

    pub async fn get_by_key(&self, order_key: &str) -> Result<Order> {
        self.store
            .find_by_key(order_key)
            .await?
            .ok_or_else(|| QueryError::NotFound(order_key.to_string()))
    }

    pub async fn by_user(&self, user_id: &str, page: &PageParams) -> Result<OrderPage> {
        let page = page.validate()?;
        let found = self
            .store
            .find_orders(&OrderFilter::for_user(user_id), &page)
            .await?;
        Ok(OrderPage::new(found, page))
    }

    pub async fn by_store(&self, store_name: &str, page: &PageParams) -> Result<OrderPage> {
        let page = page.validate()?;
        let found = self
            .store
            .find_orders(&OrderFilter::for_store(store_name), &page)
            .await?;
        Ok(OrderPage::new(found, page))
    }

    /// Totals over every matching order; all zeros when nothing matches.
    pub async fn summary(&self, filter: &FilterParams) -> Result<OrderStats> {
        let filter = filter.validate()?;
        Ok(self.store.summary(&filter).await?.rounded())
    }

    /// Top restaurants by revenue.
    pub async fn by_restaurant(
        &self,
        filter: &FilterParams,
        params: &StatsParams,
    ) -> Result<Vec<RestaurantStats>> {
        let filter = filter.validate()?;
        let limit = params.limit()?;
        let stats = self.store.stats_by_restaurant(&filter, limit).await?;
        Ok(stats.into_iter().map(RestaurantStats::rounded).collect())
    }

    /// Rollups per day, ISO week or month, oldest bucket first.
    pub async fn by_date(
        &self,
        filter: &FilterParams,
        params: &StatsParams,
    ) -> Result<Vec<DateStats>> {
        let filter = filter.validate()?;
        let grouping = params.grouping()?;
        let stats = self.store.stats_by_date(&filter, grouping).await?;
        Ok(stats.into_iter().map(DateStats::rounded).collect())
    }

    /// Orders within a radius, nearest first.
    pub async fn nearby(&self, params: &NearbyParams, page: &PageParams) -> Result<OrderPage> {
        let query = params.validate()?;
        let page = page.validate()?;
        let found = self.store.find_nearby(&query, &page).await?;
        Ok(OrderPage::new(found, page))
    }
}
