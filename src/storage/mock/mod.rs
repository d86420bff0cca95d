//! In-memory order store.
//!
//! Mirrors the MongoDB store's semantics (unique keys, newest-first
//! listing, nearest-first proximity) without a database.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{IndexSpec, OrderStore, Result, StorageError};
use crate::model::Order;
use crate::query::{
    Accumulator, DateGrouping, DateStats, NearbyQuery, OrderFilter, OrderStats, Pagination,
    RestaurantStats,
};

/// Mock order store that keeps orders in memory.
#[derive(Default)]
pub struct MockOrderStore {
    orders: RwLock<Vec<Order>>,
    indexes: RwLock<Vec<IndexSpec>>,
    fail_on_insert: RwLock<bool>,
    fail_on_query: RwLock<bool>,
}

impl MockOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with orders (duplicates beyond the first are dropped).
    pub async fn with_orders(orders: Vec<Order>) -> Self {
        let store = Self::new();
        {
            let mut stored = store.orders.write().await;
            for order in orders {
                if !stored.iter().any(|o| o.order_key == order.order_key) {
                    stored.push(order);
                }
            }
        }
        store
    }

    pub async fn set_fail_on_insert(&self, fail: bool) {
        *self.fail_on_insert.write().await = fail;
    }

    pub async fn set_fail_on_query(&self, fail: bool) {
        *self.fail_on_query.write().await = fail;
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }

    pub async fn index_names(&self) -> Vec<String> {
        self.indexes.read().await.iter().map(IndexSpec::name).collect()
    }

    async fn check_query(&self) -> Result<()> {
        if *self.fail_on_query.read().await {
            return Err(StorageError::Unavailable("mock query failure".to_string()));
        }
        Ok(())
    }

    async fn matching(&self, filter: &OrderFilter) -> Vec<Order> {
        self.orders
            .read()
            .await
            .iter()
            .filter(|order| filter.matches(order))
            .cloned()
            .collect()
    }
}

fn newest_first(a: &Order, b: &Order) -> Ordering {
    b.order_completed_at
        .cmp(&a.order_completed_at)
        .then_with(|| a.order_key.cmp(&b.order_key))
}

fn paginate(orders: Vec<Order>, page: &Pagination) -> Vec<Order> {
    orders
        .into_iter()
        .skip(page.skip() as usize)
        .take(page.page_size as usize)
        .collect()
}

#[async_trait]
impl OrderStore for MockOrderStore {
    async fn insert_one(&self, order: &Order) -> Result<()> {
        if *self.fail_on_insert.read().await {
            return Err(StorageError::Unavailable("mock insert failure".to_string()));
        }
        let mut orders = self.orders.write().await;
        if orders.iter().any(|o| o.order_key == order.order_key) {
            return Err(StorageError::DuplicateKey(order.order_key.clone()));
        }
        orders.push(order.clone());
        Ok(())
    }

    async fn insert_many(&self, batch: &[Order]) -> Result<usize> {
        if *self.fail_on_insert.read().await {
            return Err(StorageError::Unavailable("mock insert failure".to_string()));
        }
        let mut orders = self.orders.write().await;
        let mut failed = Vec::new();

        for (i, order) in batch.iter().enumerate() {
            if orders.iter().any(|o| o.order_key == order.order_key) {
                failed.push(i);
            } else {
                orders.push(order.clone());
            }
        }

        if failed.is_empty() {
            Ok(batch.len())
        } else {
            Err(StorageError::BatchRejected { failed })
        }
    }

    async fn create_index(&self, index: &IndexSpec) -> Result<()> {
        if index.field.is_empty() {
            return Err(StorageError::InvalidIndex("empty field".to_string()));
        }
        let mut indexes = self.indexes.write().await;
        if !indexes.contains(index) {
            indexes.push(*index);
        }
        Ok(())
    }

    async fn find_orders(
        &self,
        filter: &OrderFilter,
        page: &Pagination,
    ) -> Result<(Vec<Order>, u64)> {
        self.check_query().await?;
        let mut orders = self.matching(filter).await;
        orders.sort_by(newest_first);
        let total = orders.len() as u64;
        Ok((paginate(orders, page), total))
    }

    async fn find_by_key(&self, order_key: &str) -> Result<Option<Order>> {
        self.check_query().await?;
        Ok(self
            .orders
            .read()
            .await
            .iter()
            .find(|o| o.order_key == order_key)
            .cloned())
    }

    async fn summary(&self, filter: &OrderFilter) -> Result<OrderStats> {
        self.check_query().await?;
        let orders = self.matching(filter).await;

        let mut acc = Accumulator::default();
        let mut users = HashSet::new();
        let mut restaurants = HashSet::new();
        for order in &orders {
            acc.add(order.price.total, order.price.tax, order.price.tip);
            users.insert(order.user_id.as_str());
            restaurants.insert(order.store.name.as_str());
        }

        Ok(OrderStats {
            total_orders: acc.orders,
            total_revenue: acc.revenue,
            average_order_value: acc.average(),
            total_tax: acc.tax,
            total_tips: acc.tips,
            unique_users: users.len() as u64,
            unique_restaurants: restaurants.len() as u64,
        })
    }

    async fn stats_by_restaurant(
        &self,
        filter: &OrderFilter,
        limit: u32,
    ) -> Result<Vec<RestaurantStats>> {
        self.check_query().await?;
        let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
        for order in self.matching(filter).await {
            groups.entry(order.store.name.clone()).or_default().add(
                order.price.total,
                order.price.tax,
                order.price.tip,
            );
        }

        let mut stats: Vec<RestaurantStats> = groups
            .into_iter()
            .map(|(name, acc)| RestaurantStats {
                restaurant_name: name,
                total_orders: acc.orders,
                total_revenue: acc.revenue,
                average_order_value: acc.average(),
                total_tax: acc.tax,
                total_tips: acc.tips,
            })
            .collect();
        stats.sort_by(|a, b| b.total_revenue.total_cmp(&a.total_revenue));
        stats.truncate(limit as usize);
        Ok(stats)
    }

    async fn stats_by_date(
        &self,
        filter: &OrderFilter,
        grouping: DateGrouping,
    ) -> Result<Vec<DateStats>> {
        self.check_query().await?;
        let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
        for order in self.matching(filter).await {
            groups
                .entry(grouping.bucket(&order.order_completed_at))
                .or_default()
                .add(order.price.total, order.price.tax, order.price.tip);
        }

        Ok(groups
            .into_iter()
            .map(|(date, acc)| DateStats {
                date,
                total_orders: acc.orders,
                total_revenue: acc.revenue,
                average_order_value: acc.average(),
            })
            .collect())
    }

    async fn find_nearby(
        &self,
        query: &NearbyQuery,
        page: &Pagination,
    ) -> Result<(Vec<Order>, u64)> {
        self.check_query().await?;
        let mut within: Vec<(f64, Order)> = self
            .orders
            .read()
            .await
            .iter()
            .map(|order| (query.center.distance_km(query.field.point(order)), order))
            .filter(|(distance, _)| *distance <= query.max_distance_km)
            .map(|(distance, order)| (distance, order.clone()))
            .collect();
        within.sort_by(|a, b| a.0.total_cmp(&b.0));

        let total = within.len() as u64;
        let orders = within.into_iter().map(|(_, order)| order).collect();
        Ok((paginate(orders, page), total))
    }
}
