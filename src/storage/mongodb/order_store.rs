//! MongoDB OrderStore implementation.

use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOptions, IndexOptions, InsertManyOptions};
use mongodb::{Client, Collection, Cursor, IndexModel};
use tracing::{debug, info};

use super::documents::{
    filter_document, from_document, geo_near_stage, index_keys, to_document, within_radius,
};
use super::{DUPLICATE_KEY_CODE, ORDERS_COLLECTION};
use crate::config::MongodbConfig;
use crate::model::Order;
use crate::query::{
    DateGrouping, DateStats, NearbyQuery, OrderFilter, OrderStats, Pagination, RestaurantStats,
};
use crate::storage::{IndexKind, IndexSpec, OrderStore, Result, StorageError};
use crate::utils::bootstrap::connect_with_retry;

/// MongoDB implementation of OrderStore.
pub struct MongoOrderStore {
    orders: Collection<Document>,
}

impl MongoOrderStore {
    pub fn new(client: &Client, database_name: &str, collection_name: &str) -> Self {
        let orders = client.database(database_name).collection(collection_name);
        Self { orders }
    }

    /// Connect, verify the server answers a ping, and open the orders collection.
    pub async fn connect(config: &MongodbConfig) -> Result<Self> {
        let client = Client::with_uri_str(&config.uri).await?;

        connect_with_retry("mongodb", config.connect_retries, || {
            let admin = client.database("admin");
            async move { admin.run_command(doc! { "ping": 1 }).await }
        })
        .await?;

        let collection = if config.collection.is_empty() {
            ORDERS_COLLECTION
        } else {
            config.collection.as_str()
        };
        info!(
            database = %config.database,
            collection,
            "connected to MongoDB"
        );
        Ok(Self::new(&client, &config.database, collection))
    }

    async fn collect_orders(mut cursor: Cursor<Document>) -> Result<Vec<Order>> {
        let mut orders = Vec::new();
        while cursor.advance().await? {
            orders.push(from_document(cursor.deserialize_current()?)?);
        }
        Ok(orders)
    }

    async fn aggregate_into<T: serde::de::DeserializeOwned>(
        &self,
        pipeline: Vec<Document>,
    ) -> Result<Vec<T>> {
        let mut cursor = self.orders.aggregate(pipeline).await?;
        let mut rows = Vec::new();
        while cursor.advance().await? {
            rows.push(mongodb::bson::from_document(cursor.deserialize_current()?)?);
        }
        Ok(rows)
    }
}

fn write_error_code(error: &mongodb::error::Error) -> Option<i32> {
    match *error.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref write_err)) => Some(write_err.code),
        _ => None,
    }
}

#[async_trait]
impl OrderStore for MongoOrderStore {
    async fn insert_one(&self, order: &Order) -> Result<()> {
        let document = to_document(order)?;
        self.orders.insert_one(document).await.map_err(|e| {
            if write_error_code(&e) == Some(DUPLICATE_KEY_CODE) {
                return StorageError::DuplicateKey(order.order_key.clone());
            }
            StorageError::from(e)
        })?;
        Ok(())
    }

    async fn insert_many(&self, orders: &[Order]) -> Result<usize> {
        if orders.is_empty() {
            return Ok(0);
        }
        let documents = orders.iter().map(to_document).collect::<Result<Vec<_>>>()?;
        let options = InsertManyOptions::builder().ordered(false).build();

        match self.orders.insert_many(documents).with_options(options).await {
            Ok(result) => Ok(result.inserted_ids.len()),
            Err(e) => {
                // Unordered inserts report exactly which documents failed.
                if let ErrorKind::InsertMany(ref failure) = *e.kind {
                    if failure.write_concern_error.is_none() {
                        if let Some(write_errors) = &failure.write_errors {
                            let failed = write_errors.iter().map(|w| w.index).collect();
                            return Err(StorageError::BatchRejected { failed });
                        }
                    }
                }
                Err(StorageError::from(e))
            }
        }
    }

    async fn create_index(&self, index: &IndexSpec) -> Result<()> {
        let model = match index.kind {
            IndexKind::Unique => IndexModel::builder()
                .keys(index_keys(index))
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            IndexKind::Ascending | IndexKind::Sphere2d => {
                IndexModel::builder().keys(index_keys(index)).build()
            }
        };
        let created = self.orders.create_index(model).await?;
        debug!(index = %created.index_name, "index ensured");
        Ok(())
    }

    async fn find_orders(
        &self,
        filter: &OrderFilter,
        page: &Pagination,
    ) -> Result<(Vec<Order>, u64)> {
        let query = filter_document(filter);
        let total = self.orders.count_documents(query.clone()).await?;

        let options = FindOptions::builder()
            .sort(doc! { "order_completed_at": -1 })
            .skip(page.skip())
            .limit(i64::from(page.page_size))
            .build();
        let cursor = self.orders.find(query).with_options(options).await?;

        Ok((Self::collect_orders(cursor).await?, total))
    }

    async fn find_by_key(&self, order_key: &str) -> Result<Option<Order>> {
        self.orders
            .find_one(doc! { "order_key": order_key })
            .await?
            .map(from_document)
            .transpose()
    }

    async fn summary(&self, filter: &OrderFilter) -> Result<OrderStats> {
        let pipeline = vec![
            doc! { "$match": filter_document(filter) },
            doc! {
                "$group": {
                    "_id": null,
                    "total_orders": { "$sum": 1 },
                    "total_revenue": { "$sum": "$price.total" },
                    "total_tax": { "$sum": "$price.tax" },
                    "total_tips": { "$sum": "$price.tip" },
                    "unique_users": { "$addToSet": "$user_id" },
                    "unique_restaurants": { "$addToSet": "$store.name" }
                }
            },
            doc! {
                "$project": {
                    "_id": 0,
                    "total_orders": 1,
                    "total_revenue": 1,
                    "average_order_value": { "$divide": ["$total_revenue", "$total_orders"] },
                    "total_tax": 1,
                    "total_tips": 1,
                    "unique_users": { "$size": "$unique_users" },
                    "unique_restaurants": { "$size": "$unique_restaurants" }
                }
            },
        ];

        let rows: Vec<OrderStats> = self.aggregate_into(pipeline).await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    async fn stats_by_restaurant(
        &self,
        filter: &OrderFilter,
        limit: u32,
    ) -> Result<Vec<RestaurantStats>> {
        let pipeline = vec![
            doc! { "$match": filter_document(filter) },
            doc! {
                "$group": {
                    "_id": "$store.name",
                    "total_orders": { "$sum": 1 },
                    "total_revenue": { "$sum": "$price.total" },
                    "average_order_value": { "$avg": "$price.total" },
                    "total_tax": { "$sum": "$price.tax" },
                    "total_tips": { "$sum": "$price.tip" }
                }
            },
            doc! {
                "$project": {
                    "_id": 0,
                    "restaurant_name": "$_id",
                    "total_orders": 1,
                    "total_revenue": 1,
                    "average_order_value": 1,
                    "total_tax": 1,
                    "total_tips": 1
                }
            },
            doc! { "$sort": { "total_revenue": -1 } },
            doc! { "$limit": i64::from(limit) },
        ];
        self.aggregate_into(pipeline).await
    }

    async fn stats_by_date(
        &self,
        filter: &OrderFilter,
        grouping: DateGrouping,
    ) -> Result<Vec<DateStats>> {
        let pipeline = vec![
            doc! { "$match": filter_document(filter) },
            doc! {
                "$group": {
                    "_id": {
                        "$dateToString": {
                            "format": grouping.format(),
                            "date": "$order_completed_at"
                        }
                    },
                    "total_orders": { "$sum": 1 },
                    "total_revenue": { "$sum": "$price.total" },
                    "average_order_value": { "$avg": "$price.total" }
                }
            },
            doc! {
                "$project": {
                    "_id": 0,
                    "date": "$_id",
                    "total_orders": 1,
                    "total_revenue": 1,
                    "average_order_value": 1
                }
            },
            doc! { "$sort": { "date": 1 } },
        ];
        self.aggregate_into(pipeline).await
    }

    async fn find_nearby(
        &self,
        query: &NearbyQuery,
        page: &Pagination,
    ) -> Result<(Vec<Order>, u64)> {
        let total = self.orders.count_documents(within_radius(query)).await?;

        let pipeline = vec![
            geo_near_stage(query),
            doc! { "$skip": page.skip() as i64 },
            doc! { "$limit": i64::from(page.page_size) },
        ];
        let cursor = self.orders.aggregate(pipeline).await?;

        Ok((Self::collect_orders(cursor).await?, total))
    }
}
