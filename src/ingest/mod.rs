//! Order store gateway: batched inserts and index provisioning.

use rand::Rng;
use tracing::{error, info, warn};

use crate::model::Order;
use crate::storage::{OrderStore, StorageError, ORDER_INDEXES};
use crate::transform::{transform_batch, TransformOptions};

/// Documents per bulk insert.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Insert orders in batches of unordered bulk writes.
///
/// When a batch is only partly persisted, the documents the store names as
/// rejected are retried one at a time; when the store cannot say which
/// failed, the whole batch is. Each document that still fails is logged
/// with its key. Returns the number of documents persisted.
pub async fn insert_orders(store: &dyn OrderStore, orders: &[Order], batch_size: usize) -> usize {
    let total = orders.len();
    let mut inserted = 0;

    for (batch_no, batch) in orders.chunks(batch_size.max(1)).enumerate() {
        match store.insert_many(batch).await {
            Ok(count) => inserted += count,
            Err(StorageError::BatchRejected { failed }) => {
                inserted += batch.len().saturating_sub(failed.len());
                warn!(
                    batch = batch_no + 1,
                    rejected = failed.len(),
                    "batch partly rejected, retrying rejected orders individually"
                );
                let retry = failed.iter().filter_map(|&i| batch.get(i));
                inserted += insert_individually(store, retry).await;
            }
            Err(e) => {
                error!(batch = batch_no + 1, error = %e, "batch insert failed, inserting individually");
                inserted += insert_individually(store, batch.iter()).await;
            }
        }
        info!(inserted, total, "insert progress");
    }

    info!(inserted, total, "finished inserting orders");
    inserted
}

async fn insert_individually<'a>(
    store: &dyn OrderStore,
    orders: impl Iterator<Item = &'a Order>,
) -> usize {
    let mut inserted = 0;
    for order in orders {
        match store.insert_one(order).await {
            Ok(()) => inserted += 1,
            Err(e) => warn!(order_key = %order.order_key, error = %e, "failed to insert order"),
        }
    }
    inserted
}

/// Create every order index. Failures are logged and skipped.
///
/// Returns the number of indexes in place afterwards.
pub async fn ensure_indexes(store: &dyn OrderStore) -> usize {
    let mut created = 0;
    for index in &ORDER_INDEXES {
        match store.create_index(index).await {
            Ok(()) => {
                created += 1;
                info!(index = %index.name(), "index ready");
            }
            Err(e) => warn!(index = %index.name(), error = %e, "failed to create index"),
        }
    }
    created
}

/// Counts from one ingest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub in_file: usize,
    pub transformed: usize,
    pub inserted: usize,
}

/// Transform raw records, insert them, and provision indexes.
pub async fn run_ingest<R: Rng + ?Sized>(
    store: &dyn OrderStore,
    raw_orders: Vec<serde_json::Value>,
    options: &TransformOptions,
    batch_size: usize,
    rng: &mut R,
) -> IngestReport {
    let in_file = raw_orders.len();
    let transformed = transform_batch(raw_orders, options, rng);
    if transformed.orders.is_empty() {
        warn!(in_file, "no orders were successfully transformed");
    }

    let inserted = insert_orders(store, &transformed.orders, batch_size).await;
    ensure_indexes(store).await;

    let report = IngestReport {
        in_file,
        transformed: transformed.orders.len(),
        inserted,
    };
    info!(
        in_file = report.in_file,
        transformed = report.transformed,
        inserted = report.inserted,
        "ingest complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MockOrderStore;
    use crate::test_utils::OrderBuilder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn orders(keys: &[&str]) -> Vec<Order> {
        keys.iter().map(|k| OrderBuilder::new(k).build()).collect()
    }

    #[tokio::test]
    async fn test_insert_orders_in_batches() {
        let store = MockOrderStore::new();
        let keys: Vec<String> = (0..250).map(|i| format!("k{i}")).collect();
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();

        let inserted = insert_orders(&store, &orders(&keys), DEFAULT_BATCH_SIZE).await;
        assert_eq!(inserted, 250);
        assert_eq!(store.len().await, 250);
    }

    #[tokio::test]
    async fn test_duplicate_key_persists_once() {
        let store = MockOrderStore::new();
        let inserted = insert_orders(&store, &orders(&["a", "b", "a", "c"]), 10).await;
        assert_eq!(inserted, 3);
        assert_eq!(store.len().await, 3);

        // Re-running the same file inserts nothing new.
        let again = insert_orders(&store, &orders(&["a", "b"]), 10).await;
        assert_eq!(again, 0);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_unexplained_batch_failure_counts_nothing() {
        let store = MockOrderStore::new();
        store.set_fail_on_insert(true).await;
        let inserted = insert_orders(&store, &orders(&["a", "b"]), 10).await;
        assert_eq!(inserted, 0);
    }

    #[tokio::test]
    async fn test_ensure_indexes_twice() {
        let store = MockOrderStore::new();
        assert_eq!(ensure_indexes(&store).await, ORDER_INDEXES.len());
        assert_eq!(ensure_indexes(&store).await, ORDER_INDEXES.len());

        let names = store.index_names().await;
        assert_eq!(names.len(), ORDER_INDEXES.len());
        assert!(names.contains(&"order_key_1".to_string()));
        assert!(names.contains(&"store.address.location_2dsphere".to_string()));
    }

    #[tokio::test]
    async fn test_run_ingest_report() {
        let store = MockOrderStore::new();
        let mut rng = StdRng::seed_from_u64(21);
        let raw = vec![
            serde_json::json!({"url": "https://www.doordash.com/orders/one", "external_user_id": "10000"}),
            serde_json::json!({"url": ""}),
            serde_json::json!({"url": "https://www.doordash.com/orders/two"}),
            serde_json::json!({"url": "https://www.doordash.com/orders/one"}),
        ];

        let report = run_ingest(&store, raw, &TransformOptions::default(), 100, &mut rng).await;
        assert_eq!(
            report,
            IngestReport {
                in_file: 4,
                transformed: 3,
                inserted: 2,
            }
        );
        assert_eq!(store.index_names().await.len(), ORDER_INDEXES.len());
    }
}
