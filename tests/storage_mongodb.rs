//! MongoDB order store integration tests.
//!
//! Run with: cargo test --test storage_mongodb --features mongodb,test-utils -- --ignored --nocapture
//!
//! Requires: MONGODB_URI env var or MongoDB on localhost:27017

use chrono::Duration;
use mongodb::bson::Document;

use restaurant_stats::ingest::{ensure_indexes, insert_orders};
use restaurant_stats::model::GeoPoint;
use restaurant_stats::query::{DateGrouping, GeoField, NearbyQuery, OrderFilter, Pagination};
use restaurant_stats::storage::{MongoOrderStore, OrderStore, StorageError, ORDER_INDEXES};
use restaurant_stats::test_utils::{fixed_time, north_of_hub, OrderBuilder};

fn mongodb_uri() -> String {
    std::env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
}

fn mongodb_database() -> String {
    std::env::var("MONGODB_DATABASE").unwrap_or_else(|_| "restaurant_stats_test".to_string())
}

/// Fresh store over its own collection so tests can run in parallel.
async fn fresh_store(collection: &str) -> (mongodb::Client, MongoOrderStore) {
    let client = mongodb::Client::with_uri_str(&mongodb_uri())
        .await
        .expect("Failed to connect to MongoDB");
    drop_collection(&client, collection).await;
    let store = MongoOrderStore::new(&client, &mongodb_database(), collection);
    (client, store)
}

async fn drop_collection(client: &mongodb::Client, collection: &str) {
    let _ = client
        .database(&mongodb_database())
        .collection::<Document>(collection)
        .drop()
        .await;
}

#[tokio::test]
#[ignore = "requires running MongoDB instance"]
async fn test_mongodb_insert_and_query() {
    let (client, store) = fresh_store("test_orders_query").await;
    ensure_indexes(&store).await;

    let base = fixed_time();
    let orders = vec![
        OrderBuilder::new("m1")
            .store("Mamoun's Falafel - Princeton")
            .user("10001")
            .total(30.0)
            .build(),
        OrderBuilder::new("m2")
            .store("Mamoun's Falafel - Princeton")
            .user("10002")
            .total(10.0)
            .completed_at(base + Duration::days(1))
            .build(),
        OrderBuilder::new("h1")
            .store("Hoagie Haven")
            .user("10001")
            .total(15.0)
            .completed_at(base + Duration::days(8))
            .build(),
    ];
    assert_eq!(insert_orders(&store, &orders, 2).await, 3);

    let filter = OrderFilter {
        store_name: Some("MAMOUN".to_string()),
        ..Default::default()
    };
    let (found, total) = store.find_orders(&filter, &Pagination::default()).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(found[0].order_key, "m2", "newest first");
    assert_eq!(found[0].order_completed_at, base + Duration::days(1));

    let regex_chars = OrderFilter {
        store_name: Some("Mamoun's.*".to_string()),
        ..Default::default()
    };
    let (_, total) = store
        .find_orders(&regex_chars, &Pagination::default())
        .await
        .unwrap();
    assert_eq!(total, 0, "store names match literally");

    assert_eq!(
        store.find_by_key("h1").await.unwrap().unwrap().store.name,
        "Hoagie Haven"
    );
    assert!(store.find_by_key("missing").await.unwrap().is_none());

    let summary = store.summary(&OrderFilter::default()).await.unwrap();
    assert_eq!(summary.total_orders, 3);
    assert!((summary.total_revenue - 55.0).abs() < 1e-9);
    assert_eq!(summary.unique_users, 2);
    assert_eq!(summary.unique_restaurants, 2);

    let empty = store.summary(&OrderFilter::for_user("nobody")).await.unwrap();
    assert_eq!(empty.total_orders, 0);
    assert_eq!(empty.total_revenue, 0.0);

    let by_restaurant = store
        .stats_by_restaurant(&OrderFilter::default(), 1)
        .await
        .unwrap();
    assert_eq!(by_restaurant.len(), 1);
    assert_eq!(by_restaurant[0].restaurant_name, "Mamoun's Falafel - Princeton");
    assert_eq!(by_restaurant[0].total_orders, 2);

    let by_week = store
        .stats_by_date(&OrderFilter::default(), DateGrouping::Week)
        .await
        .unwrap();
    let buckets: Vec<_> = by_week.iter().map(|s| s.date.as_str()).collect();
    assert_eq!(buckets, vec!["2025-W40", "2025-W41"]);

    drop_collection(&client, "test_orders_query").await;
}

#[tokio::test]
#[ignore = "requires running MongoDB instance"]
async fn test_mongodb_duplicate_keys_and_indexes() {
    let (client, store) = fresh_store("test_orders_dupes").await;

    assert_eq!(ensure_indexes(&store).await, ORDER_INDEXES.len());
    assert_eq!(ensure_indexes(&store).await, ORDER_INDEXES.len());

    store
        .insert_one(&OrderBuilder::new("dup").build())
        .await
        .unwrap();
    let err = store
        .insert_one(&OrderBuilder::new("dup").build())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::DuplicateKey(_)));

    let batch = vec![
        OrderBuilder::new("fresh-1").build(),
        OrderBuilder::new("dup").build(),
        OrderBuilder::new("fresh-2").build(),
    ];
    match store.insert_many(&batch).await {
        Err(StorageError::BatchRejected { failed }) => assert_eq!(failed, vec![1]),
        other => panic!("expected batch rejection, got {other:?}"),
    }

    let (_, total) = store
        .find_orders(&OrderFilter::default(), &Pagination::default())
        .await
        .unwrap();
    assert_eq!(total, 3);

    drop_collection(&client, "test_orders_dupes").await;
}

#[tokio::test]
#[ignore = "requires running MongoDB instance"]
async fn test_mongodb_nearby() {
    let (client, store) = fresh_store("test_orders_nearby").await;
    ensure_indexes(&store).await;

    let (lon_far, lat_far) = north_of_hub(8.0);
    let (lon_mid, lat_mid) = north_of_hub(3.0);
    let (lon_near, lat_near) = north_of_hub(1.0);
    let orders = vec![
        OrderBuilder::new("far").shipping_at(lon_far, lat_far).build(),
        OrderBuilder::new("mid").shipping_at(lon_mid, lat_mid).build(),
        OrderBuilder::new("near").shipping_at(lon_near, lat_near).build(),
    ];
    assert_eq!(insert_orders(&store, &orders, 100).await, 3);

    let query = NearbyQuery {
        center: GeoPoint::new(-74.6672, 40.3573),
        max_distance_km: 5.0,
        field: GeoField::Shipping,
    };
    let (found, total) = store
        .find_nearby(&query, &Pagination::default())
        .await
        .unwrap();
    assert_eq!(total, 2);
    let keys: Vec<_> = found.iter().map(|o| o.order_key.as_str()).collect();
    assert_eq!(keys, vec!["near", "mid"]);

    drop_collection(&client, "test_orders_nearby").await;
}
