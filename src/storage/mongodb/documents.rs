//! Order <-> BSON document conversion and query building.

use chrono::Utc;
use mongodb::bson::{self, doc, Bson, DateTime as BsonDateTime, Document};

use super::EARTH_RADIUS_KM;
use crate::model::Order;
use crate::query::{NearbyQuery, OrderFilter};
use crate::storage::{IndexKind, IndexSpec, Result};

/// Fields added by the server or by aggregation that are not part of `Order`.
const NON_ORDER_FIELDS: [&str; 2] = ["_id", "distance"];

fn bson_date(at: &chrono::DateTime<Utc>) -> Bson {
    Bson::DateTime(BsonDateTime::from_millis(at.timestamp_millis()))
}

/// Encode an order, storing the completion time as a native date.
pub(crate) fn to_document(order: &Order) -> Result<Document> {
    let mut document = bson::to_document(order)?;
    document.insert("order_completed_at", bson_date(&order.order_completed_at));
    Ok(document)
}

/// Decode a stored order.
pub(crate) fn from_document(mut document: Document) -> Result<Order> {
    for field in NON_ORDER_FIELDS {
        document.remove(field);
    }
    if let Some(Bson::DateTime(at)) = document.get("order_completed_at") {
        let rendered = chrono::DateTime::from_timestamp_millis(at.timestamp_millis())
            .unwrap_or_default()
            .to_rfc3339();
        document.insert("order_completed_at", rendered);
    }
    Ok(bson::from_document(document)?)
}

/// Translate a validated filter into a `find`/`$match` document.
pub(crate) fn filter_document(filter: &OrderFilter) -> Document {
    let mut query = Document::new();

    if let Some(user_id) = &filter.user_id {
        query.insert("user_id", user_id.as_str());
    }
    if let Some(status) = &filter.status {
        query.insert("status", status.as_str());
    }
    if let Some(name) = &filter.store_name {
        query.insert(
            "store.name",
            doc! { "$regex": regex::escape(name), "$options": "i" },
        );
    }

    let mut completed = Document::new();
    if let Some(start) = &filter.start_date {
        completed.insert("$gte", bson_date(start));
    }
    if let Some(end) = &filter.end_date {
        completed.insert("$lte", bson_date(end));
    }
    if !completed.is_empty() {
        query.insert("order_completed_at", completed);
    }

    let mut total = Document::new();
    if let Some(min) = filter.min_total {
        total.insert("$gte", min);
    }
    if let Some(max) = filter.max_total {
        total.insert("$lte", max);
    }
    if !total.is_empty() {
        query.insert("price.total", total);
    }

    query
}

/// Count query for everything inside the search radius.
pub(crate) fn within_radius(query: &NearbyQuery) -> Document {
    let center = [query.center.longitude(), query.center.latitude()];
    let mut filter = Document::new();
    filter.insert(
        query.field.path(),
        doc! {
            "$geoWithin": {
                "$centerSphere": [center.to_vec(), query.max_distance_km / EARTH_RADIUS_KM]
            }
        },
    );
    filter
}

/// `$geoNear` stage: radius-limited, nearest first.
pub(crate) fn geo_near_stage(query: &NearbyQuery) -> Document {
    doc! {
        "$geoNear": {
            "near": {
                "type": "Point",
                "coordinates": [query.center.longitude(), query.center.latitude()]
            },
            "distanceField": "distance",
            "maxDistance": query.max_distance_km * 1000.0,
            "key": query.field.path(),
            "spherical": true
        }
    }
}

/// Index key pattern.
pub(crate) fn index_keys(index: &IndexSpec) -> Document {
    let mut keys = Document::new();
    match index.kind {
        IndexKind::Ascending | IndexKind::Unique => keys.insert(index.field, 1),
        IndexKind::Sphere2d => keys.insert(index.field, "2dsphere"),
    };
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::GeoField;
    use crate::synth::geo;
    use crate::test_utils::{fixed_time, OrderBuilder};

    #[test]
    fn test_document_round_trip_keeps_native_date() {
        let order = OrderBuilder::new("abc").build();
        let mut document = to_document(&order).unwrap();
        assert!(matches!(
            document.get("order_completed_at"),
            Some(Bson::DateTime(_))
        ));
        let location = document
            .get_document("shipping_address")
            .unwrap()
            .get_document("location")
            .unwrap();
        assert_eq!(location.get_str("type").unwrap(), "Point");

        document.insert("_id", bson::oid::ObjectId::new());
        document.insert("distance", 12.5);
        let decoded = from_document(document).unwrap();
        assert_eq!(decoded, order);
    }

    #[test]
    fn test_filter_document_escapes_store_name() {
        let filter = OrderFilter {
            store_name: Some("Joe's (Pizza).".to_string()),
            start_date: Some(fixed_time()),
            min_total: Some(5.0),
            ..Default::default()
        };
        let query = filter_document(&filter);

        let name = query.get_document("store.name").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), r"Joe's \(Pizza\)\.");
        assert_eq!(name.get_str("$options").unwrap(), "i");
        assert!(query
            .get_document("order_completed_at")
            .unwrap()
            .contains_key("$gte"));
        assert_eq!(
            query.get_document("price.total").unwrap().get_f64("$gte").unwrap(),
            5.0
        );
        assert!(!query.contains_key("user_id"));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(filter_document(&OrderFilter::default()).is_empty());
    }

    #[test]
    fn test_geo_stages() {
        let query = NearbyQuery {
            center: geo::hub(),
            max_distance_km: 5.0,
            field: GeoField::Store,
        };
        let stage = geo_near_stage(&query);
        let near = stage.get_document("$geoNear").unwrap();
        assert_eq!(near.get_f64("maxDistance").unwrap(), 5000.0);
        assert_eq!(near.get_str("key").unwrap(), "store.address.location");

        let count = within_radius(&query);
        assert!(count.contains_key("store.address.location"));
    }

    #[test]
    fn test_index_keys() {
        let keys = index_keys(&IndexSpec::new("shipping_address.location", IndexKind::Sphere2d));
        assert_eq!(
            keys.get_str("shipping_address.location").unwrap(),
            "2dsphere"
        );
        let keys = index_keys(&IndexSpec::new("order_key", IndexKind::Unique));
        assert_eq!(keys.get_i32("order_key").unwrap(), 1);
    }
}
