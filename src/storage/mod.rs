//! Order storage.
//!
//! [`OrderStore`] is the single seam between the query/ingest layers and
//! the database. Implementations:
//! - `MongoOrderStore`: MongoDB (feature `mongodb`)
//! - `MockOrderStore`: in-memory, for tests and local runs

use async_trait::async_trait;

use crate::model::Order;
use crate::query::{
    DateGrouping, DateStats, NearbyQuery, OrderFilter, OrderStats, Pagination, RestaurantStats,
};

pub mod mock;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use mock::MockOrderStore;

#[cfg(feature = "mongodb")]
pub use self::mongodb::MongoOrderStore;

/// Errors from order storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Duplicate order key: {0}")]
    DuplicateKey(String),

    /// A bulk insert persisted some documents but not the listed ones
    /// (indices into the submitted slice).
    #[error("Bulk insert rejected {} document(s)", failed.len())]
    BatchRejected { failed: Vec<usize> },

    #[error("Invalid index specification: {0}")]
    InvalidIndex(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] ::mongodb::error::Error),

    #[cfg(feature = "mongodb")]
    #[error("BSON encode error: {0}")]
    BsonEncode(#[from] ::mongodb::bson::ser::Error),

    #[cfg(feature = "mongodb")]
    #[error("BSON decode error: {0}")]
    BsonDecode(#[from] ::mongodb::bson::de::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Index type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Ascending,
    Unique,
    Sphere2d,
}

/// Single-field index on the orders collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpec {
    pub field: &'static str,
    pub kind: IndexKind,
}

impl IndexSpec {
    pub const fn new(field: &'static str, kind: IndexKind) -> Self {
        Self { field, kind }
    }

    /// Index name as MongoDB derives it from the key pattern.
    pub fn name(&self) -> String {
        match self.kind {
            IndexKind::Ascending | IndexKind::Unique => format!("{}_1", self.field),
            IndexKind::Sphere2d => format!("{}_2dsphere", self.field),
        }
    }
}

/// Indexes every orders collection carries.
pub const ORDER_INDEXES: [IndexSpec; 6] = [
    IndexSpec::new("order_key", IndexKind::Unique),
    IndexSpec::new("shipping_address.location", IndexKind::Sphere2d),
    IndexSpec::new("store.address.location", IndexKind::Sphere2d),
    IndexSpec::new("user_id", IndexKind::Ascending),
    IndexSpec::new("order_completed_at", IndexKind::Ascending),
    IndexSpec::new("status", IndexKind::Ascending),
];

/// Interface for order persistence and queries.
///
/// Orders are append-only: there is no update or delete path.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a single order. Fails with `DuplicateKey` if the key exists.
    async fn insert_one(&self, order: &Order) -> Result<()>;

    /// Unordered bulk insert. Returns the number persisted.
    ///
    /// When only some documents fail, returns `BatchRejected` naming them;
    /// the others are persisted.
    async fn insert_many(&self, orders: &[Order]) -> Result<usize>;

    /// Create an index. Creating an existing index is a no-op.
    async fn create_index(&self, index: &IndexSpec) -> Result<()>;

    /// Matching orders newest first, plus the total match count.
    async fn find_orders(
        &self,
        filter: &OrderFilter,
        page: &Pagination,
    ) -> Result<(Vec<Order>, u64)>;

    async fn find_by_key(&self, order_key: &str) -> Result<Option<Order>>;

    /// Unrounded totals over matching orders.
    async fn summary(&self, filter: &OrderFilter) -> Result<OrderStats>;

    /// Per-restaurant totals, highest revenue first, at most `limit`.
    async fn stats_by_restaurant(
        &self,
        filter: &OrderFilter,
        limit: u32,
    ) -> Result<Vec<RestaurantStats>>;

    /// Per-bucket totals in ascending bucket order.
    async fn stats_by_date(
        &self,
        filter: &OrderFilter,
        grouping: DateGrouping,
    ) -> Result<Vec<DateStats>>;

    /// Orders within the radius nearest first, plus the count within it.
    async fn find_nearby(
        &self,
        query: &NearbyQuery,
        page: &Pagination,
    ) -> Result<(Vec<Order>, u64)>;
}
