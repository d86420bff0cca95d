//! Storage configuration types.

use serde::Deserialize;

/// Storage configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// MongoDB-specific configuration.
    pub mongodb: MongodbConfig,
}

/// MongoDB-specific configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MongodbConfig {
    /// MongoDB connection URI.
    pub uri: String,
    /// Database name.
    pub database: String,
    /// Orders collection name.
    pub collection: String,
    /// Connection attempts after the first failed ping.
    pub connect_retries: usize,
}

impl Default for MongodbConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "restaurant_stats".to_string(),
            collection: "orders".to_string(),
            connect_retries: 5,
        }
    }
}
