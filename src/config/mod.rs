//! Application configuration.
//!
//! Aggregates configuration from all modules into a single Config struct
//! that can be loaded from YAML files or environment variables.

mod agent;
mod knot;
mod pipeline;
mod server;
mod storage;

pub use agent::AgentConfig;
pub use knot::KnotConfig;
pub use pipeline::{GeneratorConfig, IngestConfig, MAX_DAYS_AGO};
pub use server::ServerConfig;
pub use storage::{MongodbConfig, StorageConfig};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "RESTAURANT_STATS_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "RESTAURANT_STATS";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "RESTAURANT_STATS_LOG";

use serde::Deserialize;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Order store configuration.
    pub storage: StorageConfig,
    /// Knot API proxy configuration.
    pub knot: KnotConfig,
    /// Text-generation agent used by the catalog builder.
    pub agent: AgentConfig,
    /// Synthetic order generation.
    pub generator: GeneratorConfig,
    /// Transform and insert pipeline.
    pub ingest: IngestConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("knot.default_merchant_ids")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no component can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ingest.batch_size == 0 {
            return Err(ConfigError::Invalid("ingest.batch_size must be positive".into()));
        }
        if self.ingest.days_ago_min > self.ingest.days_ago_max {
            return Err(ConfigError::Invalid(format!(
                "ingest.days_ago_min ({}) exceeds ingest.days_ago_max ({})",
                self.ingest.days_ago_min, self.ingest.days_ago_max
            )));
        }
        if self.ingest.days_ago_max > MAX_DAYS_AGO {
            return Err(ConfigError::Invalid(format!(
                "ingest.days_ago_max ({}) exceeds {MAX_DAYS_AGO}",
                self.ingest.days_ago_max
            )));
        }
        if self.generator.max_attempts == 0 {
            return Err(ConfigError::Invalid("generator.max_attempts must be positive".into()));
        }
        Ok(())
    }

    /// Create config for testing.
    pub fn for_test() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.storage.mongodb.database, "restaurant_stats");
        assert_eq!(config.generator.num_orders, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            r#"
server:
  port: 9100
storage:
  mongodb:
    database: orders_test
knot:
  client_id: abc
  default_merchant_ids: [19, 44]
ingest:
  batch_size: 25
  location_policy: prefer_input
"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap();
        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.mongodb.database, "orders_test");
        assert_eq!(config.storage.mongodb.collection, "orders");
        assert_eq!(config.knot.client_id, "abc");
        assert_eq!(config.knot.default_merchant_ids, vec![19, 44]);
        assert_eq!(config.ingest.batch_size, 25);
        assert_eq!(
            config.ingest.location_policy,
            crate::transform::LocationPolicy::PreferInput
        );
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        assert!(Config::load(Some("/nonexistent/restaurant-stats.yaml")).is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_day_range() {
        let mut config = Config::for_test();
        config.ingest.days_ago_min = 30;
        config.ingest.days_ago_max = 10;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_caps_day_range() {
        let mut config = Config::for_test();
        config.ingest.days_ago_max = MAX_DAYS_AGO;
        assert!(config.validate().is_ok());

        config.ingest.days_ago_max = u32::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
